use rusqlite::Connection;

use crate::db::comment_repo;
use crate::error::{CrmError, CrmResult};
use crate::model::{Asset, Comment, Id, User};
use crate::validation;

/// Leaves a comment on a saved asset.
pub fn add_comment<T: Asset>(
    conn: &Connection,
    asset: &T,
    user_id: Id<User>,
    text: &str,
) -> CrmResult<Comment> {
    let commentable_id = asset
        .asset_id()
        .ok_or_else(|| CrmError::Other(format!("Cannot comment on an unsaved {}", T::ASSET_TYPE)))?;
    let valid_text = validation::non_blank(text, "comment")?;

    let mut comment = Comment {
        id: None,
        user_id,
        commentable_type: T::ASSET_TYPE.to_string(),
        commentable_id,
        comment: valid_text,
        created_at: None,
    };
    comment_repo::insert(conn, &mut comment)?;
    Ok(comment)
}

pub fn comments_for<T: Asset>(conn: &Connection, asset: &T) -> CrmResult<Vec<Comment>> {
    match asset.asset_id() {
        Some(id) => comment_repo::find_for(conn, T::ASSET_TYPE, id),
        None => Ok(Vec::new()),
    }
}
