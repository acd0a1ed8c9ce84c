use rusqlite::{params, Connection};

use super::{format_timestamp, now, parse_timestamp};
use crate::error::CrmResult;
use crate::model::{Comment, Id};

pub fn insert(conn: &Connection, comment: &mut Comment) -> CrmResult<()> {
    let ts = now();
    conn.execute(
        "INSERT INTO comments (user_id, commentable_type, commentable_id, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            comment.user_id.value,
            comment.commentable_type,
            comment.commentable_id,
            comment.comment,
            format_timestamp(ts),
        ],
    )?;
    comment.id = Some(Id::new(conn.last_insert_rowid()));
    comment.created_at = Some(ts);
    Ok(())
}

/// Comments on the asset, newest first.
pub fn find_for(conn: &Connection, commentable_type: &str, commentable_id: i64) -> CrmResult<Vec<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, commentable_type, commentable_id, comment, created_at FROM comments
         WHERE commentable_type = ?1 AND commentable_id = ?2
         ORDER BY created_at DESC, id DESC",
    )?;

    let rows: Vec<(i64, i64, String, i64, String, Option<String>)> = stmt
        .query_map(params![commentable_type, commentable_id], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut comments = Vec::new();
    for (id, user_id, commentable_type, commentable_id, comment, created_at) in rows {
        comments.push(Comment {
            id: Some(Id::new(id)),
            user_id: Id::new(user_id),
            commentable_type,
            commentable_id,
            comment,
            created_at: parse_timestamp(created_at)?,
        });
    }
    Ok(comments)
}

pub fn delete_for(conn: &Connection, commentable_type: &str, commentable_id: i64) -> CrmResult<()> {
    conn.execute(
        "DELETE FROM comments WHERE commentable_type = ?1 AND commentable_id = ?2",
        params![commentable_type, commentable_id],
    )?;
    Ok(())
}
