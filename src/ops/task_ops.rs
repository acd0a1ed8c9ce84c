use rusqlite::Connection;

use crate::db::task_repo;
use crate::error::{CrmError, CrmResult};
use crate::model::{Asset, Id, Task, User};
use crate::validation;

/// Attaches a new task to a saved asset.
pub fn add_task<T: Asset>(
    conn: &Connection,
    asset: &T,
    user_id: Id<User>,
    name: &str,
) -> CrmResult<Task> {
    let asset_id = asset
        .asset_id()
        .ok_or_else(|| CrmError::Other(format!("Cannot add a task to an unsaved {}", T::ASSET_TYPE)))?;

    let mut task = Task {
        id: None,
        user_id: Some(user_id),
        asset_type: T::ASSET_TYPE.to_string(),
        asset_id,
        name: validation::non_blank(name, "name")?,
        created_at: None,
    };
    task_repo::insert_task(conn, &mut task)?;
    Ok(task)
}
