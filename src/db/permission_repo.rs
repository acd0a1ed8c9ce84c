use rusqlite::{params, Connection};

use crate::error::CrmResult;
use crate::model::{Id, Permission, User};

/// Grants `user_id` access to the asset. Granting twice is a no-op.
pub fn grant(conn: &Connection, user_id: Id<User>, asset_type: &str, asset_id: i64) -> CrmResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO permissions (user_id, asset_type, asset_id) VALUES (?1, ?2, ?3)",
        params![user_id.value, asset_type, asset_id],
    )?;
    Ok(())
}

pub fn revoke(conn: &Connection, user_id: Id<User>, asset_type: &str, asset_id: i64) -> CrmResult<()> {
    conn.execute(
        "DELETE FROM permissions WHERE user_id = ?1 AND asset_type = ?2 AND asset_id = ?3",
        params![user_id.value, asset_type, asset_id],
    )?;
    Ok(())
}

pub fn delete_all_for(conn: &Connection, asset_type: &str, asset_id: i64) -> CrmResult<()> {
    conn.execute(
        "DELETE FROM permissions WHERE asset_type = ?1 AND asset_id = ?2",
        params![asset_type, asset_id],
    )?;
    Ok(())
}

pub fn find_for(conn: &Connection, asset_type: &str, asset_id: i64) -> CrmResult<Vec<Permission>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, asset_type, asset_id FROM permissions
         WHERE asset_type = ?1 AND asset_id = ?2 ORDER BY user_id",
    )?;

    let permissions = stmt
        .query_map(params![asset_type, asset_id], |row| {
            Ok(Permission {
                user_id: Id::new(row.get(0)?),
                asset_type: row.get(1)?,
                asset_id: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(permissions)
}

pub fn user_ids_for(conn: &Connection, asset_type: &str, asset_id: i64) -> CrmResult<Vec<Id<User>>> {
    Ok(find_for(conn, asset_type, asset_id)?
        .into_iter()
        .map(|p| p.user_id)
        .collect())
}
