use rusqlite::{params, Connection};

use super::{format_timestamp, now, parse_timestamp};
use crate::error::CrmResult;
use crate::model::{Activity, Id, Task};

pub fn insert_task(conn: &Connection, task: &mut Task) -> CrmResult<()> {
    let ts = task.created_at.unwrap_or_else(now);
    conn.execute(
        "INSERT INTO tasks (user_id, asset_type, asset_id, name, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            task.user_id.map(|id| id.value),
            task.asset_type,
            task.asset_id,
            task.name,
            format_timestamp(ts),
        ],
    )?;
    task.id = Some(Id::new(conn.last_insert_rowid()));
    task.created_at = Some(ts);
    Ok(())
}

/// Tasks attached to the asset, newest first.
pub fn find_tasks_for(conn: &Connection, asset_type: &str, asset_id: i64) -> CrmResult<Vec<Task>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, asset_type, asset_id, name, created_at FROM tasks
         WHERE asset_type = ?1 AND asset_id = ?2
         ORDER BY created_at DESC, id DESC",
    )?;

    let rows: Vec<(i64, Option<i64>, String, i64, String, Option<String>)> = stmt
        .query_map(params![asset_type, asset_id], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut tasks = Vec::new();
    for (id, user_id, asset_type, asset_id, name, created_at) in rows {
        tasks.push(Task {
            id: Some(Id::new(id)),
            user_id: user_id.map(Id::new),
            asset_type,
            asset_id,
            name,
            created_at: parse_timestamp(created_at)?,
        });
    }
    Ok(tasks)
}

pub fn delete_tasks_for(conn: &Connection, asset_type: &str, asset_id: i64) -> CrmResult<()> {
    conn.execute(
        "DELETE FROM tasks WHERE asset_type = ?1 AND asset_id = ?2",
        params![asset_type, asset_id],
    )?;
    Ok(())
}

pub fn insert_activity(conn: &Connection, activity: &mut Activity) -> CrmResult<()> {
    let ts = activity.created_at.unwrap_or_else(now);
    conn.execute(
        "INSERT INTO activities (user_id, subject_type, subject_id, action, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            activity.user_id.map(|id| id.value),
            activity.subject_type,
            activity.subject_id,
            activity.action,
            format_timestamp(ts),
        ],
    )?;
    activity.id = Some(Id::new(conn.last_insert_rowid()));
    activity.created_at = Some(ts);
    Ok(())
}

/// Activities recorded against the subject, newest first.
pub fn find_activities_for(
    conn: &Connection,
    subject_type: &str,
    subject_id: i64,
) -> CrmResult<Vec<Activity>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, subject_type, subject_id, action, created_at FROM activities
         WHERE subject_type = ?1 AND subject_id = ?2
         ORDER BY created_at DESC, id DESC",
    )?;

    let rows: Vec<(i64, Option<i64>, String, i64, String, Option<String>)> = stmt
        .query_map(params![subject_type, subject_id], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut activities = Vec::new();
    for (id, user_id, subject_type, subject_id, action, created_at) in rows {
        activities.push(Activity {
            id: Some(Id::new(id)),
            user_id: user_id.map(Id::new),
            subject_type,
            subject_id,
            action,
            created_at: parse_timestamp(created_at)?,
        });
    }
    Ok(activities)
}
