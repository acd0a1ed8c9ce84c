use rusqlite::{params, Connection};

use crate::error::CrmResult;
use crate::model::{Id, User};

pub fn insert(conn: &Connection, user: &mut User) -> CrmResult<()> {
    conn.execute(
        "INSERT INTO users (username, email) VALUES (?1, ?2)",
        params![user.username, user.email],
    )?;
    user.id = Some(Id::new(conn.last_insert_rowid()));
    Ok(())
}

pub fn find_by_id(conn: &Connection, user_id: Id<User>) -> CrmResult<Option<User>> {
    let mut stmt = conn.prepare("SELECT id, username, email FROM users WHERE id = ?1")?;

    let result = stmt.query_row(params![user_id.value], |row| {
        Ok(User {
            id: Some(Id::new(row.get(0)?)),
            username: row.get(1)?,
            email: row.get(2)?,
        })
    });

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_by_username(conn: &Connection, username: &str) -> CrmResult<Option<User>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, email FROM users WHERE username = ?1 COLLATE NOCASE",
    )?;

    let result = stmt.query_row(params![username], |row| {
        Ok(User {
            id: Some(Id::new(row.get(0)?)),
            username: row.get(1)?,
            email: row.get(2)?,
        })
    });

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
