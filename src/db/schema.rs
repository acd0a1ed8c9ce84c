use std::path::Path;
use std::time::Instant;

use log::{error, info};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

use crate::error::CrmResult;

/// Initialize the database schema. Creates all tables if they don't exist.
pub fn initialize(conn: &Connection) -> CrmResult<()> {
    register_functions(conn)?;
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS leads (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER REFERENCES users(id),
            assigned_to INTEGER REFERENCES users(id),
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            access TEXT NOT NULL DEFAULT 'Private',
            title TEXT,
            company TEXT,
            source TEXT,
            status TEXT,
            email TEXT,
            alt_email TEXT,
            phone TEXT,
            mobile TEXT,
            blog TEXT,
            linkedin TEXT,
            facebook TEXT,
            twitter TEXT,
            do_not_call INTEGER NOT NULL DEFAULT 0,
            background_info TEXT,
            deleted_at TEXT
        );

        CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER REFERENCES users(id),
            lead_id INTEGER REFERENCES leads(id),
            assigned_to INTEGER REFERENCES users(id),
            reports_to INTEGER REFERENCES contacts(id),
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            access TEXT NOT NULL DEFAULT 'Private',
            title TEXT,
            department TEXT,
            source TEXT,
            email TEXT,
            alt_email TEXT,
            phone TEXT,
            mobile TEXT,
            fax TEXT,
            blog TEXT,
            linkedin TEXT,
            facebook TEXT,
            twitter TEXT,
            born_on TEXT,
            do_not_call INTEGER NOT NULL DEFAULT 0,
            background_info TEXT,
            deleted_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS index_contacts_on_user_id ON contacts(user_id);
        CREATE INDEX IF NOT EXISTS index_contacts_on_assigned_to ON contacts(assigned_to);

        CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER REFERENCES users(id),
            assigned_to INTEGER REFERENCES users(id),
            name TEXT NOT NULL DEFAULT '',
            access TEXT NOT NULL DEFAULT 'Private',
            website TEXT,
            phone TEXT,
            deleted_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS account_contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id INTEGER NOT NULL REFERENCES accounts(id),
            contact_id INTEGER NOT NULL UNIQUE REFERENCES contacts(id)
        );

        CREATE TABLE IF NOT EXISTS opportunities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER REFERENCES users(id),
            assigned_to INTEGER REFERENCES users(id),
            name TEXT NOT NULL DEFAULT '',
            stage TEXT,
            access TEXT NOT NULL DEFAULT 'Private',
            deleted_at TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS contact_opportunities (
            contact_id INTEGER NOT NULL REFERENCES contacts(id),
            opportunity_id INTEGER NOT NULL REFERENCES opportunities(id),
            role TEXT,
            PRIMARY KEY (contact_id, opportunity_id)
        );

        CREATE TABLE IF NOT EXISTS addresses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            addressable_type TEXT NOT NULL,
            addressable_id INTEGER NOT NULL,
            address_type TEXT NOT NULL,
            street1 TEXT,
            street2 TEXT,
            city TEXT,
            state TEXT,
            zipcode TEXT,
            country TEXT,
            full_address TEXT
        );

        CREATE INDEX IF NOT EXISTS index_addresses_on_addressable
            ON addresses(addressable_type, addressable_id);

        CREATE TABLE IF NOT EXISTS permissions (
            user_id INTEGER NOT NULL REFERENCES users(id),
            asset_type TEXT NOT NULL,
            asset_id INTEGER NOT NULL,
            PRIMARY KEY (user_id, asset_type, asset_id)
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER REFERENCES users(id),
            asset_type TEXT NOT NULL,
            asset_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS activities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER REFERENCES users(id),
            subject_type TEXT NOT NULL,
            subject_id INTEGER NOT NULL,
            action TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            commentable_type TEXT NOT NULL,
            commentable_id INTEGER NOT NULL,
            comment TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        PRAGMA foreign_keys = ON;
        ",
    )?;
    Ok(())
}

/// Per-connection SQL functions. SQLite's `LOWER()` only folds ASCII, so
/// name search compares through `unicode_lower` on both sides.
fn register_functions(conn: &Connection) -> CrmResult<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|s| s.to_lowercase()))
        },
    )?;
    Ok(())
}

/// Open (or create) a database file and make sure the schema exists.
pub fn open(path: impl AsRef<Path>) -> CrmResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start path={}", path.as_ref().display());

    let conn = Connection::open(path)?;
    match initialize(&conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Create an in-memory connection for testing. Available in test builds.
pub fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize(&conn).unwrap();
    conn
}
