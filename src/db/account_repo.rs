use rusqlite::{params, Connection};

use super::{format_timestamp, now, parse_timestamp};
use crate::error::{CrmError, CrmResult};
use crate::model::{Access, Account, AccountContact, Contact, Id};

const ACCOUNT_COLUMNS: &str =
    "id, user_id, assigned_to, name, access, website, phone, created_at, updated_at, deleted_at";

pub fn insert(conn: &Connection, account: &mut Account) -> CrmResult<()> {
    let ts = now();
    conn.execute(
        "INSERT INTO accounts (user_id, assigned_to, name, access, website, phone, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            account.user_id.map(|id| id.value),
            account.assigned_to.map(|id| id.value),
            account.name,
            account.access.to_db_str(),
            account.website,
            account.phone,
            format_timestamp(ts),
            format_timestamp(ts),
        ],
    )?;
    account.id = Some(Id::new(conn.last_insert_rowid()));
    account.created_at = Some(ts);
    account.updated_at = Some(ts);
    Ok(())
}

pub fn update(conn: &Connection, account: &mut Account) -> CrmResult<()> {
    let id = account
        .id
        .ok_or_else(|| CrmError::Other("Cannot update an unsaved account".into()))?;
    let ts = now();
    conn.execute(
        "UPDATE accounts SET user_id = ?1, assigned_to = ?2, name = ?3, access = ?4, website = ?5,
         phone = ?6, updated_at = ?7 WHERE id = ?8",
        params![
            account.user_id.map(|id| id.value),
            account.assigned_to.map(|id| id.value),
            account.name,
            account.access.to_db_str(),
            account.website,
            account.phone,
            format_timestamp(ts),
            id.value,
        ],
    )?;
    account.updated_at = Some(ts);
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: Id<Account>) -> CrmResult<Option<Account>> {
    let sql = format!(
        "SELECT {} FROM accounts WHERE id = ?1 AND deleted_at IS NULL",
        ACCOUNT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let result = stmt.query_row(params![id.value], |row| Ok(row_to_account(row)));

    match result {
        Ok(account) => Ok(Some(account?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn count(conn: &Connection) -> CrmResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM accounts WHERE deleted_at IS NULL",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Replaces whatever account link the contact had with a link to `account_id`.
pub fn link_contact(
    conn: &Connection,
    account_id: Id<Account>,
    contact_id: Id<Contact>,
) -> CrmResult<AccountContact> {
    unlink_contact(conn, contact_id)?;
    conn.execute(
        "INSERT INTO account_contacts (account_id, contact_id) VALUES (?1, ?2)",
        params![account_id.value, contact_id.value],
    )?;
    let mut link = AccountContact::create(account_id, contact_id);
    link.id = Some(Id::new(conn.last_insert_rowid()));
    Ok(link)
}

pub fn unlink_contact(conn: &Connection, contact_id: Id<Contact>) -> CrmResult<()> {
    conn.execute(
        "DELETE FROM account_contacts WHERE contact_id = ?1",
        params![contact_id.value],
    )?;
    Ok(())
}

pub fn find_contact_link(conn: &Connection, contact_id: Id<Contact>) -> CrmResult<Option<AccountContact>> {
    let mut stmt = conn.prepare(
        "SELECT id, account_id, contact_id FROM account_contacts WHERE contact_id = ?1",
    )?;
    let result = stmt.query_row(params![contact_id.value], |row| {
        Ok(AccountContact {
            id: Some(Id::new(row.get(0)?)),
            account_id: Id::new(row.get(1)?),
            contact_id: Id::new(row.get(2)?),
        })
    });

    match result {
        Ok(link) => Ok(Some(link)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// The account reached through the contact's account link.
pub fn find_for_contact(conn: &Connection, contact_id: Id<Contact>) -> CrmResult<Option<Account>> {
    match find_contact_link(conn, contact_id)? {
        Some(link) => find_by_id(conn, link.account_id),
        None => Ok(None),
    }
}

pub fn count_links_for_contact(conn: &Connection, contact_id: Id<Contact>) -> CrmResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM account_contacts WHERE contact_id = ?1",
        params![contact_id.value],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn row_to_account(row: &rusqlite::Row) -> CrmResult<Account> {
    let access: String = row.get(4)?;

    let mut account = Account::create(row.get(3)?);
    account.id = Some(Id::new(row.get(0)?));
    account.user_id = row.get::<_, Option<i64>>(1)?.map(Id::new);
    account.assigned_to = row.get::<_, Option<i64>>(2)?.map(Id::new);
    account.access = Access::from_db_str(&access)
        .ok_or_else(|| CrmError::Other(format!("Unknown access level: {}", access)))?;
    account.website = row.get(5)?;
    account.phone = row.get(6)?;
    account.created_at = parse_timestamp(row.get(7)?)?;
    account.updated_at = parse_timestamp(row.get(8)?)?;
    account.deleted_at = parse_timestamp(row.get(9)?)?;
    Ok(account)
}
