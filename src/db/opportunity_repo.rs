use rusqlite::{params, Connection};

use super::{format_timestamp, now, parse_timestamp};
use crate::error::{CrmError, CrmResult};
use crate::model::{Access, Contact, Id, Opportunity};

pub fn insert(conn: &Connection, opportunity: &mut Opportunity) -> CrmResult<()> {
    let ts = now();
    conn.execute(
        "INSERT INTO opportunities (user_id, assigned_to, name, stage, access, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            opportunity.user_id.map(|id| id.value),
            opportunity.assigned_to.map(|id| id.value),
            opportunity.name,
            opportunity.stage,
            opportunity.access.to_db_str(),
            format_timestamp(ts),
        ],
    )?;
    opportunity.id = Some(Id::new(conn.last_insert_rowid()));
    opportunity.created_at = Some(ts);
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: Id<Opportunity>) -> CrmResult<Option<Opportunity>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, assigned_to, name, stage, access, created_at, deleted_at
         FROM opportunities WHERE id = ?1 AND deleted_at IS NULL",
    )?;
    let result = stmt.query_row(params![id.value], |row| Ok(row_to_opportunity(row)));

    match result {
        Ok(opportunity) => Ok(Some(opportunity?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Attaches the opportunity to the contact. Linking twice is a no-op.
pub fn link_contact(
    conn: &Connection,
    contact_id: Id<Contact>,
    opportunity_id: Id<Opportunity>,
) -> CrmResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO contact_opportunities (contact_id, opportunity_id) VALUES (?1, ?2)",
        params![contact_id.value, opportunity_id.value],
    )?;
    Ok(())
}

pub fn unlink_all_for_contact(conn: &Connection, contact_id: Id<Contact>) -> CrmResult<()> {
    conn.execute(
        "DELETE FROM contact_opportunities WHERE contact_id = ?1",
        params![contact_id.value],
    )?;
    Ok(())
}

/// Live opportunities linked to the contact, newest id first, without repeats.
pub fn find_for_contact(conn: &Connection, contact_id: Id<Contact>) -> CrmResult<Vec<Opportunity>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT o.id, o.user_id, o.assigned_to, o.name, o.stage, o.access, o.created_at, o.deleted_at
         FROM opportunities o
         JOIN contact_opportunities co ON co.opportunity_id = o.id
         WHERE co.contact_id = ?1 AND o.deleted_at IS NULL
         ORDER BY o.id DESC",
    )?;

    let opportunities = stmt
        .query_map(params![contact_id.value], |row| Ok(row_to_opportunity(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(opportunities)
}

pub fn count_links_for_contact(conn: &Connection, contact_id: Id<Contact>) -> CrmResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM contact_opportunities WHERE contact_id = ?1",
        params![contact_id.value],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn row_to_opportunity(row: &rusqlite::Row) -> CrmResult<Opportunity> {
    let access: String = row.get(5)?;

    let mut opportunity = Opportunity::create(row.get(3)?);
    opportunity.id = Some(Id::new(row.get(0)?));
    opportunity.user_id = row.get::<_, Option<i64>>(1)?.map(Id::new);
    opportunity.assigned_to = row.get::<_, Option<i64>>(2)?.map(Id::new);
    opportunity.stage = row.get(4)?;
    opportunity.access = Access::from_db_str(&access)
        .ok_or_else(|| CrmError::Other(format!("Unknown access level: {}", access)))?;
    opportunity.created_at = parse_timestamp(row.get(6)?)?;
    opportunity.deleted_at = parse_timestamp(row.get(7)?)?;
    Ok(opportunity)
}
