use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use super::{address_repo, format_date, format_timestamp, now, parse_date, parse_timestamp};
use crate::error::{CrmError, CrmResult};
use crate::model::{Access, Asset, Contact, ContactSort, Id, User};

const CONTACT_COLUMNS: &str = "id, user_id, lead_id, assigned_to, reports_to, first_name, last_name,
    access, title, department, source, email, alt_email, phone, mobile, fax, blog, linkedin,
    facebook, twitter, born_on, do_not_call, background_info, created_at, updated_at, deleted_at";

/// Inserts the contact and its business address, assigning ids and timestamps.
pub fn insert(conn: &Connection, contact: &mut Contact) -> CrmResult<()> {
    let ts = now();
    conn.execute(
        "INSERT INTO contacts (user_id, lead_id, assigned_to, reports_to, first_name, last_name,
         access, title, department, source, email, alt_email, phone, mobile, fax, blog, linkedin,
         facebook, twitter, born_on, do_not_call, background_info, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                 ?18, ?19, ?20, ?21, ?22, ?23, ?24)",
        params![
            contact.user_id.map(|id| id.value),
            contact.lead_id.map(|id| id.value),
            contact.assigned_to.map(|id| id.value),
            contact.reports_to.map(|id| id.value),
            contact.first_name,
            contact.last_name,
            contact.access.to_db_str(),
            contact.title,
            contact.department,
            contact.source,
            contact.email,
            contact.alt_email,
            contact.phone,
            contact.mobile,
            contact.fax,
            contact.blog,
            contact.linkedin,
            contact.facebook,
            contact.twitter,
            contact.born_on.map(format_date),
            contact.do_not_call as i32,
            contact.background_info,
            format_timestamp(ts),
            format_timestamp(ts),
        ],
    )?;

    let id = conn.last_insert_rowid();
    contact.id = Some(Id::new(id));
    contact.created_at = Some(ts);
    contact.updated_at = Some(ts);

    if let Some(address) = contact.business_address.as_mut() {
        address_repo::insert(conn, Contact::ASSET_TYPE, id, address)?;
    }
    Ok(())
}

/// Writes all fields back and syncs the business address.
pub fn update(conn: &Connection, contact: &mut Contact) -> CrmResult<()> {
    let id = contact
        .id
        .ok_or_else(|| CrmError::Other("Cannot update an unsaved contact".into()))?;
    let ts = now();
    conn.execute(
        "UPDATE contacts SET user_id = ?1, lead_id = ?2, assigned_to = ?3, reports_to = ?4,
         first_name = ?5, last_name = ?6, access = ?7, title = ?8, department = ?9, source = ?10,
         email = ?11, alt_email = ?12, phone = ?13, mobile = ?14, fax = ?15, blog = ?16,
         linkedin = ?17, facebook = ?18, twitter = ?19, born_on = ?20, do_not_call = ?21,
         background_info = ?22, updated_at = ?23
         WHERE id = ?24",
        params![
            contact.user_id.map(|id| id.value),
            contact.lead_id.map(|id| id.value),
            contact.assigned_to.map(|id| id.value),
            contact.reports_to.map(|id| id.value),
            contact.first_name,
            contact.last_name,
            contact.access.to_db_str(),
            contact.title,
            contact.department,
            contact.source,
            contact.email,
            contact.alt_email,
            contact.phone,
            contact.mobile,
            contact.fax,
            contact.blog,
            contact.linkedin,
            contact.facebook,
            contact.twitter,
            contact.born_on.map(format_date),
            contact.do_not_call as i32,
            contact.background_info,
            format_timestamp(ts),
            id.value,
        ],
    )?;
    contact.updated_at = Some(ts);

    address_repo::save_business(
        conn,
        Contact::ASSET_TYPE,
        id.value,
        contact.business_address.as_mut(),
    )
}

/// Marks the contact deleted without removing the row.
pub fn soft_delete(conn: &Connection, contact_id: Id<Contact>, at: NaiveDateTime) -> CrmResult<()> {
    conn.execute(
        "UPDATE contacts SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        params![format_timestamp(at), contact_id.value],
    )?;
    Ok(())
}

pub fn restore(conn: &Connection, contact_id: Id<Contact>) -> CrmResult<()> {
    conn.execute(
        "UPDATE contacts SET deleted_at = NULL WHERE id = ?1",
        params![contact_id.value],
    )?;
    Ok(())
}

/// Finds a live (not soft-deleted) contact.
pub fn find_by_id(conn: &Connection, id: Id<Contact>) -> CrmResult<Option<Contact>> {
    Ok(find_with_deleted(conn, id)?.filter(|c| c.deleted_at.is_none()))
}

pub fn find_with_deleted(conn: &Connection, id: Id<Contact>) -> CrmResult<Option<Contact>> {
    let mut found = query(
        conn,
        "id = ?",
        vec![Value::Integer(id.value)],
        ContactSort::default(),
        None,
    )?;
    Ok(found.pop())
}

pub fn find_all(conn: &Connection, sort: ContactSort) -> CrmResult<Vec<Contact>> {
    query(conn, "deleted_at IS NULL", Vec::new(), sort, None)
}

pub fn find_page(
    conn: &Connection,
    sort: ContactSort,
    limit: u32,
    offset: u32,
) -> CrmResult<Vec<Contact>> {
    query(conn, "deleted_at IS NULL", Vec::new(), sort, Some((limit, offset)))
}

pub fn count(conn: &Connection) -> CrmResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM contacts WHERE deleted_at IS NULL",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn find_created_by(
    conn: &Connection,
    user_id: Id<User>,
    sort: ContactSort,
) -> CrmResult<Vec<Contact>> {
    query(
        conn,
        "deleted_at IS NULL AND user_id = ?",
        vec![Value::Integer(user_id.value)],
        sort,
        None,
    )
}

pub fn find_assigned_to(
    conn: &Connection,
    user_id: Id<User>,
    sort: ContactSort,
) -> CrmResult<Vec<Contact>> {
    query(
        conn,
        "deleted_at IS NULL AND assigned_to = ?",
        vec![Value::Integer(user_id.value)],
        sort,
        None,
    )
}

/// Contacts the user created, is assigned to, that are public, or that were
/// shared with them.
pub fn find_visible_to(
    conn: &Connection,
    user_id: Id<User>,
    sort: ContactSort,
) -> CrmResult<Vec<Contact>> {
    query(
        conn,
        "deleted_at IS NULL AND (
            user_id = ?1 OR assigned_to = ?1 OR access = 'Public'
            OR id IN (SELECT asset_id FROM permissions WHERE asset_type = 'Contact' AND user_id = ?1)
        )",
        vec![Value::Integer(user_id.value)],
        sort,
        None,
    )
}

/// Contacts matching every word of `words`, where a word matches when the
/// first or last name starts with it. Case folding is Unicode-aware.
pub fn search_names(conn: &Connection, words: &[String], sort: ContactSort) -> CrmResult<Vec<Contact>> {
    if words.is_empty() {
        return Ok(Vec::new());
    }

    let mut clauses = Vec::new();
    let mut values = Vec::new();
    for word in words {
        let pattern = format!("{}%", escape_like(&word.to_lowercase()));
        clauses.push(
            "(unicode_lower(first_name) LIKE ? ESCAPE '\\' OR unicode_lower(last_name) LIKE ? ESCAPE '\\')",
        );
        values.push(Value::Text(pattern.clone()));
        values.push(Value::Text(pattern));
    }
    let where_clause = format!("deleted_at IS NULL AND {}", clauses.join(" AND "));
    query(conn, &where_clause, values, sort, None)
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn order_clause(sort: ContactSort) -> &'static str {
    match sort {
        ContactSort::FirstNameAsc => "first_name ASC, id ASC",
        ContactSort::LastNameAsc => "last_name ASC, id ASC",
        ContactSort::CreatedAtDesc => "created_at DESC, id DESC",
        ContactSort::UpdatedAtDesc => "updated_at DESC, id DESC",
    }
}

fn query(
    conn: &Connection,
    where_clause: &str,
    values: Vec<Value>,
    sort: ContactSort,
    page: Option<(u32, u32)>,
) -> CrmResult<Vec<Contact>> {
    let mut sql = format!(
        "SELECT {} FROM contacts WHERE {} ORDER BY {}",
        CONTACT_COLUMNS,
        where_clause,
        order_clause(sort)
    );
    if let Some((limit, offset)) = page {
        sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), row_to_raw)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut contacts = Vec::with_capacity(rows.len());
    for raw in rows {
        let mut contact = raw.into_contact()?;
        if let Some(id) = contact.id {
            contact.business_address =
                address_repo::find_business(conn, Contact::ASSET_TYPE, id.value)?;
        }
        contacts.push(contact);
    }
    Ok(contacts)
}

/// Row values that still need fallible conversion outside the rusqlite
/// closure.
struct RawContact {
    contact: Contact,
    access: String,
    born_on: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
    deleted_at: Option<String>,
}

impl RawContact {
    fn into_contact(self) -> CrmResult<Contact> {
        let mut contact = self.contact;
        contact.access = Access::from_db_str(&self.access)
            .ok_or_else(|| CrmError::Other(format!("Unknown access level: {}", self.access)))?;
        contact.born_on = parse_date(self.born_on)?;
        contact.created_at = parse_timestamp(self.created_at)?;
        contact.updated_at = parse_timestamp(self.updated_at)?;
        contact.deleted_at = parse_timestamp(self.deleted_at)?;
        Ok(contact)
    }
}

fn row_to_raw(row: &rusqlite::Row) -> rusqlite::Result<RawContact> {
    let contact = Contact {
        id: Some(Id::new(row.get(0)?)),
        user_id: row.get::<_, Option<i64>>(1)?.map(Id::new),
        lead_id: row.get::<_, Option<i64>>(2)?.map(Id::new),
        assigned_to: row.get::<_, Option<i64>>(3)?.map(Id::new),
        reports_to: row.get::<_, Option<i64>>(4)?.map(Id::new),
        first_name: row.get(5)?,
        last_name: row.get(6)?,
        title: row.get(8)?,
        department: row.get(9)?,
        source: row.get(10)?,
        email: row.get(11)?,
        alt_email: row.get(12)?,
        phone: row.get(13)?,
        mobile: row.get(14)?,
        fax: row.get(15)?,
        blog: row.get(16)?,
        linkedin: row.get(17)?,
        facebook: row.get(18)?,
        twitter: row.get(19)?,
        do_not_call: row.get::<_, i32>(21)? != 0,
        background_info: row.get(22)?,
        ..Contact::default()
    };

    Ok(RawContact {
        contact,
        access: row.get(7)?,
        born_on: row.get(20)?,
        created_at: row.get(23)?,
        updated_at: row.get(24)?,
        deleted_at: row.get(25)?,
    })
}
