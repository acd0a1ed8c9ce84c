use rusqlite::{params, Connection};

use super::address_repo;
use crate::error::{CrmError, CrmResult};
use crate::model::{Access, Asset, Id, Lead};

pub fn insert(conn: &Connection, lead: &mut Lead) -> CrmResult<()> {
    conn.execute(
        "INSERT INTO leads (user_id, assigned_to, first_name, last_name, access, title, company,
         source, status, email, alt_email, phone, mobile, blog, linkedin, facebook, twitter,
         do_not_call, background_info)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        params![
            lead.user_id.map(|id| id.value),
            lead.assigned_to.map(|id| id.value),
            lead.first_name,
            lead.last_name,
            lead.access.to_db_str(),
            lead.title,
            lead.company,
            lead.source,
            lead.status,
            lead.email,
            lead.alt_email,
            lead.phone,
            lead.mobile,
            lead.blog,
            lead.linkedin,
            lead.facebook,
            lead.twitter,
            lead.do_not_call as i32,
            lead.background_info,
        ],
    )?;

    let id = conn.last_insert_rowid();
    lead.id = Some(Id::new(id));
    if let Some(address) = lead.business_address.as_mut() {
        address_repo::insert(conn, Lead::ASSET_TYPE, id, address)?;
    }
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: Id<Lead>) -> CrmResult<Option<Lead>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, assigned_to, first_name, last_name, access, title, company, source,
         status, email, alt_email, phone, mobile, blog, linkedin, facebook, twitter, do_not_call,
         background_info
         FROM leads WHERE id = ?1 AND deleted_at IS NULL",
    )?;
    let result = stmt.query_row(params![id.value], |row| Ok(row_to_lead(row)));

    match result {
        Ok(lead) => {
            let mut lead = lead?;
            lead.business_address = address_repo::find_business(conn, Lead::ASSET_TYPE, id.value)?;
            Ok(Some(lead))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn row_to_lead(row: &rusqlite::Row) -> CrmResult<Lead> {
    let access: String = row.get(5)?;

    Ok(Lead {
        id: Some(Id::new(row.get(0)?)),
        user_id: row.get::<_, Option<i64>>(1)?.map(Id::new),
        assigned_to: row.get::<_, Option<i64>>(2)?.map(Id::new),
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        access: Access::from_db_str(&access)
            .ok_or_else(|| CrmError::Other(format!("Unknown access level: {}", access)))?,
        title: row.get(6)?,
        company: row.get(7)?,
        source: row.get(8)?,
        status: row.get(9)?,
        email: row.get(10)?,
        alt_email: row.get(11)?,
        phone: row.get(12)?,
        mobile: row.get(13)?,
        blog: row.get(14)?,
        linkedin: row.get(15)?,
        facebook: row.get(16)?,
        twitter: row.get(17)?,
        do_not_call: row.get::<_, i32>(18)? != 0,
        background_info: row.get(19)?,
        business_address: None,
    })
}
