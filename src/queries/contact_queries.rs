use rusqlite::Connection;

use super::paging::{self, Page};
use crate::db::{account_repo, contact_repo, opportunity_repo, task_repo};
use crate::error::CrmResult;
use crate::model::{Account, Activity, Asset, Contact, ContactSort, Id, Opportunity, Task, User};
use crate::validation;

pub fn get_contact(conn: &Connection, contact_id: Id<Contact>) -> CrmResult<Option<Contact>> {
    contact_repo::find_by_id(conn, contact_id)
}

pub fn list(conn: &Connection, sort: ContactSort, page: u32, per_page: u32) -> CrmResult<Page<Contact>> {
    let page = page.max(1);
    let items = contact_repo::find_page(conn, sort, per_page, paging::offset(page, per_page))?;
    let total = contact_repo::count(conn)?;
    Ok(Page {
        items,
        page,
        per_page,
        total: total.max(0) as u64,
    })
}

/// Contacts whose first or last name matches a word of `query`. Characters
/// other than word characters, whitespace, `-`, `.` and `'` are ignored.
pub fn search(conn: &Connection, query: &str, sort: ContactSort) -> CrmResult<Vec<Contact>> {
    contact_repo::search_names(conn, &validation::search_words(query), sort)
}

pub fn created_by(conn: &Connection, user_id: Id<User>, sort: ContactSort) -> CrmResult<Vec<Contact>> {
    contact_repo::find_created_by(conn, user_id, sort)
}

pub fn assigned_to(conn: &Connection, user_id: Id<User>, sort: ContactSort) -> CrmResult<Vec<Contact>> {
    contact_repo::find_assigned_to(conn, user_id, sort)
}

pub fn visible_to(conn: &Connection, user_id: Id<User>, sort: ContactSort) -> CrmResult<Vec<Contact>> {
    contact_repo::find_visible_to(conn, user_id, sort)
}

pub fn account_for(conn: &Connection, contact: &Contact) -> CrmResult<Option<Account>> {
    match contact.id {
        Some(id) => account_repo::find_for_contact(conn, id),
        None => Ok(None),
    }
}

/// Linked opportunities, highest id first.
pub fn opportunities_for(conn: &Connection, contact: &Contact) -> CrmResult<Vec<Opportunity>> {
    match contact.id {
        Some(id) => opportunity_repo::find_for_contact(conn, id),
        None => Ok(Vec::new()),
    }
}

pub fn tasks_for(conn: &Connection, contact: &Contact) -> CrmResult<Vec<Task>> {
    match contact.asset_id() {
        Some(id) => task_repo::find_tasks_for(conn, Contact::ASSET_TYPE, id),
        None => Ok(Vec::new()),
    }
}

pub fn activities_for(conn: &Connection, contact: &Contact) -> CrmResult<Vec<Activity>> {
    match contact.asset_id() {
        Some(id) => task_repo::find_activities_for(conn, Contact::ASSET_TYPE, id),
        None => Ok(Vec::new()),
    }
}
