//! Contact workflows: the create/update form handlers, lead conversion and
//! deletion. Every workflow that touches more than one table runs inside a
//! single transaction that is rolled back when any step fails.

use log::{info, warn};
use rusqlite::Connection;

use super::account_ops;
use super::permission_ops::{self, Shareable};
use crate::db::{
    account_repo, address_repo, comment_repo, contact_repo, now, opportunity_repo, permission_repo,
    task_repo,
};
use crate::error::{CrmError, CrmResult, FieldErrors};
use crate::model::{
    Access, AccessRequest, Account, Activity, Asset, Contact, ContactParams, ConversionParams, Id,
    Lead, Opportunity,
};

/// Saves a new contact from the create form: resolves or creates its
/// account, attaches the requested opportunity and applies sharing grants.
///
/// On failure nothing is written and validation errors are left on
/// `contact.errors`.
pub fn create_with_account_and_permissions(
    conn: &Connection,
    contact: &mut Contact,
    params: &ContactParams,
) -> CrmResult<()> {
    let tx = conn.unchecked_transaction()?;
    let result = create_in(&tx, contact, params).and_then(|()| tx.commit().map_err(CrmError::from));

    match &result {
        Ok(()) => info!(
            "event=contact_create status=ok contact_id={}",
            contact.id.map(|id| id.value).unwrap_or_default()
        ),
        Err(e) => {
            forget_insert(contact);
            warn!("event=contact_create status=error error=\"{}\"", e);
        }
    }
    result
}

fn create_in(conn: &Connection, contact: &mut Contact, params: &ContactParams) -> CrmResult<()> {
    let account =
        account_ops::create_or_select_for(conn, Some(&*contact), &params.account, &params.users)?;

    let opportunity = match params.opportunity {
        Some(id) => Some(
            opportunity_repo::find_by_id(conn, id)?
                .ok_or_else(|| CrmError::not_found("Opportunity", id))?,
        ),
        None => None,
    };

    permission_ops::save_with_permissions(conn, contact, &params.users)?;
    let contact_id = saved_id(contact)?;

    if let Some(account_id) = account.id {
        account_repo::link_contact(conn, account_id, contact_id)?;
    }
    if let Some(opportunity_id) = opportunity.and_then(|o| o.id) {
        opportunity_repo::link_contact(conn, contact_id, opportunity_id)?;
    }

    log_activity(conn, contact, "created")
}

/// Saves the edit form: resolves or creates the account, applies
/// `params.contact` to the contact and re-applies sharing grants. The
/// opportunity list is left alone.
pub fn update_with_account_and_permissions(
    conn: &Connection,
    contact: &mut Contact,
    params: &ContactParams,
) -> CrmResult<()> {
    let stored_address_id = contact.business_address.as_ref().and_then(|a| a.id);
    let stored_updated_at = contact.updated_at;

    let tx = conn.unchecked_transaction()?;
    let result = update_in(&tx, contact, params).and_then(|()| tx.commit().map_err(CrmError::from));

    match &result {
        Ok(()) => info!(
            "event=contact_update status=ok contact_id={}",
            contact.id.map(|id| id.value).unwrap_or_default()
        ),
        Err(e) => {
            // Rows written before the failure are gone; so are their ids.
            contact.updated_at = stored_updated_at;
            if let Some(address) = contact.business_address.as_mut() {
                address.id = stored_address_id;
            }
            warn!("event=contact_update status=error error=\"{}\"", e);
        }
    }
    result
}

fn update_in(conn: &Connection, contact: &mut Contact, params: &ContactParams) -> CrmResult<()> {
    let contact_id = saved_id(contact)?;
    let account =
        account_ops::create_or_select_for(conn, Some(&*contact), &params.account, &params.users)?;

    params.contact.apply_to(contact);
    permission_ops::update_with_permissions(conn, contact, &params.users)?;

    if let Some(account_id) = account.id {
        account_repo::link_contact(conn, account_id, contact_id)?;
    }

    log_activity(conn, contact, "updated")
}

/// Converts a lead into a contact attached to `account` and `opportunity`.
///
/// The contact is always returned. It is saved and linked only when neither
/// the account nor the opportunity carries errors and the contact itself
/// validates; otherwise it comes back unsaved (`id == None`), with any of
/// its own validation errors in `contact.errors`.
pub fn create_for(
    conn: &Connection,
    lead: &Lead,
    account: &Account,
    opportunity: &Opportunity,
    params: &ConversionParams,
) -> CrmResult<Contact> {
    let mut contact = Contact::from_lead(lead);
    contact.user_id = params.account.user_id;
    contact.assigned_to = params.account.assigned_to;
    contact.access = params.access.concrete().unwrap_or_default();

    if !account.errors.is_empty() || !opportunity.errors.is_empty() {
        info!(
            "event=contact_convert status=skipped lead_id={} reason=collaborator_errors",
            lead.id.map(|id| id.value).unwrap_or_default()
        );
        return Ok(contact);
    }

    let tx = conn.unchecked_transaction()?;
    let result = convert_in(&tx, &mut contact, lead, account, opportunity, params)
        .and_then(|()| tx.commit().map_err(CrmError::from));

    match result {
        Ok(()) => {
            info!(
                "event=contact_convert status=ok lead_id={} contact_id={}",
                lead.id.map(|id| id.value).unwrap_or_default(),
                contact.id.map(|id| id.value).unwrap_or_default()
            );
            Ok(contact)
        }
        Err(CrmError::Invalid { errors }) => {
            forget_insert(&mut contact);
            warn!("event=contact_convert status=invalid errors=\"{}\"", errors);
            Ok(contact)
        }
        Err(e) => Err(e),
    }
}

fn convert_in(
    conn: &Connection,
    contact: &mut Contact,
    lead: &Lead,
    account: &Account,
    opportunity: &Opportunity,
    params: &ConversionParams,
) -> CrmResult<()> {
    match params.access {
        AccessRequest::Lead => permission_ops::save_with_model_permissions(conn, contact, lead)?,
        _ => permission_ops::save_with_permissions(conn, contact, &params.users)?,
    }
    let contact_id = saved_id(contact)?;

    if let Some(account_id) = account.id {
        account_repo::link_contact(conn, account_id, contact_id)?;
    }
    if let Some(opportunity_id) = opportunity.id {
        opportunity_repo::link_contact(conn, contact_id, opportunity_id)?;
    }

    log_activity(conn, contact, "converted")
}

/// Hides the contact from default queries.
pub fn soft_delete(conn: &Connection, contact_id: Id<Contact>) -> CrmResult<Contact> {
    let mut contact = contact_repo::find_by_id(conn, contact_id)?
        .ok_or_else(|| CrmError::not_found("Contact", contact_id))?;

    let at = now();
    contact_repo::soft_delete(conn, contact_id, at)?;
    contact.deleted_at = Some(at);
    Ok(contact)
}

pub fn restore(conn: &Connection, contact_id: Id<Contact>) -> CrmResult<Contact> {
    let mut contact = contact_repo::find_with_deleted(conn, contact_id)?
        .ok_or_else(|| CrmError::not_found("Contact", contact_id))?;

    contact_repo::restore(conn, contact_id)?;
    contact.deleted_at = None;
    Ok(contact)
}

/// Destroys the contact: its business address, account and opportunity
/// links, tasks, comments and grants are removed, the contact row itself is
/// soft-deleted, and activities are left in place.
pub fn destroy(conn: &Connection, contact: &mut Contact) -> CrmResult<()> {
    let contact_id = saved_id(contact)?;
    let asset_id = contact_id.value;

    let tx = conn.unchecked_transaction()?;
    address_repo::delete_business(&tx, Contact::ASSET_TYPE, asset_id)?;
    account_repo::unlink_contact(&tx, contact_id)?;
    opportunity_repo::unlink_all_for_contact(&tx, contact_id)?;
    task_repo::delete_tasks_for(&tx, Contact::ASSET_TYPE, asset_id)?;
    comment_repo::delete_for(&tx, Contact::ASSET_TYPE, asset_id)?;
    permission_repo::delete_all_for(&tx, Contact::ASSET_TYPE, asset_id)?;

    let at = now();
    contact_repo::soft_delete(&tx, contact_id, at)?;
    log_activity(&tx, contact, "deleted")?;
    tx.commit()?;

    contact.business_address = None;
    contact.deleted_at = Some(at);
    info!("event=contact_destroy status=ok contact_id={}", asset_id);
    Ok(())
}

fn log_activity(conn: &Connection, contact: &Contact, action: &str) -> CrmResult<()> {
    let mut activity = Activity {
        id: None,
        user_id: contact.user_id,
        subject_type: Contact::ASSET_TYPE.to_string(),
        subject_id: saved_id(contact)?.value,
        action: action.to_string(),
        created_at: None,
    };
    task_repo::insert_activity(conn, &mut activity)
}

fn saved_id(contact: &Contact) -> CrmResult<Id<Contact>> {
    contact
        .id
        .ok_or_else(|| CrmError::Other("Contact has not been saved".into()))
}

/// Drops ids handed out by an insert that was rolled back.
fn forget_insert(contact: &mut Contact) {
    contact.id = None;
    contact.created_at = None;
    contact.updated_at = None;
    if let Some(address) = contact.business_address.as_mut() {
        address.id = None;
    }
}

impl Shareable for Contact {
    fn set_access(&mut self, access: Access) {
        self.access = access;
    }

    fn errors_mut(&mut self) -> &mut FieldErrors {
        &mut self.errors
    }

    fn validate(&self, grant_count: usize) -> FieldErrors {
        Contact::validate(self, grant_count)
    }

    fn insert(&mut self, conn: &Connection) -> CrmResult<()> {
        contact_repo::insert(conn, self)
    }

    fn update(&mut self, conn: &Connection) -> CrmResult<()> {
        contact_repo::update(conn, self)
    }
}
