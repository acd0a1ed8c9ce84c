//! Saving records together with their sharing grants.
//!
//! A record's creator and assignee can always see it; grants only matter
//! when access is `Shared`, and a shared record must carry at least one.

use log::debug;
use rusqlite::Connection;

use crate::db::permission_repo;
use crate::error::{CrmError, CrmResult, FieldErrors};
use crate::model::{Access, Asset, Id, User};

/// A record whose save path runs through the permission rules.
pub trait Shareable: Asset {
    fn set_access(&mut self, access: Access);

    fn errors_mut(&mut self) -> &mut FieldErrors;

    /// All validation rules of the record, given the number of grants it
    /// will carry once saved.
    fn validate(&self, grant_count: usize) -> FieldErrors;

    fn insert(&mut self, conn: &Connection) -> CrmResult<()>;

    fn update(&mut self, conn: &Connection) -> CrmResult<()>;
}

/// Saves a new record, granting `users` when it is shared.
pub fn save_with_permissions<T: Shareable>(
    conn: &Connection,
    record: &mut T,
    users: &[Id<User>],
) -> CrmResult<()> {
    let grants = if record.access() == Access::Shared {
        distinct(users)
    } else {
        Vec::new()
    };

    check(record, grants.len())?;
    record.insert(conn)?;
    let asset_id = saved_id(record)?;

    for user_id in &grants {
        permission_repo::grant(conn, *user_id, T::ASSET_TYPE, asset_id)?;
    }

    debug!(
        "event=save_with_permissions asset_type={} asset_id={} grants={}",
        T::ASSET_TYPE,
        asset_id,
        grants.len()
    );
    Ok(())
}

/// Saves a record whose new field values have already been applied.
///
/// Non-shared access drops every grant. Shared access with an empty `users`
/// list keeps the current grants; otherwise grants are replaced by `users`.
pub fn update_with_permissions<T: Shareable>(
    conn: &Connection,
    record: &mut T,
    users: &[Id<User>],
) -> CrmResult<()> {
    let asset_id = saved_id(record)?;
    let existing = permission_repo::user_ids_for(conn, T::ASSET_TYPE, asset_id)?;

    let target = if record.access() != Access::Shared {
        Vec::new()
    } else if users.is_empty() {
        existing.clone()
    } else {
        distinct(users)
    };

    check(record, target.len())?;
    record.update(conn)?;

    for user_id in existing.iter().filter(|id| !target.contains(id)) {
        permission_repo::revoke(conn, *user_id, T::ASSET_TYPE, asset_id)?;
    }
    for user_id in target.iter().filter(|id| !existing.contains(id)) {
        permission_repo::grant(conn, *user_id, T::ASSET_TYPE, asset_id)?;
    }

    debug!(
        "event=update_with_permissions asset_type={} asset_id={} grants={}",
        T::ASSET_TYPE,
        asset_id,
        target.len()
    );
    Ok(())
}

/// Saves a new record with the access level and grants of `model`.
pub fn save_with_model_permissions<T: Shareable, M: Asset>(
    conn: &Connection,
    record: &mut T,
    model: &M,
) -> CrmResult<()> {
    record.set_access(model.access());

    let grants = match (model.access(), model.asset_id()) {
        (Access::Shared, Some(model_id)) => permission_repo::user_ids_for(conn, M::ASSET_TYPE, model_id)?,
        _ => Vec::new(),
    };

    check(record, grants.len())?;
    record.insert(conn)?;
    let asset_id = saved_id(record)?;

    for user_id in &grants {
        permission_repo::grant(conn, *user_id, T::ASSET_TYPE, asset_id)?;
    }

    debug!(
        "event=save_with_model_permissions asset_type={} asset_id={} model_type={} grants={}",
        T::ASSET_TYPE,
        asset_id,
        M::ASSET_TYPE,
        grants.len()
    );
    Ok(())
}

/// Users explicitly granted access to the asset.
pub fn granted_users<T: Asset>(conn: &Connection, record: &T) -> CrmResult<Vec<Id<User>>> {
    match record.asset_id() {
        Some(asset_id) => permission_repo::user_ids_for(conn, T::ASSET_TYPE, asset_id),
        None => Ok(Vec::new()),
    }
}

fn check<T: Shareable>(record: &mut T, grant_count: usize) -> CrmResult<()> {
    let errors = record.validate(grant_count);
    *record.errors_mut() = errors.clone();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CrmError::Invalid { errors })
    }
}

fn saved_id<T: Asset>(record: &T) -> CrmResult<i64> {
    record
        .asset_id()
        .ok_or_else(|| CrmError::Other(format!("{} has not been saved", T::ASSET_TYPE)))
}

fn distinct(users: &[Id<User>]) -> Vec<Id<User>> {
    let mut seen = Vec::with_capacity(users.len());
    for user_id in users {
        if !seen.contains(user_id) {
            seen.push(*user_id);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_keeps_first_occurrence_order() {
        let users = [Id::new(3), Id::new(1), Id::new(3), Id::new(2), Id::new(1)];
        assert_eq!(distinct(&users), vec![Id::new(3), Id::new(1), Id::new(2)]);
    }
}
