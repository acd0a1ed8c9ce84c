use log::{debug, warn};
use rusqlite::Connection;

use super::permission_ops::{self, Shareable};
use crate::db::account_repo;
use crate::error::{CrmError, CrmResult, FieldErrors};
use crate::model::{Access, Account, AccountParams, Asset, Id, User};

/// Picks the account named by `params.id`, or creates one from the other
/// params. A new account that fails validation is returned unsaved, with
/// its errors recorded on it.
///
/// `context` is the record the account is being created for; its access and
/// grants are copied when `params.access` asks for the lead's access.
pub fn create_or_select_for<M: Asset>(
    conn: &Connection,
    context: Option<&M>,
    params: &AccountParams,
    users: &[Id<User>],
) -> CrmResult<Account> {
    if let Some(id) = params.id {
        debug!("event=account_select account_id={}", id);
        return account_repo::find_by_id(conn, id)?
            .ok_or_else(|| CrmError::not_found("Account", id));
    }

    let mut account = Account::create(params.name.as_deref().unwrap_or("").trim().to_string());
    account.user_id = params.user_id;
    account.assigned_to = params.assigned_to;

    let saved = match (params.access.concrete(), context) {
        (None, Some(model)) => permission_ops::save_with_model_permissions(conn, &mut account, model),
        (access, _) => {
            account.access = access.unwrap_or_default();
            permission_ops::save_with_permissions(conn, &mut account, users)
        }
    };

    match saved {
        Ok(()) => Ok(account),
        Err(CrmError::Invalid { errors }) => {
            warn!("event=account_create status=invalid errors=\"{}\"", errors);
            Ok(account)
        }
        Err(e) => Err(e),
    }
}

impl Shareable for Account {
    fn set_access(&mut self, access: Access) {
        self.access = access;
    }

    fn errors_mut(&mut self) -> &mut FieldErrors {
        &mut self.errors
    }

    fn validate(&self, grant_count: usize) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "missing_account_name");
        }
        if self.access == Access::Shared && grant_count == 0 {
            errors.add("access", "share_account");
        }
        errors
    }

    fn insert(&mut self, conn: &Connection) -> CrmResult<()> {
        account_repo::insert(conn, self)
    }

    fn update(&mut self, conn: &Connection) -> CrmResult<()> {
        account_repo::update(conn, self)
    }
}
