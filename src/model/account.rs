use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::contact::Contact;
use super::ids::Id;
use super::permission::{Access, AccessRequest, Asset};
use super::user::User;
use crate::error::FieldErrors;

/// An organization a contact may belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<Id<Account>>,
    pub user_id: Option<Id<User>>,
    pub assigned_to: Option<Id<User>>,
    pub name: String,
    pub access: Access,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub errors: FieldErrors,
}

impl Account {
    pub fn create(name: String) -> Self {
        Self {
            id: None,
            user_id: None,
            assigned_to: None,
            name,
            access: Access::default(),
            website: None,
            phone: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
            errors: FieldErrors::new(),
        }
    }
}

impl Asset for Account {
    const ASSET_TYPE: &'static str = "Account";

    fn asset_id(&self) -> Option<i64> {
        self.id.map(|id| id.value)
    }

    fn access(&self) -> Access {
        self.access
    }
}

/// Account selection submitted alongside a contact form: either an existing
/// account id, or the fields of a new account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountParams {
    pub id: Option<Id<Account>>,
    pub name: Option<String>,
    pub user_id: Option<Id<User>>,
    pub assigned_to: Option<Id<User>>,
    pub access: AccessRequest,
}

impl AccountParams {
    pub fn existing(id: Id<Account>) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn new_account(name: &str, user_id: Id<User>) -> Self {
        Self {
            name: Some(name.to_string()),
            user_id: Some(user_id),
            ..Self::default()
        }
    }
}

/// Links one contact to one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContact {
    pub id: Option<Id<AccountContact>>,
    pub account_id: Id<Account>,
    pub contact_id: Id<Contact>,
}

impl AccountContact {
    pub fn create(account_id: Id<Account>, contact_id: Id<Contact>) -> Self {
        Self {
            id: None,
            account_id,
            contact_id,
        }
    }
}
