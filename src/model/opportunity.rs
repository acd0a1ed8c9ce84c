use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::contact::Contact;
use super::ids::Id;
use super::permission::{Access, Asset};
use super::user::User;
use crate::error::FieldErrors;

/// A sales-pipeline deal. May be linked to any number of contacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: Option<Id<Opportunity>>,
    pub user_id: Option<Id<User>>,
    pub assigned_to: Option<Id<User>>,
    pub name: String,
    pub stage: Option<String>,
    pub access: Access,
    pub created_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub errors: FieldErrors,
}

impl Opportunity {
    pub fn create(name: String) -> Self {
        Self {
            id: None,
            user_id: None,
            assigned_to: None,
            name,
            stage: None,
            access: Access::default(),
            created_at: None,
            deleted_at: None,
            errors: FieldErrors::new(),
        }
    }
}

impl Asset for Opportunity {
    const ASSET_TYPE: &'static str = "Opportunity";

    fn asset_id(&self) -> Option<i64> {
        self.id.map(|id| id.value)
    }

    fn access(&self) -> Access {
        self.access
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactOpportunity {
    pub contact_id: Id<Contact>,
    pub opportunity_id: Id<Opportunity>,
    pub role: Option<String>,
}
