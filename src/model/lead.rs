use serde::{Deserialize, Serialize};

use super::address::Address;
use super::ids::Id;
use super::permission::{Access, Asset};
use super::user::User;

/// A pre-qualification record that can be converted into a contact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lead {
    pub id: Option<Id<Lead>>,
    pub user_id: Option<Id<User>>,
    pub assigned_to: Option<Id<User>>,
    pub first_name: String,
    pub last_name: String,
    pub access: Access,
    pub title: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub email: Option<String>,
    pub alt_email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub blog: Option<String>,
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub do_not_call: bool,
    pub background_info: Option<String>,
    pub business_address: Option<Address>,
}

impl Lead {
    pub fn create(first_name: String, last_name: String) -> Self {
        Self {
            first_name,
            last_name,
            ..Self::default()
        }
    }
}

impl Asset for Lead {
    const ASSET_TYPE: &'static str = "Lead";

    fn asset_id(&self) -> Option<i64> {
        self.id.map(|id| id.value)
    }

    fn access(&self) -> Access {
        self.access
    }
}
