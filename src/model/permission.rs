use serde::{Deserialize, Serialize};

use super::ids::Id;
use super::user::User;

/// Who may see a record besides its creator and assignee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    #[default]
    Private,
    Public,
    Shared,
}

impl Access {
    pub const ALL: &'static [Access] = &[Access::Private, Access::Public, Access::Shared];

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Private" => Some(Access::Private),
            "Public" => Some(Access::Public),
            "Shared" => Some(Access::Shared),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Access::Private => "Private",
            Access::Public => "Public",
            Access::Shared => "Shared",
        }
    }
}

/// Access as submitted by a form. The lead conversion form offers a
/// "same as lead" choice that never reaches storage: it is resolved into the
/// source record's own access and grants at save time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessRequest {
    #[default]
    Private,
    Public,
    Shared,
    Lead,
}

impl AccessRequest {
    /// The concrete access level, or `None` for [`AccessRequest::Lead`].
    pub fn concrete(&self) -> Option<Access> {
        match self {
            AccessRequest::Private => Some(Access::Private),
            AccessRequest::Public => Some(Access::Public),
            AccessRequest::Shared => Some(Access::Shared),
            AccessRequest::Lead => None,
        }
    }

    pub fn from_form_str(s: &str) -> Option<Self> {
        match s {
            "Lead" => Some(AccessRequest::Lead),
            other => Access::from_db_str(other).map(AccessRequest::from),
        }
    }
}

impl From<Access> for AccessRequest {
    fn from(access: Access) -> Self {
        match access {
            Access::Private => AccessRequest::Private,
            Access::Public => AccessRequest::Public,
            Access::Shared => AccessRequest::Shared,
        }
    }
}

/// A record that can carry permission grants, comments and tasks.
/// Grants, comments and tasks are keyed by `(ASSET_TYPE, asset_id)`.
pub trait Asset {
    const ASSET_TYPE: &'static str;

    /// Row id, or `None` while the record is unsaved.
    fn asset_id(&self) -> Option<i64>;

    fn access(&self) -> Access;
}

/// Grants `user_id` access to one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub user_id: Id<User>,
    pub asset_type: String,
    pub asset_id: i64,
}
