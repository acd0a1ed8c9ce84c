use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::ids::Id;
use super::user::User;

/// A to-do attached to an asset. Destroyed together with its asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<Id<Task>>,
    pub user_id: Option<Id<User>>,
    pub asset_type: String,
    pub asset_id: i64,
    pub name: String,
    pub created_at: Option<NaiveDateTime>,
}

/// An audit entry recorded against a subject. Outlives its subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Option<Id<Activity>>,
    pub user_id: Option<Id<User>>,
    pub subject_type: String,
    pub subject_id: i64,
    pub action: String,
    pub created_at: Option<NaiveDateTime>,
}
