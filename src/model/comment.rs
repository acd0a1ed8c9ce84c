use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::ids::Id;
use super::user::User;

/// A note left on an asset by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Option<Id<Comment>>,
    pub user_id: Id<User>,
    pub commentable_type: String,
    pub commentable_id: i64,
    pub comment: String,
    pub created_at: Option<NaiveDateTime>,
}
