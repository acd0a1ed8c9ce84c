use serde::{Deserialize, Serialize};

use super::ids::Id;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Option<Id<User>>,
    pub username: String,
    pub email: String,
}

impl User {
    pub fn create(username: String, email: String) -> Self {
        Self {
            id: None,
            username,
            email,
        }
    }
}
