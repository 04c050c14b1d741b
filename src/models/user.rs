use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::utils::helpers::{new_id, timestamp};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

impl User {
    pub fn new(username: String) -> Self {
        Self {
            id: new_id(),
            username,
            created_at: timestamp(chrono::Utc::now()),
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}
