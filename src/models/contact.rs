use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::helpers::{new_id, timestamp};

/// One-directional: `owner_id` keeps `person_id` in their address book.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub id: String,
    pub owner_id: String,
    pub person_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactWithPerson {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub contact: Contact,
    pub person_username: String,
}

impl Contact {
    pub fn new(owner_id: String, person_id: String) -> Self {
        Self {
            id: new_id(),
            owner_id,
            person_id,
            created_at: timestamp(Utc::now()),
        }
    }
}
