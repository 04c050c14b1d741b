use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::helpers::{new_id, timestamp};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub is_admin: bool,
    pub date_joined: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ParticipantWithUser {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub participant: Participant,
    pub username: String,
}

impl Participant {
    pub fn new(room_id: String, user_id: String, is_admin: bool) -> Self {
        Self {
            id: new_id(),
            room_id,
            user_id,
            is_admin,
            date_joined: timestamp(Utc::now()),
        }
    }
}
