use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::helpers::{new_id, timestamp};

pub const DEFAULT_MAX_PARTICIPANTS: i64 = 2;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Room {
    pub id: String,
    pub profile_picture: Option<String>,
    pub name: String,
    pub about: Option<String>,
    pub max_participants: i64,
    pub admins_only: bool,
    pub erasable_messages: bool,
    pub created_by: String,
    pub created_at: String,
}

fn default_max_participants() -> i64 {
    DEFAULT_MAX_PARTICIPANTS
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default = "default_max_participants")]
    pub max_participants: i64,
    #[serde(default)]
    pub admins_only: bool,
    #[serde(default = "default_true")]
    pub erasable_messages: bool,
}

impl Default for CreateRoomRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            about: None,
            profile_picture: None,
            max_participants: DEFAULT_MAX_PARTICIPANTS,
            admins_only: false,
            erasable_messages: true,
        }
    }
}

impl Room {
    pub fn new(request: CreateRoomRequest, created_by: String) -> Self {
        Self {
            id: new_id(),
            profile_picture: request.profile_picture,
            name: request.name,
            about: request.about,
            max_participants: request.max_participants,
            admins_only: request.admins_only,
            erasable_messages: request.erasable_messages,
            created_by,
            created_at: timestamp(Utc::now()),
        }
    }

    pub fn is_group(&self) -> bool {
        self.max_participants > 2
    }
}
