use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::error::AppResult;
use crate::utils::helpers::{new_id, timestamp};
use crate::utils::validation::validate_message_text;

pub fn disappearing_delay() -> Duration {
    Duration::hours(1)
}

/// Markup is stored as-is; rendering and sanitising happen elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(String);

impl RichText {
    pub fn parse(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        validate_message_text(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: String,
    pub text: Option<String>,
    pub disappearing: bool,
    pub disappearing_at: Option<String>,
    pub reply_to_id: Option<String>,
    pub participant_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessageWithSender {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub message: Message,
    pub sender_user_id: String,
    pub sender_username: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostMessageRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub disappearing: bool,
    #[serde(default)]
    pub disappearing_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(
        participant_id: String,
        text: Option<RichText>,
        reply_to_id: Option<String>,
        disappearing: bool,
        disappearing_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut message = Self {
            id: new_id(),
            text: text.map(RichText::into_inner),
            disappearing,
            disappearing_at: disappearing_at.map(timestamp),
            reply_to_id,
            participant_id,
            created_at: timestamp(now),
        };
        message.set_disappearing_at(now);
        message
    }

    /// Stamps the expiry once; an existing value is never moved.
    pub fn set_disappearing_at(&mut self, now: DateTime<Utc>) {
        if self.disappearing && self.disappearing_at.is_none() {
            self.disappearing_at = Some(timestamp(now + disappearing_delay()));
        }
    }
}
