use axum::http::HeaderMap;
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::utils::error::{AppError, AppResult};

/// Stored timestamps always carry microseconds and a `Z` suffix, so that
/// comparing them as text in SQL orders them chronologically.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| AppError::Internal(format!("Invalid stored timestamp {}: {}", value, e)))
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn extract_user_id(headers: &HeaderMap) -> AppResult<String> {
    headers
        .get(crate::middleware::auth::AUTH_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::Unauthorized("Missing user identity".to_string()))
}
