use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::api::AppState;
use crate::services::user::user_exists;
use crate::utils::error::AppError;
use crate::utils::helpers::extract_user_id;

/// Set by the host application once it has authenticated the caller.
pub const AUTH_USER_HEADER: &str = "x-user-id";

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = extract_user_id(request.headers())?;

    if !user_exists(&state.db, &user_id).await? {
        return Err(AppError::Unauthorized("Unknown user".to_string()));
    }

    Ok(next.run(request).await)
}
