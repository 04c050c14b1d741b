use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::models::user::User;
use crate::services::user::{get_user, register_user};
use crate::utils::error::AppResult;
use crate::utils::helpers::extract_user_id;

#[derive(Deserialize)]
struct RegisterUserRequest {
    username: String,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = register_user(&state.db, req.username).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn me(State(state): State<Arc<AppState>>, headers: HeaderMap) -> AppResult<Json<User>> {
    let user_id = extract_user_id(&headers)?;
    Ok(Json(get_user(&state.db, &user_id).await?))
}

pub fn public_routes(state: Arc<AppState>) -> Router {
    Router::new().route("/", post(register)).with_state(state)
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new().route("/me", get(me)).with_state(state)
}
