use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch},
};
use std::sync::Arc;

use crate::api::AppState;
use crate::models::message::Message;
use crate::services::message::{
    UpdateMessageRequest, delete_message, get_message, get_replies, update_message,
};
use crate::services::stats::{MessageVolume, get_message_volume_stats};
use crate::utils::error::AppResult;
use crate::utils::helpers::extract_user_id;

async fn volume_stats(State(state): State<Arc<AppState>>) -> AppResult<Json<MessageVolume>> {
    Ok(Json(get_message_volume_stats(&state.db).await?))
}

async fn update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(message_id): Path<String>,
    Json(req): Json<UpdateMessageRequest>,
) -> AppResult<Json<Message>> {
    let user_id = extract_user_id(&headers)?;
    Ok(Json(
        update_message(&state.db, &message_id, &user_id, req).await?,
    ))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(message_id): Path<String>,
) -> AppResult<StatusCode> {
    let user_id = extract_user_id(&headers)?;
    delete_message(&state.db, &message_id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn replies(
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<String>,
) -> AppResult<Json<Vec<Message>>> {
    get_message(&state.db, &message_id).await?;
    Ok(Json(get_replies(&state.db, &message_id).await?))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/stats", get(volume_stats))
        .route("/:message_id", patch(update).delete(remove))
        .route("/:message_id/replies", get(replies))
        .with_state(state)
}
