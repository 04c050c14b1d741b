use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::AppState;
use crate::models::message::{Message, MessageWithSender, PostMessageRequest};
use crate::models::participant::{Participant, ParticipantWithUser};
use crate::models::room::{CreateRoomRequest, Room};
use crate::services::message::post_message;
use crate::services::participant::{get_participant, join_room, leave_room};
use crate::services::room::{
    count_room_participants, create_room, delete_room, get_room, get_room_messages,
    get_room_participants, get_user_rooms,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::helpers::extract_user_id;
use crate::utils::permissions::require_room_admin;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Serialize)]
struct RoomDetails {
    #[serde(flatten)]
    room: Room,
    is_group: bool,
    participant_count: i64,
}

#[derive(Deserialize, Default)]
struct JoinRoomRequest {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    is_admin: bool,
}

#[derive(Deserialize)]
struct GetMessagesQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateRoomRequest>,
) -> AppResult<(StatusCode, Json<Room>)> {
    let creator_id = extract_user_id(&headers)?;
    let room = create_room(&state.db, creator_id, req).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Room>>> {
    let user_id = extract_user_id(&headers)?;
    Ok(Json(get_user_rooms(&state.db, &user_id).await?))
}

async fn details(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> AppResult<Json<RoomDetails>> {
    let room = get_room(&state.db, &room_id).await?;
    let participant_count = count_room_participants(&state.db, &room.id).await?;

    Ok(Json(RoomDetails {
        is_group: room.is_group(),
        participant_count,
        room,
    }))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
) -> AppResult<StatusCode> {
    let user_id = extract_user_id(&headers)?;
    delete_room(&state.db, &room_id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn participants(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> AppResult<Json<Vec<ParticipantWithUser>>> {
    get_room(&state.db, &room_id).await?;
    Ok(Json(get_room_participants(&state.db, &room_id).await?))
}

/// Anyone may join on their own; adding someone else or granting admin
/// rights is reserved to room admins.
async fn join(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
    req: Option<Json<JoinRoomRequest>>,
) -> AppResult<(StatusCode, Json<Participant>)> {
    let requester_id = extract_user_id(&headers)?;
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let user_id = req.user_id.unwrap_or_else(|| requester_id.clone());

    if user_id != requester_id || req.is_admin {
        let room = get_room(&state.db, &room_id).await?;
        require_room_admin(&state.db, &requester_id, &room).await?;
    }

    let participant = join_room(&state.db, &room_id, &user_id, req.is_admin).await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

async fn leave(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
) -> AppResult<StatusCode> {
    let user_id = extract_user_id(&headers)?;
    leave_room(&state.db, &room_id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn messages(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<GetMessagesQuery>,
) -> AppResult<Json<Vec<MessageWithSender>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    get_room(&state.db, &room_id).await?;
    Ok(Json(
        get_room_messages(&state.db, &room_id, limit, offset).await?,
    ))
}

async fn post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
    Json(req): Json<PostMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let user_id = extract_user_id(&headers)?;
    let participant = get_participant(&state.db, &room_id, &user_id)
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => {
                AppError::Forbidden("You must join this room to post messages".to_string())
            }
            other => other,
        })?;

    let message = post_message(&state.db, &participant.id, req).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:room_id", get(details).delete(remove))
        .route("/:room_id/participants", get(participants).post(join))
        .route("/:room_id/participants/me", delete(leave))
        .route("/:room_id/messages", get(messages).post(post))
        .with_state(state)
}
