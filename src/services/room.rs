use sqlx::{Row, SqliteConnection};

use crate::database::DbPool;
use crate::models::message::MessageWithSender;
use crate::models::participant::{Participant, ParticipantWithUser};
use crate::models::room::{CreateRoomRequest, Room};
use crate::services::user::get_user;
use crate::utils::error::{AppError, AppResult};
use crate::utils::permissions::require_room_admin;
use crate::utils::validation::{
    validate_max_participants, validate_profile_picture, validate_room_about, validate_room_name,
};

pub fn validate_room(request: &CreateRoomRequest) -> AppResult<()> {
    validate_max_participants(request.max_participants)?;
    validate_room_name(&request.name, request.max_participants)?;
    validate_room_about(request.about.as_deref())?;
    validate_profile_picture(request.profile_picture.as_deref())?;
    Ok(())
}

/// Creates the room and joins its creator as admin in one transaction.
pub async fn create_room(
    pool: &DbPool,
    creator_id: String,
    request: CreateRoomRequest,
) -> AppResult<Room> {
    validate_room(&request)?;

    let room = Room::new(request, creator_id);

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO rooms (id, profile_picture, name, about, max_participants, admins_only, erasable_messages, created_by, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&room.id)
    .bind(&room.profile_picture)
    .bind(&room.name)
    .bind(&room.about)
    .bind(room.max_participants)
    .bind(room.admins_only)
    .bind(room.erasable_messages)
    .bind(&room.created_by)
    .bind(&room.created_at)
    .execute(&mut *tx)
    .await?;

    auto_join_room(&mut tx, &room).await?;

    tx.commit().await?;

    tracing::info!(
        "Room {} created by {} (max participants: {})",
        room.id,
        room.created_by,
        room.max_participants
    );

    Ok(room)
}

/// Joins the creator as admin unless they already participate. Capacity is
/// not checked: the creator always fits. Returns whether a row was added.
pub async fn auto_join_room(conn: &mut SqliteConnection, room: &Room) -> AppResult<bool> {
    let participant = Participant::new(room.id.clone(), room.created_by.clone(), true);

    let result = sqlx::query(
        "INSERT INTO participants (id, room_id, user_id, is_admin, date_joined)
         SELECT ?, ?, ?, ?, ?
         WHERE NOT EXISTS (SELECT 1 FROM participants WHERE room_id = ? AND user_id = ?)",
    )
    .bind(&participant.id)
    .bind(&participant.room_id)
    .bind(&participant.user_id)
    .bind(participant.is_admin)
    .bind(&participant.date_joined)
    .bind(&participant.room_id)
    .bind(&participant.user_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get_room(pool: &DbPool, room_id: &str) -> AppResult<Room> {
    sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(room_id)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Room not found".to_string()))
}

pub async fn get_user_rooms(pool: &DbPool, user_id: &str) -> AppResult<Vec<Room>> {
    let rooms = sqlx::query_as::<_, Room>(
        "SELECT r.*
         FROM rooms r
         JOIN participants p ON p.room_id = r.id
         WHERE p.user_id = ?
         ORDER BY r.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(rooms)
}

pub async fn count_room_participants(pool: &DbPool, room_id: &str) -> AppResult<i64> {
    let count = sqlx::query("SELECT COUNT(*) as count FROM participants WHERE room_id = ?")
        .bind(room_id)
        .fetch_one(pool.as_ref())
        .await?
        .get::<i64, _>("count");

    Ok(count)
}

pub async fn get_room_participants(
    pool: &DbPool,
    room_id: &str,
) -> AppResult<Vec<ParticipantWithUser>> {
    let participants = sqlx::query_as::<_, ParticipantWithUser>(
        "SELECT p.*, u.username
         FROM participants p
         JOIN users u ON u.id = p.user_id
         WHERE p.room_id = ?
         ORDER BY p.date_joined ASC",
    )
    .bind(room_id)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(participants)
}

/// Newest first.
pub async fn get_room_messages(
    pool: &DbPool,
    room_id: &str,
    limit: i64,
    offset: i64,
) -> AppResult<Vec<MessageWithSender>> {
    let messages = sqlx::query_as::<_, MessageWithSender>(
        "SELECT m.*, p.user_id as sender_user_id, u.username as sender_username
         FROM messages m
         JOIN participants p ON p.id = m.participant_id
         JOIN users u ON u.id = p.user_id
         WHERE p.room_id = ?
         ORDER BY m.created_at DESC, m.rowid DESC
         LIMIT ? OFFSET ?",
    )
    .bind(room_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(messages)
}

/// Two-party rooms without a name are shown as "<creator> & ...".
pub async fn set_name(pool: &DbPool, room_id: &str) -> AppResult<Room> {
    let mut room = get_room(pool, room_id).await?;

    if !room.name.is_empty() || count_room_participants(pool, room_id).await? != 2 {
        return Ok(room);
    }

    let creator = get_user(pool, &room.created_by).await?;
    room.name = format!("{} & ...", creator);

    sqlx::query("UPDATE rooms SET name = ? WHERE id = ? AND name = ''")
        .bind(&room.name)
        .bind(&room.id)
        .execute(pool.as_ref())
        .await?;

    Ok(room)
}

/// Deletes the room with its participants and their messages.
pub async fn delete_room(pool: &DbPool, room_id: &str, requester_id: &str) -> AppResult<()> {
    let room = get_room(pool, room_id).await?;
    require_room_admin(pool, requester_id, &room).await?;

    sqlx::query("DELETE FROM rooms WHERE id = ?")
        .bind(&room.id)
        .execute(pool.as_ref())
        .await?;

    tracing::info!("Room {} deleted by {}", room.id, requester_id);
    Ok(())
}
