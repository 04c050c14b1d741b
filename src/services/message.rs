use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::database::DbPool;
use crate::models::message::{Message, PostMessageRequest, RichText};
use crate::models::participant::Participant;
use crate::models::room::Room;
use crate::utils::error::{AppError, AppResult};
use crate::utils::helpers::timestamp;
use crate::utils::permissions::check_room_admin;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMessageRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub disappearing: Option<bool>,
}

pub fn validate_admins_only(room: &Room, participant: &Participant) -> AppResult<()> {
    if room.admins_only && !participant.is_admin {
        return Err(AppError::validation(
            "Only admins can post messages in this room.",
        ));
    }

    Ok(())
}

pub async fn post_message(
    pool: &DbPool,
    participant_id: &str,
    request: PostMessageRequest,
) -> AppResult<Message> {
    let text = request.text.map(RichText::parse).transpose()?;

    let mut tx = pool.begin().await?;

    let participant = sqlx::query_as::<_, Participant>("SELECT * FROM participants WHERE id = ?")
        .bind(participant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))?;

    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(&participant.room_id)
        .fetch_one(&mut *tx)
        .await?;

    validate_admins_only(&room, &participant)?;

    if let Some(reply_to) = &request.reply_to {
        let target_room: Option<String> = sqlx::query_scalar(
            "SELECT p.room_id FROM messages m
             JOIN participants p ON p.id = m.participant_id
             WHERE m.id = ?",
        )
        .bind(reply_to)
        .fetch_optional(&mut *tx)
        .await?;

        match target_room {
            None => {
                return Err(AppError::Reference(
                    "The message being replied to does not exist".to_string(),
                ));
            }
            Some(target_room) if target_room != room.id => {
                return Err(AppError::validation(
                    "Replies must stay in the same room.",
                ));
            }
            Some(_) => {}
        }
    }

    let message = Message::new(
        participant.id,
        text,
        request.reply_to,
        request.disappearing,
        request.disappearing_at,
        Utc::now(),
    );

    sqlx::query(
        "INSERT INTO messages (id, text, disappearing, disappearing_at, reply_to_id, participant_id, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&message.id)
    .bind(&message.text)
    .bind(message.disappearing)
    .bind(&message.disappearing_at)
    .bind(&message.reply_to_id)
    .bind(&message.participant_id)
    .bind(&message.created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!("Message {} posted in room {}", message.id, room.id);

    Ok(message)
}

pub async fn get_message(pool: &DbPool, message_id: &str) -> AppResult<Message> {
    sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?")
        .bind(message_id)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found".to_string()))
}

/// Oldest first.
pub async fn get_replies(pool: &DbPool, message_id: &str) -> AppResult<Vec<Message>> {
    let replies = sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE reply_to_id = ? ORDER BY created_at ASC, rowid ASC",
    )
    .bind(message_id)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(replies)
}

async fn get_author(pool: &DbPool, message: &Message) -> AppResult<Participant> {
    sqlx::query_as::<_, Participant>("SELECT * FROM participants WHERE id = ?")
        .bind(&message.participant_id)
        .fetch_one(pool.as_ref())
        .await
        .map_err(AppError::from)
}

/// Saves an edit by the author. An expiry that is already set stays put.
pub async fn update_message(
    pool: &DbPool,
    message_id: &str,
    requester_id: &str,
    request: UpdateMessageRequest,
) -> AppResult<Message> {
    let mut message = get_message(pool, message_id).await?;
    let author = get_author(pool, &message).await?;

    if author.user_id != requester_id {
        return Err(AppError::Forbidden(
            "Only the author can edit a message".to_string(),
        ));
    }

    if let Some(text) = request.text {
        message.text = Some(RichText::parse(text)?.into_inner());
    }
    if let Some(disappearing) = request.disappearing {
        message.disappearing = disappearing;
    }
    message.set_disappearing_at(Utc::now());

    sqlx::query("UPDATE messages SET text = ?, disappearing = ?, disappearing_at = ? WHERE id = ?")
        .bind(&message.text)
        .bind(message.disappearing)
        .bind(&message.disappearing_at)
        .bind(&message.id)
        .execute(pool.as_ref())
        .await?;

    Ok(message)
}

/// Authors and room admins may erase messages, as long as the room allows it.
/// Replies stay and lose their reference.
pub async fn delete_message(pool: &DbPool, message_id: &str, requester_id: &str) -> AppResult<()> {
    let message = get_message(pool, message_id).await?;
    let author = get_author(pool, &message).await?;

    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(&author.room_id)
        .fetch_one(pool.as_ref())
        .await?;

    if !room.erasable_messages {
        return Err(AppError::Forbidden(
            "Messages in this room cannot be erased".to_string(),
        ));
    }

    if author.user_id != requester_id && !check_room_admin(pool, requester_id, &room.id).await? {
        return Err(AppError::Forbidden(
            "Only the author or a room admin can erase a message".to_string(),
        ));
    }

    sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(&message.id)
        .execute(pool.as_ref())
        .await?;

    tracing::debug!("Message {} erased by {}", message.id, requester_id);
    Ok(())
}

/// Removes every message whose expiry has passed. Returns how many were
/// removed; replies to them stay and lose their reference.
pub async fn delete_disappearing_messages(pool: &DbPool) -> AppResult<u64> {
    let result = sqlx::query(
        "DELETE FROM messages WHERE disappearing_at IS NOT NULL AND disappearing_at <= ?",
    )
    .bind(timestamp(Utc::now()))
    .execute(pool.as_ref())
    .await?;

    Ok(result.rows_affected())
}
