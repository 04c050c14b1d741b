use sqlx::Row;

use crate::database::DbPool;
use crate::models::room::Room;
use crate::utils::error::{AppError, AppResult};

pub async fn check_room_admin(pool: &DbPool, user_id: &str, room_id: &str) -> AppResult<bool> {
    let count = sqlx::query(
        "SELECT COUNT(*) as count FROM participants
         WHERE room_id = ? AND user_id = ? AND is_admin = 1",
    )
    .bind(room_id)
    .bind(user_id)
    .fetch_one(pool.as_ref())
    .await?
    .get::<i64, _>("count");

    Ok(count > 0)
}

/// The creator keeps control of a room even after leaving it.
pub async fn require_room_admin(pool: &DbPool, user_id: &str, room: &Room) -> AppResult<()> {
    if room.created_by == user_id {
        return Ok(());
    }

    if !check_room_admin(pool, user_id, &room.id).await? {
        return Err(AppError::Forbidden(
            "Room admin privileges required".to_string(),
        ));
    }

    Ok(())
}
