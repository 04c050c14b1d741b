use sqlx::Row;

use crate::database::DbPool;
use crate::models::user::User;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::validate_username;

pub async fn register_user(pool: &DbPool, username: String) -> AppResult<User> {
    validate_username(&username)?;

    let user = User::new(username);

    sqlx::query("INSERT INTO users (id, username, created_at) VALUES (?, ?, ?)")
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.created_at)
        .execute(pool.as_ref())
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("Username already taken".to_string()),
            other => other,
        })?;

    tracing::info!("Registered user {} ({})", user.username, user.id);

    Ok(user)
}

pub async fn get_user(pool: &DbPool, user_id: &str) -> AppResult<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn user_exists(pool: &DbPool, user_id: &str) -> AppResult<bool> {
    let count = sqlx::query("SELECT COUNT(*) as count FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(pool.as_ref())
        .await?
        .get::<i64, _>("count");

    Ok(count > 0)
}

/// Removes the user together with their contacts, the rooms they created and
/// their memberships.
pub async fn delete_user(pool: &DbPool, user_id: &str) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool.as_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!("Deleted user {}", user_id);
    Ok(())
}
