use crate::database::DbPool;
use crate::models::message::Message;
use crate::models::participant::Participant;
use crate::models::room::Room;
use crate::services::room::{count_room_participants, get_room, set_name};
use crate::utils::error::{AppError, AppResult};

const ROOM_FULL: &str = "Room full!";

pub async fn validate_room_max_participants(pool: &DbPool, room: &Room) -> AppResult<()> {
    if count_room_participants(pool, &room.id).await? >= room.max_participants {
        return Err(AppError::validation(ROOM_FULL));
    }

    Ok(())
}

/// Inserts the participant only while the room still has a free seat, as a
/// single statement. Returns false when nothing was inserted.
async fn insert_if_room_has_space(pool: &DbPool, participant: &Participant) -> AppResult<bool> {
    let result = sqlx::query(
        "INSERT INTO participants (id, room_id, user_id, is_admin, date_joined)
         SELECT ?, r.id, ?, ?, ?
         FROM rooms r
         WHERE r.id = ?
           AND (SELECT COUNT(*) FROM participants p WHERE p.room_id = r.id) < r.max_participants",
    )
    .bind(&participant.id)
    .bind(&participant.user_id)
    .bind(participant.is_admin)
    .bind(&participant.date_joined)
    .bind(&participant.room_id)
    .execute(pool.as_ref())
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => {
            AppError::Conflict("User already participates in this room".to_string())
        }
        other => other,
    })?;

    Ok(result.rows_affected() > 0)
}

/// The capacity guard is repeated inside the insert so that two concurrent
/// joins cannot both take the last seat.
pub async fn join_room(
    pool: &DbPool,
    room_id: &str,
    user_id: &str,
    is_admin: bool,
) -> AppResult<Participant> {
    let room = get_room(pool, room_id).await?;
    validate_room_max_participants(pool, &room).await?;

    let participant = Participant::new(room.id.clone(), user_id.to_string(), is_admin);

    if !insert_if_room_has_space(pool, &participant).await? {
        // Either the room filled up since the check or it was deleted.
        get_room(pool, room_id).await?;
        return Err(AppError::validation(ROOM_FULL));
    }

    tracing::info!(
        "User {} joined room {} (admin: {})",
        participant.user_id,
        participant.room_id,
        participant.is_admin
    );

    set_name(pool, room_id).await?;

    Ok(participant)
}

pub async fn get_participant(pool: &DbPool, room_id: &str, user_id: &str) -> AppResult<Participant> {
    sqlx::query_as::<_, Participant>("SELECT * FROM participants WHERE room_id = ? AND user_id = ?")
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))
}

pub async fn get_participant_by_id(pool: &DbPool, participant_id: &str) -> AppResult<Participant> {
    sqlx::query_as::<_, Participant>("SELECT * FROM participants WHERE id = ?")
        .bind(participant_id)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))
}

pub async fn get_participant_messages(
    pool: &DbPool,
    participant_id: &str,
) -> AppResult<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE participant_id = ? ORDER BY created_at ASC, rowid ASC",
    )
    .bind(participant_id)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(messages)
}

/// Leaving drops the membership together with everything the user posted in
/// the room.
pub async fn leave_room(pool: &DbPool, room_id: &str, user_id: &str) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM participants WHERE room_id = ? AND user_id = ?")
        .bind(room_id)
        .bind(user_id)
        .execute(pool.as_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Participant not found".to_string()));
    }

    tracing::info!("User {} left room {}", user_id, room_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::PostMessageRequest;
    use crate::services::message::post_message;
    use crate::services::testing::{group, test_pool, test_room, test_user};

    #[tokio::test]
    async fn test_join_until_full() {
        let pool = test_pool().await;
        let alice = test_user(&pool, "alice").await;
        let bob = test_user(&pool, "bob").await;
        let carol = test_user(&pool, "carol").await;
        let dave = test_user(&pool, "dave").await;
        let room = test_room(&pool, &alice, group("Trio", 3)).await;

        join_room(&pool, &room.id, &bob.id, false).await.unwrap();
        assert_eq!(count_room_participants(&pool, &room.id).await.unwrap(), 2);

        let carol_in_room = join_room(&pool, &room.id, &carol.id, false).await.unwrap();
        assert!(!carol_in_room.is_admin);
        assert_eq!(count_room_participants(&pool, &room.id).await.unwrap(), 3);

        let err = join_room(&pool, &room.id, &dave.id, false).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg == "Room full!"));
        assert_eq!(count_room_participants(&pool, &room.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_direct_room_is_full_after_second_join() {
        let pool = test_pool().await;
        let alice = test_user(&pool, "alice").await;
        let bob = test_user(&pool, "bob").await;
        let carol = test_user(&pool, "carol").await;
        let room = test_room(&pool, &alice, Default::default()).await;

        join_room(&pool, &room.id, &bob.id, false).await.unwrap();
        assert!(validate_room_max_participants(&pool, &room).await.is_err());
        assert!(join_room(&pool, &room.id, &carol.id, false).await.is_err());
    }

    #[tokio::test]
    async fn test_guarded_insert_refuses_last_seat_taken() {
        let pool = test_pool().await;
        let alice = test_user(&pool, "alice").await;
        let bob = test_user(&pool, "bob").await;
        let carol = test_user(&pool, "carol").await;
        let room = test_room(&pool, &alice, Default::default()).await;

        // Both joiners passed the advisory check while one seat was free.
        assert!(validate_room_max_participants(&pool, &room).await.is_ok());
        let bob_seat = Participant::new(room.id.clone(), bob.id.clone(), false);
        let carol_seat = Participant::new(room.id.clone(), carol.id.clone(), false);

        assert!(insert_if_room_has_space(&pool, &bob_seat).await.unwrap());
        assert!(!insert_if_room_has_space(&pool, &carol_seat).await.unwrap());
        assert_eq!(
            count_room_participants(&pool, &room.id).await.unwrap(),
            room.max_participants
        );

        let err = join_room(&pool, &room.id, &carol.id, false).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg == "Room full!"));
        assert_eq!(count_room_participants(&pool, &room.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_join_twice() {
        let pool = test_pool().await;
        let alice = test_user(&pool, "alice").await;
        let bob = test_user(&pool, "bob").await;
        let room = test_room(&pool, &alice, group("Team", 10)).await;

        join_room(&pool, &room.id, &bob.id, false).await.unwrap();
        for _ in 0..2 {
            let err = join_room(&pool, &room.id, &bob.id, false).await.unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)));
        }
        assert_eq!(count_room_participants(&pool, &room.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_join_missing_room() {
        let pool = test_pool().await;
        let bob = test_user(&pool, "bob").await;

        let err = join_room(&pool, "missing", &bob.id, false).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_leave_room_removes_messages() {
        let pool = test_pool().await;
        let alice = test_user(&pool, "alice").await;
        let bob = test_user(&pool, "bob").await;
        let room = test_room(&pool, &alice, group("Team", 10)).await;
        let bob_in_room = join_room(&pool, &room.id, &bob.id, false).await.unwrap();

        post_message(
            &pool,
            &bob_in_room.id,
            PostMessageRequest {
                text: Some("bye".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(
            get_participant_messages(&pool, &bob_in_room.id)
                .await
                .unwrap()
                .len(),
            1
        );

        leave_room(&pool, &room.id, &bob.id).await.unwrap();
        assert!(get_participant_messages(&pool, &bob_in_room.id)
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            get_participant_by_id(&pool, &bob_in_room.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(leave_room(&pool, &room.id, &bob.id).await.is_err());
    }
}
