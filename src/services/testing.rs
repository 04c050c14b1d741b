use crate::database::{DbPool, create_memory_pool};
use crate::models::room::{CreateRoomRequest, Room};
use crate::models::user::User;
use crate::services::room::create_room;
use crate::services::user::register_user;

pub async fn test_pool() -> DbPool {
    create_memory_pool()
        .await
        .expect("Failed to create in-memory database")
}

pub async fn test_user(pool: &DbPool, username: &str) -> User {
    register_user(pool, username.to_string())
        .await
        .expect("Failed to register test user")
}

pub async fn test_room(pool: &DbPool, creator: &User, request: CreateRoomRequest) -> Room {
    create_room(pool, creator.id.clone(), request)
        .await
        .expect("Failed to create test room")
}

pub fn group(name: &str, max_participants: i64) -> CreateRoomRequest {
    CreateRoomRequest {
        name: name.to_string(),
        max_participants,
        ..Default::default()
    }
}
