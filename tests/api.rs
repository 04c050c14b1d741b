use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use chatrooms::database::create_memory_pool;
use chatrooms::middleware::auth::AUTH_USER_HEADER;
use chatrooms::server::route_builder::build_router;

async fn app() -> Router {
    let db = create_memory_pool()
        .await
        .expect("Failed to create in-memory database");
    build_router(db)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user_id: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header(AUTH_USER_HEADER, user_id);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "username": username })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_index_renders() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_requests_need_a_known_user() {
    let app = app().await;

    let (status, _) = send(&app, Method::GET, "/api/rooms", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/rooms", Some("ghost"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let alice = register(&app, "alice").await;
    let (status, body) = send(&app, Method::GET, "/api/users/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn test_group_room_without_name_is_rejected() {
    let app = app().await;
    let alice = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/rooms",
        Some(&alice),
        Some(json!({ "max_participants": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["message"], "Group Rooms need a name!");
}

#[tokio::test]
async fn test_direct_room_lifecycle() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let carol = register(&app, "carol").await;

    let (status, room) = send(&app, Method::POST, "/api/rooms", Some(&alice), Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let room_id = room["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/rooms/{}/participants", room_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, details) = send(
        &app,
        Method::GET,
        &format!("/api/rooms/{}", room_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(details["name"], "alice & ...");
    assert_eq!(details["participant_count"], 2);
    assert_eq!(details["is_group"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/rooms/{}/participants", room_id),
        Some(&carol),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Room full!");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/rooms/{}/messages", room_id),
        Some(&carol),
        Some(json!({ "text": "let me in" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);

    let (status, message) = send(
        &app,
        Method::POST,
        &format!("/api/rooms/{}/messages", room_id),
        Some(&bob),
        Some(json!({ "text": "hi alice", "disappearing": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(message["disappearing_at"].is_string());

    let (_, messages) = send(
        &app,
        Method::GET,
        &format!("/api/rooms/{}/messages", room_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(messages.as_array().unwrap().len(), 1);
    assert_eq!(messages[0]["sender_username"], "bob");

    let (status, stats) = send(&app, Method::GET, "/api/messages/stats", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let buckets = stats.as_object().unwrap();
    assert_eq!(buckets.len(), 24);
    let total: i64 = buckets.values().map(|v| v.as_i64().unwrap()).sum();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_admins_only_room() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let (_, room) = send(
        &app,
        Method::POST,
        "/api/rooms",
        Some(&alice),
        Some(json!({ "name": "News", "max_participants": 50, "admins_only": true })),
    )
    .await;
    let room_id = room["id"].as_str().unwrap().to_string();

    // Only admins may grant admin rights.
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/rooms/{}/participants", room_id),
        Some(&bob),
        Some(json!({ "is_admin": true })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    send(
        &app,
        Method::POST,
        &format!("/api/rooms/{}/participants", room_id),
        Some(&bob),
        Some(json!({})),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/rooms/{}/messages", room_id),
        Some(&bob),
        Some(json!({ "text": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only admins can post messages in this room.");

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/rooms/{}/messages", room_id),
        Some(&alice),
        Some(json!({ "text": "welcome" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_contacts() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/contacts",
        Some(&alice),
        Some(json!({ "person_id": bob })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/contacts",
        Some(&alice),
        Some(json!({ "person_id": bob })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/contacts",
        Some(&alice),
        Some(json!({ "person_id": "nobody" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "reference_error");

    let (_, contacts) = send(&app, Method::GET, "/api/contacts", Some(&alice), None).await;
    assert_eq!(contacts.as_array().unwrap().len(), 1);
    assert_eq!(contacts[0]["person_username"], "bob");
}

#[tokio::test]
async fn test_replies_and_erasing() {
    let app = app().await;
    let alice = register(&app, "alice").await;

    let (_, room) = send(
        &app,
        Method::POST,
        "/api/rooms",
        Some(&alice),
        Some(json!({ "name": "Notes", "max_participants": 1 })),
    )
    .await;
    let room_id = room["id"].as_str().unwrap().to_string();

    let (_, first) = send(
        &app,
        Method::POST,
        &format!("/api/rooms/{}/messages", room_id),
        Some(&alice),
        Some(json!({ "text": "todo" })),
    )
    .await;
    let first_id = first["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/rooms/{}/messages", room_id),
        Some(&alice),
        Some(json!({ "text": "done", "reply_to": first_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, replies) = send(
        &app,
        Method::GET,
        &format!("/api/messages/{}/replies", first_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(replies.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/messages/{}", first_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, messages) = send(
        &app,
        Method::GET,
        &format!("/api/rooms/{}/messages", room_id),
        Some(&alice),
        None,
    )
    .await;
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["text"], "done");
    assert!(messages[0]["reply_to_id"].is_null());
}
