use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::models::contact::{Contact, ContactWithPerson};
use crate::services::contact::{add_contact, get_contacts, remove_contact};
use crate::utils::error::AppResult;
use crate::utils::helpers::extract_user_id;

#[derive(Deserialize)]
struct AddContactRequest {
    person_id: String,
}

async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<ContactWithPerson>>> {
    let owner_id = extract_user_id(&headers)?;
    Ok(Json(get_contacts(&state.db, &owner_id).await?))
}

async fn add(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AddContactRequest>,
) -> AppResult<(StatusCode, Json<Contact>)> {
    let owner_id = extract_user_id(&headers)?;
    let contact = add_contact(&state.db, owner_id, req.person_id).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(contact_id): Path<String>,
) -> AppResult<StatusCode> {
    let owner_id = extract_user_id(&headers)?;
    remove_contact(&state.db, &contact_id, &owner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list).post(add))
        .route("/:contact_id", delete(remove))
        .with_state(state)
}
