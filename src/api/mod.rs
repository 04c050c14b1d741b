pub mod contacts;
pub mod index;
pub mod messages;
pub mod rooms;
pub mod users;

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::database::DbPool;

pub struct AppState {
    pub db: DbPool,
}

pub fn routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .nest("/users", users::routes(state.clone()))
        .nest("/contacts", contacts::routes(state.clone()))
        .nest("/rooms", rooms::routes(state.clone()))
        .nest("/messages", messages::routes(state.clone()))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::auth_middleware,
        ));

    let api_routes = Router::new()
        .nest("/users", users::public_routes(state.clone()))
        .merge(protected_routes);

    Router::new()
        .route("/", get(index::index))
        .nest("/api", api_routes)
}
