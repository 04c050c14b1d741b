use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::AppState;
use crate::config::Config;
use crate::database::{self, DbPool};

pub fn build_router(db: DbPool) -> Router {
    let state = Arc::new(AppState { db });

    crate::api::routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn register_routes(config: &Config) -> anyhow::Result<Router> {
    let db = database::create_pool(&config.database_url).await?;

    tracing::info!("Database connected and migrations applied");

    crate::tasks::cleanup::start_disappearing_messages_task(db.clone(), config.sweep_interval);
    tracing::info!(
        "Disappearing message sweep started (every {:?})",
        config.sweep_interval
    );

    Ok(build_router(db))
}
