use std::time::Duration;

use crate::database::DbPool;
use crate::services::message::delete_disappearing_messages;
use crate::utils::error::AppResult;

pub async fn sweep_disappearing_messages(db: &DbPool) -> AppResult<u64> {
    tracing::debug!("Sweeping expired disappearing messages");

    let count = delete_disappearing_messages(db).await?;

    if count > 0 {
        tracing::info!("Deleted {} expired disappearing messages", count);
    }

    Ok(count)
}

pub fn start_disappearing_messages_task(db: DbPool, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);

        loop {
            interval.tick().await;

            if let Err(e) = sweep_disappearing_messages(&db).await {
                tracing::error!("Disappearing message sweep failed: {}", e);
            }
        }
    });
}
