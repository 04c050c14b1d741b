use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::database::DbPool;
use crate::utils::error::AppResult;
use crate::utils::helpers::{parse_timestamp, timestamp};

const BUCKET_COUNT: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeBucket {
    /// Start of the hour, `HH:MM`.
    pub label: String,
    pub start: String,
    pub count: i64,
}

/// Messages per hour over the trailing day, oldest hour first. Serialises as
/// a `{"HH:MM": count}` object in the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageVolume {
    buckets: Vec<VolumeBucket>,
}

impl MessageVolume {
    fn empty(since: DateTime<Utc>) -> Self {
        let buckets = (0..BUCKET_COUNT)
            .map(|hour| {
                let start = since + Duration::hours(hour);
                VolumeBucket {
                    label: start.format("%H:%M").to_string(),
                    start: timestamp(start),
                    count: 0,
                }
            })
            .collect();

        Self { buckets }
    }

    pub fn buckets(&self) -> &[VolumeBucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<i64> {
        self.buckets
            .iter()
            .find(|bucket| bucket.label == label)
            .map(|bucket| bucket.count)
    }

    pub fn total(&self) -> i64 {
        self.buckets.iter().map(|bucket| bucket.count).sum()
    }
}

impl Serialize for MessageVolume {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for bucket in &self.buckets {
            map.serialize_entry(&bucket.label, &bucket.count)?;
        }
        map.end()
    }
}

pub async fn get_message_volume_stats(pool: &DbPool) -> AppResult<MessageVolume> {
    message_volume_stats_at(pool, Utc::now()).await
}

/// Buckets are `[start, start + 1h)` beginning 24 hours before `now`. All
/// counts come from one query so they add up to the whole window.
pub async fn message_volume_stats_at(pool: &DbPool, now: DateTime<Utc>) -> AppResult<MessageVolume> {
    let since = now - Duration::hours(BUCKET_COUNT);
    let mut volume = MessageVolume::empty(since);

    let created: Vec<String> =
        sqlx::query_scalar("SELECT created_at FROM messages WHERE created_at >= ? AND created_at < ?")
            .bind(timestamp(since))
            .bind(timestamp(now))
            .fetch_all(pool.as_ref())
            .await?;

    for created_at in created {
        let offset = parse_timestamp(&created_at)? - since;
        let hour = offset.num_seconds().div_euclid(3600);
        if let Some(bucket) = usize::try_from(hour)
            .ok()
            .and_then(|index| volume.buckets.get_mut(index))
        {
            bucket.count += 1;
        }
    }

    tracing::debug!("Message volume over the last day: {}", volume.total());

    Ok(volume)
}
