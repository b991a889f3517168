//! Background warm-up of English texts
//!
//! Pages through English records in batches and stores their text in the
//! record cache so local full-text search has something to search. Progress
//! is kept under `hw_background_cache_status`; a run is skipped when a
//! previous one cached something within the last 24 hours.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::PrayerCache;
use crate::gateway::QueryGateway;
use crate::prayer::Prayer;
use crate::store::{get_json, set_json, KeyedStore};
use crate::time::{is_expired, now_millis};

pub const BACKGROUND_CACHE_STATUS_KEY: &str = "hw_background_cache_status";
pub const BACKGROUND_CACHE_BATCH_SIZE: usize = 50;
pub const BACKGROUND_CACHE_DELAY: Duration = Duration::from_secs(1);
pub const BACKGROUND_CACHE_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

/// Progress of the last warm-up run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmupStatus {
    pub timestamp: i64,
    pub total_cached: u64,
    pub last_offset: u64,
}

impl WarmupStatus {
    async fn load(store: &dyn KeyedStore) -> Self {
        match get_json::<WarmupStatus>(store, BACKGROUND_CACHE_STATUS_KEY).await {
            Ok(status) => status.unwrap_or_default(),
            Err(e) => {
                debug!(error = %e, "Discarding unreadable warm-up status");
                if let Err(e) = store.delete(BACKGROUND_CACHE_STATUS_KEY).await {
                    warn!(error = %e, "Failed to delete unreadable warm-up status");
                }
                Self::default()
            }
        }
    }

    async fn save(store: &dyn KeyedStore, total_cached: u64, last_offset: u64) {
        let status = WarmupStatus {
            timestamp: now_millis(),
            total_cached,
            last_offset,
        };
        if let Err(e) = set_json(store, BACKGROUND_CACHE_STATUS_KEY, &status).await {
            debug!(error = %e, "Error saving warm-up status");
        }
    }

    pub fn is_expired(&self) -> bool {
        is_expired(self.timestamp, BACKGROUND_CACHE_EXPIRY, now_millis())
    }
}

/// Cache English texts not already cached; returns how many were added
///
/// An unexpired run resumes from its last offset; an expired one restarts
/// from the beginning.
pub async fn warm_english_prayers(
    store: &dyn KeyedStore,
    gateway: &dyn QueryGateway,
    cache: &PrayerCache,
    batch_delay: Duration,
) -> u64 {
    let status = WarmupStatus::load(store).await;
    if !status.is_expired() && status.total_cached > 0 {
        info!(cached = status.total_cached, "Skipping English warm-up, cached recently");
        return 0;
    }

    let total = gateway
        .query("SELECT COUNT(*) as total FROM writings WHERE language = 'en'")
        .await
        .first()
        .and_then(|row| row.get_i64("total"))
        .unwrap_or(0)
        .max(0) as u64;
    if total == 0 {
        info!("No English prayers found, nothing to warm");
        return 0;
    }

    let mut seen: HashSet<String> = cache
        .all()
        .await
        .into_iter()
        .filter(|p| p.language.as_deref() == Some("en"))
        .map(|p| p.version)
        .collect();

    let mut offset = if status.is_expired() { 0 } else { status.last_offset };
    let mut total_cached = 0u64;
    let batch = BACKGROUND_CACHE_BATCH_SIZE as u64;
    info!(total, offset, "Starting English warm-up");

    while offset < total {
        let sql = format!(
            "SELECT version, name, text, language, phelps, source, link FROM writings \
             WHERE language = 'en' ORDER BY version LIMIT {batch} OFFSET {offset}"
        );
        let prayers = Prayer::from_rows(&gateway.query(&sql).await);
        if prayers.is_empty() {
            break;
        }

        let mut batch_cached = 0u64;
        for prayer in &prayers {
            if seen.insert(prayer.version.clone()) && cache.put(prayer).await {
                batch_cached += 1;
            }
        }

        total_cached += batch_cached;
        offset += prayers.len() as u64;
        debug!(offset, batch_cached, total_cached, "Warm-up batch done");
        WarmupStatus::save(store, total_cached, offset).await;

        if offset < total && !batch_delay.is_zero() {
            tokio::time::sleep(batch_delay).await;
        }
    }

    info!(total_cached, "English warm-up complete");
    total_cached
}
