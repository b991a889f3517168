//! Client-side caches on top of a [`KeyedStore`]
//!
//! Storage keys:
//! - `hw_prayer_cache_<version>`: last-seen full record, no expiry
//! - `hw_favorite_prayers`: favorites list
//! - `hw_language_names_cache`: language-name lookup, 7 day expiry
//! - `hw_language_stats`: per-language counts, 4 hour freshness
//! - `hw_recent_languages`: most recently browsed languages
//! - `hw_background_cache_status`: English warm-up progress

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::store::{get_json, set_json, KeyedStore};
use crate::time::{is_expired, now_millis};

mod favorites;
mod languages;
mod prayers;
mod recent;
mod stats;
mod warmup;

pub use favorites::{FavoriteEntry, FavoriteToggle, Favorites, FAVORITES_KEY};
pub use languages::{
    LanguageName, LanguageNames, FETCH_LANGUAGE_NAMES_TIMEOUT, LANGUAGE_NAMES_CACHE_EXPIRY,
    LANGUAGE_NAMES_CACHE_KEY,
};
pub use prayers::{CachedPrayer, PrayerCache, PRAYER_CACHE_PREFIX};
pub use recent::{RecentLanguages, MAX_RECENT_LANGUAGES, RECENT_LANGUAGES_KEY};
pub use stats::{load_language_stats, LanguageStat, LANGUAGE_STATS_CACHE_KEY, LANGUAGE_STATS_FRESH_FOR};
pub use warmup::{
    warm_english_prayers, WarmupStatus, BACKGROUND_CACHE_BATCH_SIZE, BACKGROUND_CACHE_DELAY,
    BACKGROUND_CACHE_STATUS_KEY,
};

/// `{timestamp, data}` wrapper used by the expiring caches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timestamped<T> {
    pub timestamp: i64,
    pub data: T,
}

/// Age classification of a timestamped entry
#[derive(Debug, Clone, PartialEq)]
pub enum Freshness<T> {
    Fresh(T),
    Stale(T),
    Missing,
}

/// Read a timestamped entry; unreadable entries are deleted and reported missing
pub(crate) async fn read_timestamped<T: DeserializeOwned>(
    store: &dyn KeyedStore,
    key: &str,
    max_age: Duration,
) -> Freshness<T> {
    match get_json::<Timestamped<T>>(store, key).await {
        Ok(Some(entry)) => {
            if is_expired(entry.timestamp, max_age, now_millis()) {
                Freshness::Stale(entry.data)
            } else {
                Freshness::Fresh(entry.data)
            }
        }
        Ok(None) => Freshness::Missing,
        Err(e) => {
            warn!(key = %key, error = %e, "Discarding unreadable cache entry");
            if let Err(e) = store.delete(key).await {
                warn!(key = %key, error = %e, "Failed to delete unreadable cache entry");
            }
            Freshness::Missing
        }
    }
}

/// Store `data` stamped with the current time; failures are logged
pub(crate) async fn write_timestamped<T: Serialize>(store: &dyn KeyedStore, key: &str, data: &T) {
    let entry = Timestamped {
        timestamp: now_millis(),
        data,
    };
    if let Err(e) = set_json(store, key, &entry).await {
        warn!(key = %key, error = %e, "Failed to write cache entry");
    }
}
