//! Per-record text cache
//!
//! Every time a record's full text is fetched or displayed it is written
//! under `hw_prayer_cache_<version>`. Entries never expire. The cache also
//! backs local full-text search.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use crate::prayer::Prayer;
use crate::store::{get_json, set_json, KeyedStore};
use crate::time::now_millis;

pub const PRAYER_CACHE_PREFIX: &str = "hw_prayer_cache_";

/// Denormalized snapshot of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPrayer {
    pub version: String,
    pub text: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub phelps: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    /// Capture time, epoch millis
    pub timestamp: i64,
}

impl CachedPrayer {
    pub fn to_prayer(&self) -> Prayer {
        Prayer {
            version: self.version.clone(),
            language: self.language.clone().unwrap_or_default(),
            name: self.name.clone(),
            phelps: self.phelps.clone(),
            text: Some(self.text.clone()),
            source: self.source.clone(),
            link: self.link.clone(),
        }
    }

    /// Case-insensitive match on text or name; `needle` must be lower-case
    fn matches(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle)
            || self
                .name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(needle))
    }
}

/// Record cache over a keyed store
#[derive(Clone)]
pub struct PrayerCache {
    store: Arc<dyn KeyedStore>,
}

impl PrayerCache {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    fn key(version: &str) -> String {
        format!("{PRAYER_CACHE_PREFIX}{version}")
    }

    /// Cache a record that carries text; returns whether it was stored
    pub async fn put(&self, prayer: &Prayer) -> bool {
        let Some(text) = prayer.text.clone() else {
            warn!(version = %prayer.version, "Attempted to cache prayer without text");
            return false;
        };
        if prayer.version.is_empty() {
            warn!("Attempted to cache prayer without version");
            return false;
        }

        let entry = CachedPrayer {
            version: prayer.version.clone(),
            text,
            name: prayer.name.clone(),
            language: (!prayer.language.is_empty()).then(|| prayer.language.clone()),
            phelps: prayer.phelps.clone(),
            link: prayer.link.clone(),
            source: prayer.source.clone(),
            timestamp: now_millis(),
        };

        match set_json(self.store.as_ref(), &Self::key(&prayer.version), &entry).await {
            Ok(()) => true,
            Err(e) => {
                error!(version = %prayer.version, error = %e, "Error caching prayer text");
                false
            }
        }
    }

    /// Cached snapshot for `version`; unreadable entries count as a miss
    pub async fn get(&self, version: &str) -> Option<CachedPrayer> {
        match get_json(self.store.as_ref(), &Self::key(version)).await {
            Ok(entry) => entry,
            Err(e) => {
                error!(version = %version, error = %e, "Error reading cached prayer");
                None
            }
        }
    }

    /// Every readable cached record, in key order
    pub async fn all(&self) -> Vec<CachedPrayer> {
        let keys = match self.store.keys_with_prefix(PRAYER_CACHE_PREFIX).await {
            Ok(keys) => keys,
            Err(e) => {
                error!(error = %e, "Error listing cached prayers");
                return Vec::new();
            }
        };

        let mut prayers = Vec::with_capacity(keys.len());
        for key in keys {
            match get_json::<CachedPrayer>(self.store.as_ref(), &key).await {
                Ok(Some(entry)) => prayers.push(entry),
                Ok(None) => {}
                Err(e) => warn!(key = %key, error = %e, "Skipping unreadable cached prayer"),
            }
        }
        prayers
    }

    /// Local full-text search over cached text and names
    pub async fn search(&self, term: &str) -> Vec<CachedPrayer> {
        let needle = term.to_lowercase();
        self.all()
            .await
            .into_iter()
            .filter(|p| p.matches(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn cache() -> (Arc<MemoryStore>, PrayerCache) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), PrayerCache::new(store))
    }

    fn prayer(version: &str, text: &str) -> Prayer {
        Prayer {
            version: version.into(),
            language: "en".into(),
            name: Some(format!("Name {version}")),
            phelps: Some("AB00001".into()),
            text: Some(text.into()),
            source: Some("Prayers".into()),
            link: Some("https://example.org".into()),
        }
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let (_, cache) = cache();
        let p = prayer("v1", "O Thou kind Lord");
        assert!(cache.put(&p).await);

        let cached = cache.get("v1").await.unwrap();
        assert_eq!(cached.text, "O Thou kind Lord");
        assert_eq!(cached.name.as_deref(), Some("Name v1"));
        assert_eq!(cached.language.as_deref(), Some("en"));
        assert_eq!(cached.phelps.as_deref(), Some("AB00001"));
        assert_eq!(cached.to_prayer(), p);
    }

    #[tokio::test]
    async fn test_put_without_text_is_rejected() {
        let (store, cache) = cache();
        let p = Prayer::new("v1", "en");
        assert!(!cache.put(&p).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let (store, cache) = cache();
        store.set("hw_prayer_cache_bad", "{oops").await.unwrap();
        assert!(cache.get("bad").await.is_none());

        cache.put(&prayer("good", "text")).await;
        let all = cache.all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].version, "good");
    }

    #[tokio::test]
    async fn test_search_matches_text_and_name_case_insensitively() {
        let (_, cache) = cache();
        cache.put(&prayer("v1", "Blessed is the spot")).await;
        cache.put(&prayer("v2", "O God, guide me")).await;

        let hits = cache.search("BLESSED").await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].version, "v1");

        let by_name = cache.search("name v2").await;
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].version, "v2");
    }
}
