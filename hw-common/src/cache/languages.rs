//! Language display names
//!
//! The `languages(langcode, inlang, name)` table gives each language's name
//! in other languages. Only names in the UI language and in English are
//! loaded. The map is cached for 7 days; a fetch is raced against a 5 second
//! timer and a timed-out fetch leaves the current map in place.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::{read_timestamped, write_timestamped, Freshness};
use crate::gateway::{QueryGateway, Row};
use crate::race::{with_timeout, RaceOutcome};
use crate::sql;
use crate::store::KeyedStore;

pub const LANGUAGE_NAMES_CACHE_KEY: &str = "hw_language_names_cache";
pub const LANGUAGE_NAMES_CACHE_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);
pub const FETCH_LANGUAGE_NAMES_TIMEOUT: Duration = Duration::from_secs(5);

/// Names of one language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_lang_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_name: Option<String>,
}

type NameMap = HashMap<String, LanguageName>;

/// Lazily loaded language-name lookup
pub struct LanguageNames {
    store: Arc<dyn KeyedStore>,
    gateway: Arc<dyn QueryGateway>,
    ui_language: String,
    timeout: Duration,
    names: RwLock<NameMap>,
    /// Held for the duration of a load so concurrent callers share one fetch
    loaded: Mutex<bool>,
}

impl LanguageNames {
    pub fn new(
        store: Arc<dyn KeyedStore>,
        gateway: Arc<dyn QueryGateway>,
        ui_language: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            ui_language: ui_language.into().to_lowercase(),
            timeout: FETCH_LANGUAGE_NAMES_TIMEOUT,
            names: RwLock::new(HashMap::new()),
            loaded: Mutex::new(false),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn ui_language(&self) -> &str {
        &self.ui_language
    }

    /// Load from cache or the gateway unless a load already succeeded
    pub async fn ensure_loaded(&self) {
        let mut loaded = self.loaded.lock().await;
        if *loaded {
            return;
        }

        match read_timestamped::<NameMap>(self.store.as_ref(), LANGUAGE_NAMES_CACHE_KEY, LANGUAGE_NAMES_CACHE_EXPIRY)
            .await
        {
            Freshness::Fresh(map) => {
                debug!(count = map.len(), "Loaded language names from cache");
                *self.names.write().await = map;
                *loaded = true;
                return;
            }
            Freshness::Stale(_) => {
                debug!("Language names cache expired");
                if let Err(e) = self.store.delete(LANGUAGE_NAMES_CACHE_KEY).await {
                    warn!(error = %e, "Failed to delete expired language names");
                }
            }
            Freshness::Missing => {}
        }

        let query = format!(
            "SELECT langcode, inlang, name FROM languages WHERE inlang = {} OR inlang = 'en'",
            sql::literal(&self.ui_language)
        );

        let rows = match with_timeout(self.timeout, "Fetching language names", self.gateway.query(&query)).await {
            RaceOutcome::Completed(rows) => rows,
            RaceOutcome::TimedOut => return,
        };

        let map = build_name_map(&rows, &self.ui_language);
        if map.is_empty() {
            warn!("No rows returned from language names query, keeping current names");
            return;
        }

        info!(count = map.len(), "Fetched language names");
        write_timestamped(self.store.as_ref(), LANGUAGE_NAMES_CACHE_KEY, &map).await;
        *self.names.write().await = map;
        *loaded = true;
    }

    /// User-language name, else English name, else the code (`N/A` when empty)
    pub async fn display_name(&self, code: &str) -> String {
        if code.is_empty() {
            return "N/A".to_string();
        }
        self.ensure_loaded().await;
        self.lookup(code).await
    }

    /// Like [`LanguageNames::display_name`] without attempting a load first
    ///
    /// For renderers that already called `ensure_loaded` once up front.
    pub async fn lookup(&self, code: &str) -> String {
        if code.is_empty() {
            return "N/A".to_string();
        }
        let names = self.names.read().await;
        match names.get(&code.to_lowercase()) {
            Some(LanguageName { user_lang_name: Some(name), .. }) => name.clone(),
            Some(LanguageName { en_name: Some(name), .. }) => name.clone(),
            _ => {
                debug!(code = %code, "Display name not found for language code");
                code.to_string()
            }
        }
    }
}

fn build_name_map(rows: &[Row], ui_language: &str) -> NameMap {
    let mut map = NameMap::new();
    for row in rows {
        let (Some(code), Some(inlang), Some(name)) = (row.get("langcode"), row.get("inlang"), row.get("name"))
        else {
            continue;
        };
        let entry = map.entry(code.to_lowercase()).or_default();
        let inlang = inlang.to_lowercase();
        if inlang == ui_language {
            entry.user_lang_name = Some(name.clone());
        }
        if inlang == "en" {
            entry.en_name = Some(name);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Timestamped;
    use crate::gateway::GatewayError;
    use crate::store::{set_json, MemoryStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeGateway {
        rows: Vec<Row>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FakeGateway {
        fn new(rows: Vec<Row>) -> Self {
            Self { rows, delay: Duration::ZERO, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl QueryGateway for FakeGateway {
        async fn try_query(&self, _sql: &str) -> Result<Vec<Row>, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.rows.clone())
        }
    }

    fn name_row(code: &str, inlang: &str, name: &str) -> Row {
        Row::new().with("langcode", code).with("inlang", inlang).with("name", name)
    }

    fn rows() -> Vec<Row> {
        vec![
            name_row("de", "en", "German"),
            name_row("de", "fr", "Allemand"),
            name_row("es", "en", "Spanish"),
        ]
    }

    #[tokio::test]
    async fn test_display_name_precedence() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(FakeGateway::new(rows()));
        let names = LanguageNames::new(store.clone(), gateway.clone(), "fr");

        assert_eq!(names.display_name("DE").await, "Allemand");
        assert_eq!(names.display_name("es").await, "Spanish");
        assert_eq!(names.display_name("xx").await, "xx");
        assert_eq!(names.display_name("").await, "N/A");

        // Loaded once, then cached in the store
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert!(store.get(LANGUAGE_NAMES_CACHE_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_fetch() {
        let store = Arc::new(MemoryStore::new());
        let mut map = NameMap::new();
        map.insert("fa".into(), LanguageName { user_lang_name: None, en_name: Some("Persian".into()) });
        write_timestamped(store.as_ref(), LANGUAGE_NAMES_CACHE_KEY, &map).await;

        let gateway = Arc::new(FakeGateway::new(rows()));
        let names = LanguageNames::new(store, gateway.clone(), "en");
        assert_eq!(names.display_name("fa").await, "Persian");
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_cache_is_refetched() {
        let store = Arc::new(MemoryStore::new());
        let old = Timestamped { timestamp: 0, data: NameMap::new() };
        set_json(store.as_ref(), LANGUAGE_NAMES_CACHE_KEY, &old).await.unwrap();

        let gateway = Arc::new(FakeGateway::new(rows()));
        let names = LanguageNames::new(store, gateway.clone(), "en");
        assert_eq!(names.display_name("de").await, "German");
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_deleted_and_refetched() {
        let store = Arc::new(MemoryStore::new());
        store.set(LANGUAGE_NAMES_CACHE_KEY, "{broken").await.unwrap();

        let gateway = Arc::new(FakeGateway::new(rows()));
        let names = LanguageNames::new(store.clone(), gateway, "en");
        assert_eq!(names.display_name("es").await, "Spanish");

        let raw = store.get(LANGUAGE_NAMES_CACHE_KEY).await.unwrap().unwrap();
        assert!(raw.contains("Spanish"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_codes_and_retries() {
        let store = Arc::new(MemoryStore::new());
        let mut slow = FakeGateway::new(rows());
        slow.delay = Duration::from_secs(30);
        let gateway = Arc::new(slow);
        let names = LanguageNames::new(store.clone(), gateway.clone(), "en");

        assert_eq!(names.display_name("de").await, "de");
        assert!(store.get(LANGUAGE_NAMES_CACHE_KEY).await.unwrap().is_none());

        // Not marked loaded, so the next lookup tries again
        names.display_name("de").await;
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(FakeGateway::new(Vec::new()));
        let names = LanguageNames::new(store.clone(), gateway, "en");

        assert_eq!(names.display_name("de").await, "de");
        assert!(store.get(LANGUAGE_NAMES_CACHE_KEY).await.unwrap().is_none());
    }
}
