//! Recently browsed languages

use std::sync::Arc;
use tracing::{error, warn};

use crate::store::{get_json, set_json, KeyedStore};

pub const RECENT_LANGUAGES_KEY: &str = "hw_recent_languages";
pub const MAX_RECENT_LANGUAGES: usize = 4;

/// Most-recent-first list of lower-cased language codes
#[derive(Clone)]
pub struct RecentLanguages {
    store: Arc<dyn KeyedStore>,
}

impl RecentLanguages {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Vec<String> {
        match get_json::<Vec<String>>(self.store.as_ref(), RECENT_LANGUAGES_KEY).await {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Error reading recent languages");
                Vec::new()
            }
        }
    }

    /// Move `code` to the front, dropping the oldest past the cap
    pub async fn add(&self, code: &str) {
        if code.is_empty() {
            return;
        }
        let code = code.to_lowercase();

        let mut list = self.list().await;
        list.retain(|l| *l != code);
        list.insert(0, code);
        list.truncate(MAX_RECENT_LANGUAGES);

        if let Err(e) = set_json(self.store.as_ref(), RECENT_LANGUAGES_KEY, &list).await {
            error!(error = %e, "Error saving recent languages");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_most_recent_first_and_capped() {
        let recent = RecentLanguages::new(Arc::new(MemoryStore::new()));
        for code in ["en", "FR", "de", "es", "fa"] {
            recent.add(code).await;
        }
        assert_eq!(recent.list().await, vec!["fa", "es", "de", "fr"]);
    }

    #[tokio::test]
    async fn test_revisit_moves_to_front() {
        let recent = RecentLanguages::new(Arc::new(MemoryStore::new()));
        recent.add("en").await;
        recent.add("fr").await;
        recent.add("EN").await;
        assert_eq!(recent.list().await, vec!["en", "fr"]);

        recent.add("").await;
        assert_eq!(recent.list().await.len(), 2);
    }
}
