//! Favorites list
//!
//! A user-chosen list of lightweight record projections stored as one JSON
//! array under `hw_favorite_prayers`. Independent of the record cache and of
//! curation state.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::prayer::Prayer;
use crate::store::{get_json, set_json, KeyedStore};
use crate::Result;

pub const FAVORITES_KEY: &str = "hw_favorite_prayers";

/// Lightweight projection of a favorited record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub version: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub phelps: Option<String>,
}

impl From<&Prayer> for FavoriteEntry {
    fn from(prayer: &Prayer) -> Self {
        Self {
            version: prayer.version.clone(),
            name: prayer.name.clone(),
            language: (!prayer.language.is_empty()).then(|| prayer.language.clone()),
            phelps: prayer.phelps.clone(),
        }
    }
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteToggle {
    Added,
    Removed,
}

impl FavoriteToggle {
    pub fn message(&self) -> &'static str {
        match self {
            FavoriteToggle::Added => "Prayer added to favorites.",
            FavoriteToggle::Removed => "Prayer removed from favorites.",
        }
    }
}

/// Favorites list over a keyed store
#[derive(Clone)]
pub struct Favorites {
    store: Arc<dyn KeyedStore>,
}

impl Favorites {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    /// Current favorites in insertion order; an unreadable list reads as empty
    pub async fn list(&self) -> Vec<FavoriteEntry> {
        match get_json::<Vec<FavoriteEntry>>(self.store.as_ref(), FAVORITES_KEY).await {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Unreadable favorites list, treating as empty");
                Vec::new()
            }
        }
    }

    pub async fn contains(&self, version: &str) -> bool {
        self.list().await.iter().any(|f| f.version == version)
    }

    /// Add `prayer` if absent, remove it if present
    pub async fn toggle(&self, prayer: &Prayer) -> Result<FavoriteToggle> {
        let mut list = self.list().await;
        let outcome = match list.iter().position(|f| f.version == prayer.version) {
            Some(index) => {
                list.remove(index);
                FavoriteToggle::Removed
            }
            None => {
                list.push(FavoriteEntry::from(prayer));
                FavoriteToggle::Added
            }
        };
        set_json(self.store.as_ref(), FAVORITES_KEY, &list).await?;
        info!(version = %prayer.version, ?outcome, "Toggled favorite");
        Ok(outcome)
    }
}
