//! Per-language coverage statistics
//!
//! Counts of versions with and without a phelps code, per language. Cached
//! under `hw_language_stats` and considered fresh for 4 hours. When a fetch
//! comes back empty, a stale copy is served instead.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use super::{read_timestamped, write_timestamped, Freshness};
use crate::gateway::{QueryGateway, Row};
use crate::store::KeyedStore;

pub const LANGUAGE_STATS_CACHE_KEY: &str = "hw_language_stats";
pub const LANGUAGE_STATS_FRESH_FOR: Duration = Duration::from_secs(4 * 60 * 60);

const LANGUAGE_STATS_SQL: &str = "SELECT language, \
    SUM(CASE WHEN phelps IS NOT NULL AND phelps != '' THEN 1 ELSE 0 END) AS phelps_covered_count, \
    SUM(CASE WHEN phelps IS NULL OR phelps = '' THEN 1 ELSE 0 END) AS versions_without_phelps_count \
    FROM writings WHERE language IS NOT NULL AND language != '' \
    GROUP BY language ORDER BY language";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStat {
    pub language: String,
    pub phelps_covered_count: i64,
    pub versions_without_phelps_count: i64,
}

impl LanguageStat {
    fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            language: row.get("language")?,
            phelps_covered_count: row.get_i64("phelps_covered_count").unwrap_or(0),
            versions_without_phelps_count: row.get_i64("versions_without_phelps_count").unwrap_or(0),
        })
    }

    pub fn total(&self) -> i64 {
        self.phelps_covered_count + self.versions_without_phelps_count
    }
}

/// Fresh cache, else a fetch, else whatever stale copy exists
pub async fn load_language_stats(store: &dyn KeyedStore, gateway: &dyn QueryGateway) -> Vec<LanguageStat> {
    let stale = match read_timestamped::<Vec<LanguageStat>>(store, LANGUAGE_STATS_CACHE_KEY, LANGUAGE_STATS_FRESH_FOR)
        .await
    {
        Freshness::Fresh(stats) => return stats,
        Freshness::Stale(stats) => Some(stats),
        Freshness::Missing => None,
    };

    let stats: Vec<LanguageStat> = gateway
        .query(LANGUAGE_STATS_SQL)
        .await
        .iter()
        .filter_map(LanguageStat::from_row)
        .collect();

    if !stats.is_empty() {
        info!(languages = stats.len(), "Fetched language statistics");
        write_timestamped(store, LANGUAGE_STATS_CACHE_KEY, &stats).await;
        return stats;
    }

    match stale {
        Some(stats) => {
            warn!("Language statistics fetch returned nothing, using stale cache");
            stats
        }
        None => Vec::new(),
    }
}
