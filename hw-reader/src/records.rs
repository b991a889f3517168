//! Record lookups shared by the views and the action endpoints

use std::collections::HashMap;

use hw_common::cache::PrayerCache;
use hw_common::prayer::FULL_COLUMNS;
use hw_common::sql::{in_list, literal};
use hw_common::{GatewayError, Prayer, QueryGateway};
use tracing::debug;

/// Uncached texts are fetched this many ids per `IN (...)` query
pub const TEXT_BATCH_SIZE: usize = 50;

/// Fetch a full record from the database and refresh its cache entry
pub async fn fetch_prayer(
    gateway: &dyn QueryGateway,
    cache: &PrayerCache,
    version: &str,
) -> Result<Option<Prayer>, GatewayError> {
    let sql = format!(
        "SELECT {FULL_COLUMNS} FROM writings WHERE version = {}",
        literal(version)
    );
    let rows = gateway.try_query(&sql).await?;
    let prayer = rows.first().and_then(Prayer::from_row);
    if let Some(prayer) = &prayer {
        cache.put(prayer).await;
    }
    Ok(prayer)
}

/// Cached record if its text is known, otherwise a database fetch
///
/// Action endpoints only receive a version id and resolve it here.
pub async fn load_prayer(
    gateway: &dyn QueryGateway,
    cache: &PrayerCache,
    version: &str,
) -> Result<Option<Prayer>, GatewayError> {
    if let Some(cached) = cache.get(version).await {
        debug!(version = %version, "Record served from cache");
        return Ok(Some(cached.to_prayer()));
    }
    fetch_prayer(gateway, cache, version).await
}

/// Every version sharing one of `codes`, grouped by code
pub async fn versions_by_phelps<'a, I>(gateway: &dyn QueryGateway, codes: I) -> HashMap<String, Vec<Prayer>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut codes: Vec<&str> = codes.into_iter().filter(|c| !c.is_empty()).collect();
    codes.sort_unstable();
    codes.dedup();
    if codes.is_empty() {
        return HashMap::new();
    }

    let sql = format!(
        "SELECT version, language, phelps, name, link FROM writings WHERE phelps IN ({})",
        in_list(&codes)
    );
    let mut grouped: HashMap<String, Vec<Prayer>> = HashMap::new();
    for prayer in Prayer::from_rows(&gateway.query(&sql).await) {
        if let Some(code) = prayer.phelps.clone() {
            grouped.entry(code).or_default().push(prayer);
        }
    }
    grouped
}

/// Texts for `versions`, fetched in batches; each fetched record is cached
///
/// A failed batch is skipped; its versions are simply absent from the map.
pub async fn fetch_texts(
    gateway: &dyn QueryGateway,
    cache: &PrayerCache,
    prayers: &[Prayer],
) -> HashMap<String, String> {
    let mut texts = HashMap::new();
    for batch in prayers.chunks(TEXT_BATCH_SIZE) {
        let sql = format!(
            "SELECT version, text FROM writings WHERE version IN ({})",
            in_list(batch.iter().map(|p| p.version.as_str()))
        );
        for row in gateway.query(&sql).await {
            if let (Some(version), Some(text)) = (row.get("version"), row.get("text")) {
                texts.insert(version, text);
            }
        }
    }

    for prayer in prayers {
        if let Some(text) = texts.get(&prayer.version) {
            let mut full = prayer.clone();
            full.text = Some(text.clone());
            cache.put(&full).await;
        }
    }
    texts
}

/// Distinct languages a phelps code exists in, in language order
pub async fn languages_for_code(gateway: &dyn QueryGateway, code: &str) -> Vec<String> {
    let sql = format!(
        "SELECT DISTINCT language FROM writings WHERE phelps = {} ORDER BY language",
        literal(code)
    );
    gateway
        .query(&sql)
        .await
        .iter()
        .filter_map(|row| row.get("language"))
        .collect()
}

/// Leading `COUNT(*) AS total` of a count query; failures count as zero
pub async fn count(gateway: &dyn QueryGateway, sql: &str) -> i64 {
    gateway
        .query(sql)
        .await
        .first()
        .and_then(|row| row.get_i64("total"))
        .unwrap_or(0)
}
