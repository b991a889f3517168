//! Search: cached full text first, then database name matches

use std::collections::HashSet;

use hw_common::sql::escape as sql_escape;
use hw_common::Prayer;
use tracing::debug;

use super::card::{card_html, Card};
use super::markdown::{attr, escape};
use super::{error_block, language_names, pager, View};
use crate::pagination::paginate;
use crate::records;
use crate::route::{search_fragment, PageKey};
use crate::AppState;

const TIDDLY_SEARCH_URL: &str = "https://tiddly.holywritings.net/";

pub(crate) async fn render(state: &AppState, term: &str, page: Option<u32>) -> View {
    let title = format!("Search Results for \"{term}\"");
    let key = PageKey::Search(term.to_string());
    let requested = i64::from(state.pages.lock().await.resume(&key, page).max(1));

    let local = state.prayers.search(term).await;
    let checked = state.prayers.all().await.len();
    debug!(term = %term, hits = local.len(), "Local search");

    let sql = format!(
        "SELECT version, name, language, phelps, link, source FROM writings WHERE name LIKE '%{}%' ORDER BY name, version",
        sql_escape(term)
    );
    let remote = match state.gateway.try_query(&sql).await {
        Ok(rows) => Prayer::from_rows(&rows),
        Err(e) => return View::page(title, error_block(state, &format!("Error searching prayers: {e}"), &sql)),
    };

    let mut seen = HashSet::new();
    let results: Vec<Prayer> = local
        .iter()
        .map(|cached| cached.to_prayer())
        .chain(remote)
        .filter(|p| seen.insert(p.version.clone()))
        .collect();

    if results.is_empty() {
        return View::page(title, no_results_html(term, checked));
    }

    let (pagination, slice) = paginate(&results, requested);
    if pagination.page != requested {
        return View::redirect(format!("{}?page={}", search_fragment(term), pagination.page));
    }

    let mut prayers = Vec::with_capacity(slice.len());
    for prayer in slice {
        prayers.push(with_text(state, prayer.clone()).await);
    }

    let codes: Vec<String> = prayers.iter().map(|p| p.language.clone()).collect();
    let names = language_names(state, &codes).await;
    let versions =
        records::versions_by_phelps(state.gateway.as_ref(), prayers.iter().filter_map(|p| p.phelps.as_deref())).await;
    let cards: String = prayers
        .into_iter()
        .map(|prayer| {
            let name = names.get(&prayer.language).cloned().unwrap_or_default();
            card_html(&Card::from_prayer(prayer), &name, &versions)
        })
        .collect();

    let base = search_fragment(term);
    let pager_html = pager(&pagination, |n| format!("{base}?page={n}"));
    state.pages.lock().await.remember(key, pagination.page as u32);

    View::page(
        title,
        format!(
            r#"<h2>Search Results for "{}"</h2><p>{} result(s)</p><div class="prayer-list">{cards}</div>{pager_html}"#,
            escape(term),
            results.len()
        ),
    )
}

/// Text from the cache, else a single-record fetch (which caches it)
async fn with_text(state: &AppState, mut prayer: Prayer) -> Prayer {
    if prayer.text.is_some() {
        return prayer;
    }
    if let Some(cached) = state.prayers.get(&prayer.version).await {
        prayer.merge_missing(&cached.to_prayer());
        return prayer;
    }
    if let Ok(Some(full)) = records::fetch_prayer(state.gateway.as_ref(), &state.prayers, &prayer.version).await {
        prayer.merge_missing(&full);
    }
    prayer
}

fn no_results_html(term: &str, checked: usize) -> String {
    format!(
        r#"<p>No prayers found matching "{}".</p><p>Full-text search covers the {checked} prayer(s) cached locally; prayer names are searched in the whole database. Visit more prayers to widen the local search, or try the <a href="{}" target="_blank">full-text search on tiddly.holywritings.net</a>.</p>"#,
        escape(term),
        attr(TIDDLY_SEARCH_URL)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_results_mentions_cached_count() {
        let html = no_results_html("<joy>", 12);
        assert!(html.contains("&lt;joy&gt;"));
        assert!(html.contains("covers the 12 prayer(s)"));
        assert!(html.contains(TIDDLY_SEARCH_URL));
    }
}
