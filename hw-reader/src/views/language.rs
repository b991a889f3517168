//! Paged listing of one language

use hw_common::sql::literal;
use hw_common::Prayer;

use super::card::{card_html, Card};
use super::markdown::{attr, escape};
use super::{debug_query_url, error_block, pager, View};
use crate::pagination::{calculate_pagination, page_offset, PAGE_SIZE};
use crate::records;
use crate::route::{language_fragment, PageKey};
use crate::AppState;

const UNMATCHED_FILTER: &str = " AND (phelps IS NULL OR phelps = '')";

pub(crate) async fn render(state: &AppState, lang: &str, page: Option<u32>, unmatched: bool) -> View {
    state.recent.add(lang).await;

    let key = PageKey::Language {
        lang: lang.to_string(),
        unmatched,
    };
    let page = i64::from(state.pages.lock().await.resume(&key, page).max(1));

    let language_name = state.language_names.lookup(lang).await;
    let filter = if unmatched { UNMATCHED_FILTER } else { "" };
    let where_clause = format!("WHERE language = {}{filter}", literal(lang));
    let sql = format!(
        "SELECT version, name, language, phelps, link, text FROM writings {where_clause} ORDER BY name, version LIMIT {PAGE_SIZE} OFFSET {}",
        page_offset(page)
    );
    let count_sql = format!("SELECT COUNT(*) as total FROM writings {where_clause}");
    let title = format!("Prayers in {language_name}");

    let rows = match state.gateway.try_query(&sql).await {
        Ok(rows) => rows,
        Err(e) => return View::page(title, error_block(state, &format!("Error loading prayers: {e}"), &sql)),
    };
    let mut prayers = Prayer::from_rows(&rows);
    let total = records::count(state.gateway.as_ref(), &count_sql).await;
    let pagination = calculate_pagination(total, page);

    if prayers.is_empty() {
        if page > 1 {
            let last = pagination.total_pages.max(1) as u32;
            return View::redirect(language_fragment(lang, last, unmatched));
        }
        let matching = if unmatched { " (matching filter)" } else { "" };
        return View::page(
            title,
            format!(
                r#"<p>No prayers found for language: {}{matching}.</p><p><a href="{}" target="_blank">Debug this query</a></p>"#,
                escape(&language_name),
                attr(&debug_query_url(state, &sql))
            ),
        );
    }

    // Cached text wins over the listing's and the entry takes the row's
    // metadata; missing texts are batch-fetched
    let mut missing = Vec::new();
    for prayer in prayers.iter_mut() {
        match state.prayers.get(&prayer.version).await {
            Some(cached) => {
                prayer.text = Some(cached.text);
                state.prayers.put(prayer).await;
            }
            None if prayer.text.is_some() => {
                state.prayers.put(prayer).await;
            }
            None => missing.push(prayer.clone()),
        }
    }
    if !missing.is_empty() {
        let texts = records::fetch_texts(state.gateway.as_ref(), &state.prayers, &missing).await;
        for prayer in prayers.iter_mut().filter(|p| p.text.is_none()) {
            prayer.text = texts.get(&prayer.version).cloned();
        }
    }

    let versions =
        records::versions_by_phelps(state.gateway.as_ref(), prayers.iter().filter_map(|p| p.phelps.as_deref())).await;
    let cards: String = prayers
        .into_iter()
        .map(|prayer| card_html(&Card::from_prayer(prayer), &language_name, &versions))
        .collect();

    let toggle = if unmatched {
        format!(
            r#"<a class="button" href="{}">Show all prayers</a>"#,
            attr(&language_fragment(lang, 1, false))
        )
    } else {
        format!(
            r#"<a class="button" href="{}">Show only prayers without a Phelps code</a>"#,
            attr(&language_fragment(lang, 1, true))
        )
    };
    let pager_html = pager(&pagination, |n| language_fragment(lang, n as u32, unmatched));

    state.pages.lock().await.remember(key, pagination.page as u32);

    let suffix = if unmatched { " - Unmatched" } else { "" };
    View::page(
        title,
        format!(
            r#"<h2>Language: {} (Page {}){suffix}</h2><div class="filter-toggle">{toggle}</div><div class="prayer-list">{cards}</div>{pager_html}"#,
            escape(&language_name),
            pagination.page
        ),
    )
}
