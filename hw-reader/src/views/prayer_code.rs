//! All versions of one phelps code

use hw_common::prayer::FULL_COLUMNS;
use hw_common::sql::literal;
use hw_common::Prayer;

use super::card::{card_html, Card};
use super::markdown::{attr, escape};
use super::prayer::{self, CodeNav};
use super::{error_block, language_names, pager, View};
use crate::pagination::{calculate_pagination, page_offset, PAGE_SIZE};
use crate::records;
use crate::route::{code_fragment, code_language_fragment, PageKey};
use crate::AppState;

pub(crate) async fn render(state: &AppState, code: &str, page: Option<u32>) -> View {
    let key = PageKey::Code(code.to_string());
    let requested = state.pages.lock().await.resume(&key, page);
    let page = i64::from(requested.max(1));

    let where_clause = format!(
        "WHERE phelps = {} AND phelps IS NOT NULL AND phelps != ''",
        literal(code)
    );
    let sql = format!(
        "SELECT version, name, language, text, phelps, link FROM writings {where_clause} ORDER BY language, name LIMIT {PAGE_SIZE} OFFSET {}",
        page_offset(page)
    );
    let count_sql = format!("SELECT COUNT(*) as total FROM writings {where_clause}");

    let title = format!("Translations for {code}");
    let rows = match state.gateway.try_query(&sql).await {
        Ok(rows) => rows,
        Err(e) => {
            return View::page(
                title,
                error_block(state, &format!("Error loading translations for {code}: {e}"), &sql),
            )
        }
    };
    let prayers = Prayer::from_rows(&rows);
    let total = records::count(state.gateway.as_ref(), &count_sql).await;
    let pagination = calculate_pagination(total, page);

    if prayers.is_empty() {
        if page > 1 {
            return View::redirect(format!(
                "{}?page={}",
                code_fragment(code),
                pagination.total_pages.max(1)
            ));
        }
        return View::page(
            title,
            format!(
                r#"<p>No prayer versions found for Phelps Code: {}.</p><p><a href="{}" target="_blank">Debug this query</a></p>"#,
                escape(code),
                attr(&super::debug_query_url(state, &sql))
            ),
        );
    }

    for prayer in prayers.iter().filter(|p| p.text.is_some()) {
        state.prayers.put(prayer).await;
    }

    let languages = records::languages_for_code(state.gateway.as_ref(), code).await;
    let codes: Vec<String> = prayers
        .iter()
        .map(|p| p.language.clone())
        .chain(languages.iter().cloned())
        .collect();
    let names = language_names(state, &codes).await;
    let versions = records::versions_by_phelps(state.gateway.as_ref(), [code]).await;

    let nav: String = languages
        .iter()
        .map(|lang| {
            format!(
                r#"<a href="{}" class="translation-link">{}</a>"#,
                attr(&code_language_fragment(code, lang)),
                escape(names.get(lang).map(String::as_str).unwrap_or(lang))
            )
        })
        .collect::<Vec<_>>()
        .join(" ");

    let cards: String = prayers
        .into_iter()
        .map(|prayer| {
            let language_name = names.get(&prayer.language).cloned().unwrap_or_default();
            card_html(&Card::from_prayer(prayer), &language_name, &versions)
        })
        .collect();

    let code_link = code_fragment(code);
    let pager_html = pager(&pagination, |n| format!("{code_link}?page={n}"));
    state.pages.lock().await.remember(key, pagination.page as u32);

    View::page(
        title,
        format!(
            r#"<h2>{} (Page {}) - All Languages</h2><div class="translations-switcher">{nav}</div><div class="prayer-list">{cards}</div>{pager_html}"#,
            escape(code),
            pagination.page
        ),
    )
}

/// The first version of `code` in `lang`, shown as a full prayer
pub(crate) async fn render_in_language(state: &AppState, code: &str, lang: &str) -> View {
    let sql = format!(
        "SELECT {FULL_COLUMNS} FROM writings WHERE phelps = {} AND language = {} ORDER BY name",
        literal(code),
        literal(lang)
    );
    let rows = state.gateway.query(&sql).await;

    if let Some(first) = rows.first().and_then(Prayer::from_row) {
        return prayer::render(state, &first.version, Some(CodeNav { code, lang })).await;
    }

    let language_name = state.language_names.lookup(lang).await;
    let languages = records::languages_for_code(state.gateway.as_ref(), code).await;
    let mut links = Vec::with_capacity(languages.len());
    for other in &languages {
        let name = state.language_names.lookup(other).await;
        links.push(format!(
            r#"<a href="{}" class="translation-link">{}</a>"#,
            attr(&code_language_fragment(code, other)),
            escape(&name)
        ));
    }
    let available = if links.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p>Available in:</p><div class="translations-switcher">{}</div>"#,
            links.join(" ")
        )
    };

    View::page(
        format!("Not Found: {code} in {language_name}"),
        format!(
            r#"<p>No prayer found for Phelps code {} in {}.</p>{available}"#,
            escape(code),
            escape(&language_name)
        ),
    )
}
