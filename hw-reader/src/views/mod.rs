//! View renderers
//!
//! Each view turns a parsed [`Route`] into a title and an HTML fragment for
//! the shell. Page-level query failures render an inline error block;
//! secondary lookups that fail just leave their section out.

use serde::Serialize;
use std::collections::HashMap;

use crate::pagination::Pagination;
use crate::route::Route;
use crate::AppState;

pub mod card;
mod language;
mod languages;
pub mod markdown;
mod prayer;
mod prayer_code;
mod search;
pub mod tool_panel;

use markdown::{attr, escape};

/// Rendered view returned by `/api/view`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub title: String,
    pub html: String,
    /// When set the shell replaces `location.hash` instead of showing `html`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl View {
    pub fn page(title: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            html: html.into(),
            redirect: None,
        }
    }

    pub fn redirect(fragment: impl Into<String>) -> Self {
        Self {
            title: "Redirecting".to_string(),
            html: "<p>Redirecting to a valid page...</p>".to_string(),
            redirect: Some(fragment.into()),
        }
    }
}

/// Render the view for `route`
pub async fn render(state: &AppState, route: Route) -> View {
    state.language_names.ensure_loaded().await;

    match route {
        Route::Languages => languages::render(state).await,
        Route::Language { lang, page, unmatched } => language::render(state, &lang, page, unmatched).await,
        Route::Prayer { version } => prayer::render(state, &version, None).await,
        Route::PrayerCode { code, page } => prayer_code::render(state, &code, page).await,
        Route::PrayerCodeLanguage { code, lang } => prayer_code::render_in_language(state, &code, &lang).await,
        Route::Search { term, page } => search::render(state, &term, page).await,
        Route::Redirect(fragment) => View::redirect(fragment),
    }
}

/// DoltHub query page preloaded with `sql`
pub(crate) fn debug_query_url(state: &AppState, sql: &str) -> String {
    format!("{}?q={}", state.handoff.query_page_base, urlencoding::encode(sql))
}

/// Inline error with the failing query and a link to run it on DoltHub
pub(crate) fn error_block(state: &AppState, message: &str, sql: &str) -> String {
    format!(
        r#"<div class="error-block"><p class="error">{}</p><pre>{}</pre><p><a href="{}" target="_blank">Debug this query</a></p></div>"#,
        escape(message),
        escape(sql),
        attr(&debug_query_url(state, sql))
    )
}

/// Previous / "Page N of M" / Next; nothing for a single page
pub(crate) fn pager(pagination: &Pagination, link: impl Fn(i64) -> String) -> String {
    if pagination.total_pages <= 1 {
        return String::new();
    }

    let mut html = String::from(r#"<div class="pagination">"#);
    if pagination.has_previous() {
        html.push_str(&format!(
            r#"<a class="button" href="{}">Previous</a>"#,
            attr(&link(pagination.page - 1))
        ));
    }
    html.push_str(&format!(
        " <span>Page {} of {}</span> ",
        pagination.page, pagination.total_pages
    ));
    if pagination.has_next() {
        html.push_str(&format!(
            r#"<a class="button" href="{}">Next</a>"#,
            attr(&link(pagination.page + 1))
        ));
    }
    html.push_str("</div>");
    html
}

/// Display names for `codes`
pub(crate) async fn language_names(state: &AppState, codes: &[String]) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for code in codes {
        if !names.contains_key(code) {
            let name = state.language_names.lookup(code).await;
            names.insert(code.clone(), name);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::calculate_pagination;

    #[test]
    fn test_pager_hidden_for_single_page() {
        let p = calculate_pagination(15, 1);
        assert_eq!(pager(&p, |n| format!("#x?page={n}")), "");
    }

    #[test]
    fn test_pager_links() {
        let p = calculate_pagination(65, 2);
        let html = pager(&p, |n| format!("#prayers/en?page={n}&filter=unmatched"));
        assert!(html.contains(r##"href="#prayers/en?page=1&amp;filter=unmatched">Previous"##));
        assert!(html.contains("Page 2 of 4"));
        assert!(html.contains(r#"page=3&amp;filter=unmatched">Next"#));
    }

    #[test]
    fn test_redirect_view_serializes_fragment() {
        let json = serde_json::to_value(View::redirect("#prayercode/AB123")).unwrap();
        assert_eq!(json["redirect"], "#prayercode/AB123");
        let json = serde_json::to_value(View::page("t", "<p/>")).unwrap();
        assert!(json.get("redirect").is_none());
    }
}
