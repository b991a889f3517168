//! Home view: prayer of the moment, favorites, language picker

use std::collections::HashSet;

use rand::Rng;

use hw_common::cache::{load_language_stats, FavoriteEntry, LanguageStat};
use hw_common::sql::literal;
use hw_common::Prayer;

use super::card::{card_html, Card};
use super::markdown::{attr, escape, render_excerpt};
use super::{language_names, View};
use crate::records;
use crate::route::{code_fragment, language_fragment, prayer_fragment};
use crate::AppState;

/// Characters of the random prayer shown before "Read Full Prayer"
const MOMENT_EXCERPT_LENGTH: usize = 400;

pub(crate) async fn render(state: &AppState) -> View {
    state.pages.lock().await.reset();

    let moment = prayer_of_the_moment(state).await;
    let favorites = favorites_section(state).await;
    let picker = language_picker(state).await;

    View::page(
        "Browse Prayers",
        format!(r#"<div id="prayer-of-the-moment">{moment}</div>{favorites}<div id="language-picker">{picker}</div>"#),
    )
}

fn random_offset(total: i64) -> i64 {
    rand::thread_rng().gen_range(0..total)
}

async fn prayer_of_the_moment(state: &AppState) -> String {
    let total = records::count(state.gateway.as_ref(), "SELECT COUNT(*) as total FROM writings").await;
    if total <= 0 {
        return "<p>No prayers found in the database.</p>".to_string();
    }

    let offset = random_offset(total);
    let sql = format!("SELECT version, name, language, phelps FROM writings ORDER BY version LIMIT 1 OFFSET {offset}");
    let Some(prayer) = state.gateway.query(&sql).await.first().and_then(Prayer::from_row) else {
        return r#"<p class="error">Could not load random prayer metadata.</p>"#.to_string();
    };

    let text_sql = format!("SELECT text FROM writings WHERE version = {}", literal(&prayer.version));
    let text = state
        .gateway
        .query(&text_sql)
        .await
        .first()
        .and_then(|row| row.get("text"))
        .filter(|t| !t.trim().is_empty());
    let Some(text) = text else {
        return "<p>Prayer of the Moment: Selected prayer has no displayable text.</p>".to_string();
    };

    let mut full = prayer.clone();
    full.text = Some(text.clone());
    state.prayers.put(&full).await;

    let language_name = state.language_names.lookup(&prayer.language).await;
    let subtitle = match (&prayer.name, &prayer.phelps) {
        (Some(name), _) => name.clone(),
        (None, Some(phelps)) => format!("{phelps} - {language_name}"),
        (None, None) => format!("A prayer in {language_name}"),
    };
    let phelps = prayer
        .phelps
        .as_ref()
        .map(|code| {
            format!(
                r#" <span class="phelps-code">(<a href="{}">{}</a>)</span>"#,
                attr(&code_fragment(code)),
                escape(code)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<h2>Prayer of the Moment</h2><h3>{}{phelps}</h3><div class="prayer-excerpt markdown-content">{}</div><p><a class="button" href="{}">Read Full Prayer</a></p>"#,
        escape(&subtitle),
        render_excerpt(&text, MOMENT_EXCERPT_LENGTH),
        attr(&prayer_fragment(&prayer.version))
    )
}

async fn favorites_section(state: &AppState) -> String {
    let favorites = state.favorites.list().await;
    if favorites.is_empty() {
        return r#"<div id="favorites"><h2>⭐ Your Favorite Prayers</h2><p>You haven't favorited any prayers yet.</p></div>"#
            .to_string();
    }

    let mut cards = Vec::with_capacity(favorites.len());
    for entry in &favorites {
        cards.push(favorite_card(state, entry).await);
    }

    let codes: Vec<String> = cards.iter().map(|c| c.prayer.language.clone()).collect();
    let names = language_names(state, &codes).await;
    let versions =
        records::versions_by_phelps(state.gateway.as_ref(), cards.iter().filter_map(|c| c.prayer.phelps.as_deref()))
            .await;
    let html: String = cards
        .iter()
        .map(|card| {
            let name = names.get(&card.prayer.language).map(String::as_str).unwrap_or("");
            card_html(card, name, &versions)
        })
        .collect();

    format!(r#"<div id="favorites"><h2>⭐ Your Favorite Prayers</h2><div class="prayer-list">{html}</div></div>"#)
}

async fn favorite_card(state: &AppState, entry: &FavoriteEntry) -> Card {
    let mut prayer = Prayer {
        version: entry.version.clone(),
        language: entry.language.clone().unwrap_or_default(),
        name: entry.name.clone(),
        phelps: entry.phelps.clone(),
        ..Default::default()
    };
    if let Some(cached) = state.prayers.get(&entry.version).await {
        prayer.merge_missing(&cached.to_prayer());
    }
    let preview = prayer.preview().or_else(|| Some("Preview not available.".to_string()));
    Card { prayer, preview }
}

/// Recently visited languages first, then the rest by display name
async fn language_picker(state: &AppState) -> String {
    let stats = load_language_stats(state.store.as_ref(), state.gateway.as_ref()).await;
    if stats.is_empty() {
        return "<p>No languages found to select.</p>".to_string();
    }

    let recent = state.recent.list().await;
    let codes: Vec<String> = stats.iter().map(|s| s.language.clone()).collect();
    let names = language_names(state, &codes).await;
    let name_of = |code: &str| names.get(code).cloned().unwrap_or_else(|| code.to_string());

    let recent_set: HashSet<&str> = recent.iter().map(String::as_str).collect();
    let recent_stats: Vec<&LanguageStat> = recent
        .iter()
        .filter_map(|code| stats.iter().find(|s| &s.language == code))
        .collect();
    let mut others: Vec<&LanguageStat> = stats
        .iter()
        .filter(|s| !recent_set.contains(s.language.as_str()))
        .collect();
    others.sort_by_cached_key(|s| name_of(&s.language).to_lowercase());

    let link = |stat: &LanguageStat| {
        format!(
            r#"<a class="language-link" href="{}">{} ({}/{})</a>"#,
            attr(&language_fragment(&stat.language, 1, false)),
            escape(&name_of(&stat.language)),
            stat.phelps_covered_count,
            stat.total()
        )
    };

    let mut html = String::from("<h2>Select a Language</h2>");
    if !recent_stats.is_empty() {
        let links: Vec<String> = recent_stats.iter().map(|s| link(s)).collect();
        html.push_str(&format!(
            r#"<div class="recent-languages"><h4>Recently viewed</h4>{}</div>"#,
            links.join(" ")
        ));
    }
    let links: Vec<String> = others.iter().map(|s| link(s)).collect();
    html.push_str(&format!(r#"<div class="all-languages">{}</div>"#, links.join(" ")));
    html.push_str(r#"<p class="note">Counts are (Unique Phelps Codes / Total Unique Prayers).</p>"#);
    html
}
