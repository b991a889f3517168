//! Single prayer view with pending proposals overlaid

use hw_common::curation::DisplayProjection;
use hw_common::prayer::{author_from_phelps, source_domain, Prayer};
use hw_common::sql::literal;

use super::markdown::{attr, escape, render_markdown};
use super::{error_block, View};
use crate::records;
use crate::route::{code_fragment, code_language_fragment, prayer_fragment};
use crate::AppState;

/// Phelps code and language the prayer was reached through
#[derive(Debug, Clone, Copy)]
pub(crate) struct CodeNav<'a> {
    pub code: &'a str,
    pub lang: &'a str,
}

pub(crate) async fn render(state: &AppState, version: &str, nav: Option<CodeNav<'_>>) -> View {
    let prayer = match records::fetch_prayer(state.gateway.as_ref(), &state.prayers, version).await {
        Ok(Some(prayer)) => prayer,
        Ok(None) => {
            return View::page(
                "Prayer Not Found",
                format!(
                    r#"<div id="prayer-not-found"><p>Prayer with ID {} not found.</p></div>"#,
                    escape(version)
                ),
            )
        }
        Err(e) => {
            let sql = format!("SELECT * FROM writings WHERE version = {}", literal(version));
            return View::page(
                "Error Loading Prayer",
                error_block(state, &format!("Error loading prayer data: {e}"), &sql),
            );
        }
    };

    let (projection, pinned) = {
        let tool = state.curation.lock().await;
        let pinned = tool.pinned().map(|p| (p.version.clone(), p.name.clone()));
        (tool.overlay(&prayer), pinned)
    };

    let effective_language = state.language_names.lookup(&projection.language.value).await;
    let title = title_for(&prayer, &projection, &effective_language);

    let mut html = String::new();
    html.push_str(&translations_switcher(state, &prayer, &projection, nav).await);
    html.push_str(&details_html(&prayer, &projection, &effective_language));
    html.push_str(&actions_html(state, &prayer, &projection, pinned, &effective_language).await);
    if let Some(nav) = nav {
        html.push_str(&other_versions_html(state, &prayer, &projection, nav).await);
    }

    View::page(title, format!(r#"<div id="prayer-view">{html}</div>"#))
}

/// Name, else `<phelps> - <language>`, else `Prayer <version>` (after overlay)
fn title_for(prayer: &Prayer, projection: &DisplayProjection, language_name: &str) -> String {
    match (&projection.name.value, &projection.phelps.value) {
        (Some(name), _) => name.clone(),
        (None, Some(phelps)) => format!("{phelps} - {language_name}"),
        (None, None) => format!("Prayer {}", prayer.version),
    }
}

async fn translations_switcher(
    state: &AppState,
    prayer: &Prayer,
    projection: &DisplayProjection,
    nav: Option<CodeNav<'_>>,
) -> String {
    let code = nav
        .map(|n| n.code.to_string())
        .or_else(|| projection.phelps.value.clone());
    let Some(code) = code.filter(|c| !c.starts_with("TODO")) else {
        return String::new();
    };

    let languages = records::languages_for_code(state.gateway.as_ref(), &code).await;
    if languages.len() < 2 {
        return String::new();
    }

    let active = nav.map(|n| n.lang).unwrap_or(prayer.language.as_str());
    let mut links = Vec::with_capacity(languages.len());
    for lang in &languages {
        let class = if lang == active {
            "translation-link is-active"
        } else {
            "translation-link"
        };
        let name = state.language_names.lookup(lang).await;
        links.push(format!(
            r#"<a href="{}" class="{class}">{}</a>"#,
            attr(&code_language_fragment(&code, lang)),
            escape(&name)
        ));
    }
    format!(
        r#"<div class="translations-switcher"><span class="translations-switcher-label">Translations:</span>{}</div>"#,
        links.join(" ")
    )
}

fn details_html(prayer: &Prayer, projection: &DisplayProjection, language_name: &str) -> String {
    let text = render_markdown(prayer.text.as_deref().unwrap_or("No text available."));

    let author = prayer
        .phelps
        .as_deref()
        .and_then(author_from_phelps)
        .map(|a| format!(r#"<div class="author">{}</div>"#, escape(a)))
        .unwrap_or_default();

    let source = match &prayer.source {
        Some(source) => {
            let link = prayer
                .link
                .as_ref()
                .map(|link| {
                    let label = source_domain(link).unwrap_or_else(|| "link".to_string());
                    format!(r#" (<a href="{}" target="_blank">{}</a>)"#, attr(link), escape(&label))
                })
                .unwrap_or_default();
            format!(r#"<div class="source">Source: {}{link}</div>"#, escape(source))
        }
        None => String::new(),
    };

    let mut phelps_line = match &projection.phelps.value {
        Some(code) if projection.phelps.suggested => {
            format!(r#"<span class="suggested">{}</span> (Lang: {})"#, escape(code), escape(language_name))
        }
        Some(code) => format!(
            r#"<a href="{}">{}</a> (Lang: {})"#,
            attr(&code_fragment(code)),
            escape(code),
            escape(language_name)
        ),
        None => format!("Not Assigned (Lang: {})", escape(language_name)),
    };
    if projection.language.suggested {
        phelps_line.push_str(&format!(
            r#" <span class="suggested">(New Lang: {})</span>"#,
            escape(language_name)
        ));
    }

    let name_line = if projection.name.suggested {
        let name = projection.name.value.as_deref().unwrap_or("(cleared)");
        format!(r#"<div class="meta">Name: <span class="suggested">{}</span></div>"#, escape(name))
    } else {
        String::new()
    };

    format!(
        r#"<div id="prayer-details" class="scripture"><div class="prayer markdown-content">{text}</div>{author}{source}{name_line}<div class="meta">Phelps ID: {phelps_line}</div><div class="meta">Version ID: {}</div></div>"#,
        escape(&prayer.version)
    )
}

async fn actions_html(
    state: &AppState,
    prayer: &Prayer,
    projection: &DisplayProjection,
    pinned: Option<(String, String)>,
    language_name: &str,
) -> String {
    let version = attr(&prayer.version);
    let button = |action: &str, label: &str, extra: &str| {
        format!(r#"<button data-action="{action}" data-version="{version}"{extra}>{}</button>"#, escape(label))
    };
    let label = prayer
        .name
        .clone()
        .unwrap_or_else(|| format!("Version {}", prayer.version));
    let effective_name = projection.name.value.clone();

    let mut buttons = Vec::new();

    let favorite = if state.favorites.contains(&prayer.version).await {
        "★ Favorited"
    } else {
        "☆ Favorite"
    };
    buttons.push(button("favorite", favorite, ""));

    match pinned {
        None => buttons.push(button("pin", "Pin this Prayer", "")),
        Some((pinned_version, _)) if pinned_version == prayer.version => {
            buttons.push(r#"<span class="is-pinned">This prayer is pinned.</span>"#.to_string());
            buttons.push(button("unpin", "Unpin", ""));
        }
        Some((_, pinned_name)) => {
            let snippet: String = pinned_name.chars().take(20).collect();
            let snippet = if pinned_name.chars().count() > 20 {
                format!("{snippet}...")
            } else {
                snippet
            };
            buttons.push(button("equivalence", &format!("Match with Pinned: {snippet}"), ""));
            buttons.push(button("pin", "Replace Pin", ""));
        }
    }

    if prayer.phelps.is_none() && !projection.phelps.suggested {
        let own_language = state.language_names.lookup(&prayer.language).await;
        let prompt = format!("Enter Phelps code for:\n{label}\n({own_language})");
        buttons.push(button("phelps", "Suggest Phelps Code", &prompt_attrs(&prompt, "")));
    }

    let prompt = format!(
        "Enter new language code for:\n{}\n(V: {})\nCurrent language: {language_name}",
        effective_name.clone().unwrap_or_else(|| label.clone()),
        prayer.version
    );
    buttons.push(button("language", "Change Language", &prompt_attrs(&prompt, &projection.language.value)));

    let current_name = effective_name.clone().unwrap_or_else(|| "Not Set".to_string());
    let prompt = format!(
        "Enter name for:\nVersion {} (Lang: {language_name})\nCurrent name: {current_name}",
        prayer.version
    );
    buttons.push(button(
        "name",
        "Change Name",
        &prompt_attrs(&prompt, effective_name.as_deref().unwrap_or("")),
    ));

    let prompt = format!(
        "Enter a general note for:\n{} (V: {})",
        effective_name.unwrap_or(label),
        prayer.version
    );
    buttons.push(button("note", "Add Note", &prompt_attrs(&prompt, "")));

    format!(r#"<div class="prayer-actions">{}</div>"#, buttons.concat())
}

fn prompt_attrs(prompt: &str, default: &str) -> String {
    format!(r#" data-prompt="{}" data-default="{}""#, attr(prompt), attr(default))
}

/// Same-language versions of the code the prayer was reached through
async fn other_versions_html(
    state: &AppState,
    prayer: &Prayer,
    projection: &DisplayProjection,
    nav: CodeNav<'_>,
) -> String {
    if projection.phelps.value.as_deref() != Some(nav.code) || prayer.language.is_empty() {
        return String::new();
    }

    let sql = format!(
        "SELECT version, name, link FROM writings WHERE phelps = {} AND language = {} AND version != {} ORDER BY name",
        literal(nav.code),
        literal(&prayer.language),
        literal(&prayer.version)
    );
    let others = Prayer::from_rows(&state.gateway.query(&sql).await);
    if others.is_empty() {
        return String::new();
    }

    let items: String = others
        .iter()
        .map(|other| {
            let label = other
                .name
                .clone()
                .unwrap_or_else(|| format!("Version {}", other.version));
            let domain = other
                .link
                .as_deref()
                .and_then(source_domain)
                .map(|d| format!(" ({d})"))
                .unwrap_or_default();
            format!(
                r#"<li><a href="{}">{}{}</a></li>"#,
                attr(&prayer_fragment(&other.version)),
                escape(&label),
                escape(&domain)
            )
        })
        .collect();

    let language_name = state.language_names.lookup(&prayer.language).await;
    format!(
        r#"<div class="other-versions"><h5>Other versions in {} for {}:</h5><ul class="other-versions-list">{items}</ul></div>"#,
        escape(&language_name),
        escape(nav.code)
    )
}
