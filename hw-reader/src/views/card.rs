//! Prayer cards used by every listing

use std::collections::{BTreeMap, HashMap};

use hw_common::prayer::{source_domain, Prayer};

use super::markdown::{attr, escape};
use crate::route::{code_fragment, code_language_fragment, prayer_fragment};

pub const NO_PREVIEW: &str = "No text preview available.";

/// One card's data: the record (text optional) and its preview
#[derive(Debug, Clone)]
pub struct Card {
    pub prayer: Prayer,
    pub preview: Option<String>,
}

impl Card {
    /// Preview taken from the record's own text
    pub fn from_prayer(prayer: Prayer) -> Self {
        let preview = prayer.preview();
        Self { prayer, preview }
    }
}

/// Card HTML
///
/// `versions` maps phelps codes to every version sharing them; it feeds the
/// "Translations" and "Other versions" lists.
pub fn card_html(card: &Card, language_name: &str, versions: &HashMap<String, Vec<Prayer>>) -> String {
    let prayer = &card.prayer;
    let language = if prayer.language.is_empty() {
        "N/A"
    } else {
        prayer.language.as_str()
    };

    let title = match (&prayer.name, &prayer.phelps) {
        (Some(name), _) => name.clone(),
        (None, Some(phelps)) => format!("{phelps} - {language_name}"),
        (None, None) => format!("{} - {language_name}", prayer.version),
    };
    let href = match &prayer.phelps {
        Some(phelps) => code_language_fragment(phelps, language),
        None => prayer_fragment(&prayer.version),
    };
    let preview = card.preview.as_deref().unwrap_or(NO_PREVIEW);

    let mut meta = format!("<span>Lang: {}</span>", escape(&language.to_uppercase()));
    if let Some(phelps) = &prayer.phelps {
        meta.push_str(&format!(
            r#"<span class="phelps-code">Phelps: <a href="{}">{}</a></span>"#,
            attr(&code_fragment(phelps)),
            escape(phelps)
        ));
    }
    if let Some(link) = &prayer.link {
        let label = source_domain(link).unwrap_or_else(|| "Link".to_string());
        meta.push_str(&format!(
            r#"<span>Source: <a href="{}" target="_blank">{}</a></span>"#,
            attr(link),
            escape(&label)
        ));
    }

    let related = prayer
        .phelps
        .as_ref()
        .and_then(|phelps| versions.get(phelps).map(|all| related_html(prayer, phelps, language, all)))
        .unwrap_or_default();

    format!(
        r#"<div class="prayer-card"><div><div class="prayer-card-header"><a href="{}">{}</a></div><p class="prayer-card-preview">{}</p><div class="prayer-card-meta">{}</div></div>{}</div>"#,
        attr(&href),
        escape(&title),
        escape(preview),
        meta,
        related
    )
}

/// Links to the other languages and the other same-language versions of a code
fn related_html(prayer: &Prayer, phelps: &str, language: &str, all: &[Prayer]) -> String {
    let mut by_language: BTreeMap<&str, Vec<&Prayer>> = BTreeMap::new();
    for other in all.iter().filter(|p| p.version != prayer.version) {
        by_language.entry(other.language.as_str()).or_default().push(other);
    }

    let mut translations = Vec::new();
    let mut alternates = Vec::new();
    for (lang, others) in by_language {
        if lang != language {
            translations.push(format!(
                r#"<li><a href="{}">{}</a></li>"#,
                attr(&code_language_fragment(phelps, lang)),
                escape(&lang.to_uppercase())
            ));
            continue;
        }
        for other in others {
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
            alternates.push(format!(
                r#"<li><a href="{}">{}{}</a></li>"#,
                attr(&prayer_fragment(&other.version)),
                escape(&label),
                escape(&domain)
            ));
        }
    }

    if translations.is_empty() && alternates.is_empty() {
        return String::new();
    }

    let mut html = String::from(r#"<div class="prayer-card-translations">"#);
    if !translations.is_empty() {
        html.push_str(&format!(
            r#"<h5>Translations:</h5><ul class="translations-list">{}</ul>"#,
            translations.concat()
        ));
    }
    if !alternates.is_empty() {
        html.push_str(&format!(
            r#"<h5>Other versions in {}:</h5><ul class="other-versions-list">{}</ul>"#,
            escape(&language.to_uppercase()),
            alternates.concat()
        ));
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prayer(version: &str, language: &str, name: Option<&str>, phelps: Option<&str>) -> Prayer {
        Prayer {
            version: version.into(),
            language: language.into(),
            name: name.map(Into::into),
            phelps: phelps.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn test_title_fallbacks() {
        let none = HashMap::new();
        let named = Card::from_prayer(prayer("v1", "en", Some("Tablet of Ahmad"), Some("BH00001")));
        assert!(card_html(&named, "English", &none).contains(">Tablet of Ahmad</a>"));

        let coded = Card::from_prayer(prayer("v2", "fr", None, Some("AB00002")));
        let html = card_html(&coded, "Français", &none);
        assert!(html.contains(">AB00002 - Français</a>"));
        assert!(html.contains(r##"href="#prayercode/AB00002/fr""##));

        let bare = Card::from_prayer(prayer("v3", "de", None, None));
        let html = card_html(&bare, "Deutsch", &none);
        assert!(html.contains(">v3 - Deutsch</a>"));
        assert!(html.contains(r##"href="#prayer/v3""##));
        assert!(html.contains(NO_PREVIEW));
    }

    #[test]
    fn test_related_versions() {
        let main = prayer("v1", "en", Some("Healing"), Some("BH1"));
        let mut alt = prayer("v2", "en", None, Some("BH1"));
        alt.link = Some("https://www.bahai.org/x".into());
        let versions = HashMap::from([(
            "BH1".to_string(),
            vec![
                main.clone(),
                alt,
                prayer("v3", "fr", None, Some("BH1")),
                prayer("v4", "de", None, Some("BH1")),
            ],
        )]);

        let html = card_html(&Card::from_prayer(main), "English", &versions);
        assert!(html.contains("<h5>Translations:</h5>"));
        let de = html.find(">DE</a>").unwrap();
        let fr = html.find(">FR</a>").unwrap();
        assert!(de < fr);
        assert!(html.contains("Other versions in EN:"));
        assert!(html.contains(">Version v2 (bahai.org)</a>"));
        assert!(!html.contains(r##"href="#prayer/v1""##));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut p = prayer("v1", "en", Some("<b>Bold</b>"), None);
        p.text = Some("1 < 2".into());
        let html = card_html(&Card::from_prayer(p), "English", &HashMap::new());
        assert!(html.contains("&lt;b&gt;Bold&lt;/b&gt;"));
        assert!(html.contains("1 &lt; 2"));
    }
}
