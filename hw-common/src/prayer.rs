//! Prayer records from the `writings` table
//!
//! Columns: `version, text, language, phelps, name, source, link`.
//! `version` is the primary key; empty strings in the optional columns are
//! read as absent.

use serde::{Deserialize, Serialize};

use crate::gateway::Row;

/// Card previews show at most this many characters of text
pub const MAX_PREVIEW_LENGTH: usize = 120;

/// Column list for a full record fetch
pub const FULL_COLUMNS: &str = "version, text, language, phelps, name, source, link";

/// One stored prayer/text entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prayer {
    /// Version identifier (primary key, normally a UUID)
    pub version: String,
    /// Language code as stored (usually lower-case ISO code)
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Canonical cross-translation code
    #[serde(default)]
    pub phelps: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl Prayer {
    pub fn new(version: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            language: language.into(),
            ..Default::default()
        }
    }

    /// Build from a query row; rows without a `version` are skipped
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            version: row.get("version")?,
            language: row.get("language").unwrap_or_default(),
            name: row.get("name"),
            phelps: row.get("phelps"),
            text: row.get("text"),
            source: row.get("source"),
            link: row.get("link"),
        })
    }

    pub fn from_rows(rows: &[Row]) -> Vec<Self> {
        rows.iter().filter_map(Self::from_row).collect()
    }

    /// Name, or `Prayer <version>` when unnamed
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Prayer {}", self.version))
    }

    pub fn has_phelps(&self) -> bool {
        self.phelps.is_some()
    }

    /// Card preview of the text
    pub fn preview(&self) -> Option<String> {
        self.text.as_deref().map(|t| preview_text(t, MAX_PREVIEW_LENGTH))
    }

    /// Fill fields missing here from `other` (same version)
    pub fn merge_missing(&mut self, other: &Prayer) {
        if self.language.is_empty() {
            self.language = other.language.clone();
        }
        fill(&mut self.name, &other.name);
        fill(&mut self.phelps, &other.phelps);
        fill(&mut self.text, &other.text);
        fill(&mut self.source, &other.source);
        fill(&mut self.link, &other.link);
    }
}

fn fill(target: &mut Option<String>, source: &Option<String>) {
    if target.is_none() {
        *target = source.clone();
    }
}

/// First `max` characters of `text`, with `...` when truncated
pub fn preview_text(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Author implied by the two-letter phelps prefix
pub fn author_from_phelps(code: &str) -> Option<&'static str> {
    let prefix: String = code.chars().take(2).collect::<String>().to_uppercase();
    if prefix.chars().count() < 2 {
        return None;
    }
    match prefix.as_str() {
        "AB" => Some("`Abdu'l-Bahá"),
        "BH" => Some("Bahá'u'lláh"),
        "BB" => Some("The Báb"),
        _ => None,
    }
}

/// Host of a source link without a leading `www.`; scheme is optional
pub fn source_domain(link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    let full = if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("http://{link}")
    };
    let parsed = url::Url::parse(&full).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_row_treats_empty_as_absent() {
        let row: Row = serde_json::from_value(json!({
            "version": "v1",
            "language": "en",
            "phelps": "",
            "name": "Morning Prayer",
            "text": "O God...",
            "link": null
        }))
        .unwrap();

        let prayer = Prayer::from_row(&row).unwrap();
        assert_eq!(prayer.version, "v1");
        assert_eq!(prayer.language, "en");
        assert_eq!(prayer.phelps, None);
        assert_eq!(prayer.name.as_deref(), Some("Morning Prayer"));
        assert_eq!(prayer.link, None);
    }

    #[test]
    fn test_from_row_requires_version() {
        let row = Row::new().with("language", "en");
        assert!(Prayer::from_row(&row).is_none());
    }

    #[test]
    fn test_display_name_fallback() {
        let prayer = Prayer::new("abc", "en");
        assert_eq!(prayer.display_name(), "Prayer abc");
    }

    #[test]
    fn test_preview_truncates_on_chars() {
        let text = "á".repeat(130);
        let preview = preview_text(&text, MAX_PREVIEW_LENGTH);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), MAX_PREVIEW_LENGTH + 3);

        assert_eq!(preview_text("short", MAX_PREVIEW_LENGTH), "short");
        assert_eq!(preview_text(&"x".repeat(120), 120), "x".repeat(120));
    }

    #[test]
    fn test_author_from_phelps() {
        assert_eq!(author_from_phelps("AB00001"), Some("`Abdu'l-Bahá"));
        assert_eq!(author_from_phelps("bh01234"), Some("Bahá'u'lláh"));
        assert_eq!(author_from_phelps("BB123"), Some("The Báb"));
        assert_eq!(author_from_phelps("XX123"), None);
        assert_eq!(author_from_phelps("A"), None);
    }

    #[test]
    fn test_source_domain() {
        assert_eq!(source_domain("https://www.bahai.org/library").as_deref(), Some("bahai.org"));
        assert_eq!(source_domain("bahaiprayers.net/x").as_deref(), Some("bahaiprayers.net"));
        assert_eq!(source_domain(""), None);
    }

    #[test]
    fn test_merge_missing_keeps_existing() {
        let mut a = Prayer::new("v1", "en");
        a.name = Some("Mine".into());
        let mut b = Prayer::new("v1", "fr");
        b.name = Some("Theirs".into());
        b.text = Some("text".into());

        a.merge_missing(&b);
        assert_eq!(a.name.as_deref(), Some("Mine"));
        assert_eq!(a.language, "en");
        assert_eq!(a.text.as_deref(), Some("text"));
    }
}
