//! Proposal types and their fixed descriptions

use serde::Serialize;

use crate::prayer::Prayer;

/// Snapshot of the pinned record, taken at pin time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinnedPrayer {
    pub version: String,
    pub phelps: Option<String>,
    pub name: String,
    pub language: String,
    pub text: String,
}

impl PinnedPrayer {
    pub fn snapshot(prayer: &Prayer) -> Self {
        Self {
            version: prayer.version.clone(),
            phelps: prayer.phelps.clone(),
            name: prayer.display_name(),
            language: prayer.language.clone(),
            text: prayer
                .text
                .clone()
                .unwrap_or_else(|| "Text not available.".to_string()),
        }
    }

    fn as_snapshot(&self) -> PrayerSnapshot {
        PrayerSnapshot {
            version: self.version.clone(),
            language: self.language.clone(),
            name: Some(self.name.clone()),
            phelps: self.phelps.clone(),
        }
    }
}

/// Identifying fields of a proposal's target record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrayerSnapshot {
    pub version: String,
    pub language: String,
    pub name: Option<String>,
    pub phelps: Option<String>,
}

impl PrayerSnapshot {
    pub fn of(prayer: &Prayer) -> Self {
        Self {
            version: prayer.version.clone(),
            language: prayer.language.clone(),
            name: prayer.name.clone(),
            phelps: prayer.phelps.clone(),
        }
    }

    /// Name, or `V:<version>`
    fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("V:{}", self.version))
    }
}

/// How an equivalence between two records resolves their codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Pinned has a code, candidate does not
    ToCandidate(String),
    /// Candidate has a code, pinned does not
    ToPinned(String),
    /// Neither has a code; both get the same placeholder
    Synthetic(String),
    /// Both coded with the same code
    Confirmed,
    /// Both coded, codes differ
    Conflict,
}

/// One collected suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Proposal {
    #[serde(rename = "match_prayers")]
    Equivalence {
        pinned: PrayerSnapshot,
        candidate: PrayerSnapshot,
        description: String,
    },
    #[serde(rename = "assign_phelps")]
    PhelpsAssignment {
        prayer: PrayerSnapshot,
        phelps: String,
        description: String,
    },
    #[serde(rename = "change_language")]
    LanguageChange {
        prayer: PrayerSnapshot,
        language: String,
        description: String,
    },
    #[serde(rename = "change_name")]
    NameChange {
        prayer: PrayerSnapshot,
        name: String,
        description: String,
    },
    #[serde(rename = "add_note")]
    Note {
        prayer: PrayerSnapshot,
        note: String,
        description: String,
    },
}

impl Proposal {
    pub(crate) fn equivalence(pinned: &PinnedPrayer, candidate: &Prayer) -> Self {
        let pinned = pinned.as_snapshot();
        let candidate = PrayerSnapshot::of(candidate);

        let description = match resolve(&pinned, &candidate) {
            Resolution::ToCandidate(code) => format!(
                "Pinned (Phelps {code}, V:{}) matches Current (V:{}). Propose {code} for Current.",
                pinned.version, candidate.version
            ),
            Resolution::ToPinned(code) => format!(
                "Pinned (V:{}) matches Current (Phelps {code}, V:{}). Propose {code} for Pinned.",
                pinned.version, candidate.version
            ),
            Resolution::Synthetic(code) => format!(
                "Pinned (V:{}) matches Current (V:{}). Propose {code} for both.",
                pinned.version, candidate.version
            ),
            Resolution::Confirmed | Resolution::Conflict => {
                let p = pinned.phelps.as_deref().unwrap_or_default();
                let c = candidate.phelps.as_deref().unwrap_or_default();
                let mut text = format!(
                    "Pinned (Phelps {p}, V:{}) matches Current (Phelps {c}, V:{}). This suggests they are the same prayer.",
                    pinned.version, candidate.version
                );
                if p != c {
                    text.push_str(&format!(" WARNING: Phelps codes differ! ({p} vs {c})"));
                }
                text
            }
        };

        Proposal::Equivalence {
            pinned,
            candidate,
            description,
        }
    }

    pub(crate) fn phelps(prayer: &Prayer, code: &str) -> Self {
        let prayer = PrayerSnapshot::of(prayer);
        let description = format!(
            "Assign Phelps [{code}] to {} (Lang: {}, V: {})",
            prayer.label(),
            prayer.language,
            prayer.version
        );
        Proposal::PhelpsAssignment {
            prayer,
            phelps: code.to_string(),
            description,
        }
    }

    pub(crate) fn language(prayer: &Prayer, code: &str) -> Self {
        let prayer = PrayerSnapshot::of(prayer);
        let description = format!(
            "Change language of {} (V: {}) from {} to [{}]",
            prayer.label(),
            prayer.version,
            prayer.language.to_uppercase(),
            code.to_uppercase()
        );
        Proposal::LanguageChange {
            prayer,
            language: code.to_lowercase(),
            description,
        }
    }

    pub(crate) fn name(prayer: &Prayer, name: &str) -> Self {
        let prayer = PrayerSnapshot::of(prayer);
        let description = format!(
            "Change name of V:{} (Lang: {}) to \"{name}\" (was: \"{}\")",
            prayer.version,
            prayer.language.to_uppercase(),
            prayer.name.as_deref().unwrap_or("N/A")
        );
        Proposal::NameChange {
            prayer,
            name: name.to_string(),
            description,
        }
    }

    pub(crate) fn note(prayer: &Prayer, note: &str) -> Self {
        let prayer = PrayerSnapshot::of(prayer);
        let description = format!(
            "Note for {} (V: {}, Lang: {}): \"{note}\"",
            prayer.label(),
            prayer.version,
            prayer.language.to_uppercase()
        );
        Proposal::Note {
            prayer,
            note: note.to_string(),
            description,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Proposal::Equivalence { description, .. }
            | Proposal::PhelpsAssignment { description, .. }
            | Proposal::LanguageChange { description, .. }
            | Proposal::NameChange { description, .. }
            | Proposal::Note { description, .. } => description,
        }
    }

    /// Tag used in exports
    pub fn kind(&self) -> &'static str {
        match self {
            Proposal::Equivalence { .. } => "match_prayers",
            Proposal::PhelpsAssignment { .. } => "assign_phelps",
            Proposal::LanguageChange { .. } => "change_language",
            Proposal::NameChange { .. } => "change_name",
            Proposal::Note { .. } => "add_note",
        }
    }

    /// Versions this proposal is about
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Proposal::Equivalence {
                pinned, candidate, ..
            } => vec![pinned.version.as_str(), candidate.version.as_str()],
            Proposal::PhelpsAssignment { prayer, .. }
            | Proposal::LanguageChange { prayer, .. }
            | Proposal::NameChange { prayer, .. }
            | Proposal::Note { prayer, .. } => vec![prayer.version.as_str()],
        }
    }
}

/// Resolve which side of an equivalence gets which code
pub fn resolve(pinned: &PrayerSnapshot, candidate: &PrayerSnapshot) -> Resolution {
    match (&pinned.phelps, &candidate.phelps) {
        (Some(code), None) => Resolution::ToCandidate(code.clone()),
        (None, Some(code)) => Resolution::ToPinned(code.clone()),
        (None, None) => Resolution::Synthetic(synthetic_code(&pinned.version)),
        (Some(a), Some(b)) if a == b => Resolution::Confirmed,
        (Some(_), Some(_)) => Resolution::Conflict,
    }
}

/// Placeholder code derived from a version identifier: `TODO<base36>`
///
/// The identifier is read as hexadecimal after removing `-` (a UUID yields
/// its 128-bit value). Anything else falls back to its first 16 bytes as a
/// big-endian integer.
pub fn synthetic_code(version: &str) -> String {
    format!("TODO{}", to_base36(numeric_value(version)))
}

fn numeric_value(version: &str) -> u128 {
    if let Ok(uuid) = uuid::Uuid::try_parse(version) {
        return uuid.as_u128();
    }

    let hex: String = version.chars().filter(|c| *c != '-').collect();
    if !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        if let Ok(value) = u128::from_str_radix(&hex, 16) {
            return value;
        }
    }

    version
        .bytes()
        .take(16)
        .fold(0u128, |acc, b| (acc << 8) | u128::from(b))
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
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
    fn test_synthetic_code_from_uuid() {
        assert_eq!(
            synthetic_code("123e4567-e89b-12d3-a456-426614174000"),
            "TODO12vqjrnxk8whv3i8qi6qgrlz4"
        );
        assert_eq!(synthetic_code("ff"), "TODO73");
        assert_eq!(
            synthetic_code("ffffffff-ffff-ffff-ffff-ffffffffffff"),
            "TODOf5lxx1zz5pnorynqglhzmsp33"
        );
    }

    #[test]
    fn test_synthetic_code_for_non_hex_identifiers() {
        assert_eq!(synthetic_code("v1"), "TODOnch");
        assert_eq!(synthetic_code(""), "TODO0");
        // Deterministic
        assert_eq!(synthetic_code("abc-xyz"), synthetic_code("abc-xyz"));
    }

    #[test]
    fn test_pinned_snapshot_defaults() {
        let pinned = PinnedPrayer::snapshot(&prayer("v9", "en", None, None));
        assert_eq!(pinned.name, "Prayer v9");
        assert_eq!(pinned.text, "Text not available.");
    }

    #[test]
    fn test_equivalence_descriptions() {
        let coded = PinnedPrayer::snapshot(&prayer("p", "en", None, Some("AB00001")));
        let plain = PinnedPrayer::snapshot(&prayer("p", "en", None, None));

        let a = Proposal::equivalence(&coded, &prayer("c", "fr", None, None));
        assert_eq!(
            a.description(),
            "Pinned (Phelps AB00001, V:p) matches Current (V:c). Propose AB00001 for Current."
        );

        let b = Proposal::equivalence(&plain, &prayer("c", "fr", None, Some("BH00002")));
        assert_eq!(
            b.description(),
            "Pinned (V:p) matches Current (Phelps BH00002, V:c). Propose BH00002 for Pinned."
        );

        let c = Proposal::equivalence(&plain, &prayer("c", "fr", None, None));
        assert_eq!(
            c.description(),
            format!("Pinned (V:p) matches Current (V:c). Propose {} for both.", synthetic_code("p"))
        );

        let d = Proposal::equivalence(&coded, &prayer("c", "fr", None, Some("AB00001")));
        assert_eq!(
            d.description(),
            "Pinned (Phelps AB00001, V:p) matches Current (Phelps AB00001, V:c). This suggests they are the same prayer."
        );

        let e = Proposal::equivalence(&coded, &prayer("c", "fr", None, Some("AB00002")));
        assert!(e
            .description()
            .ends_with("same prayer. WARNING: Phelps codes differ! (AB00001 vs AB00002)"));
    }

    #[test]
    fn test_field_change_descriptions() {
        let named = prayer("v1", "en", Some("Morning"), None);
        let unnamed = prayer("v2", "fr", None, None);

        assert_eq!(
            Proposal::phelps(&named, "AB00001").description(),
            "Assign Phelps [AB00001] to Morning (Lang: en, V: v1)"
        );
        assert_eq!(
            Proposal::language(&unnamed, "De").description(),
            "Change language of V:v2 (V: v2) from FR to [DE]"
        );
        assert_eq!(
            Proposal::name(&unnamed, "Evening").description(),
            "Change name of V:v2 (Lang: FR) to \"Evening\" (was: \"N/A\")"
        );
        assert_eq!(
            Proposal::note(&named, "check source").description(),
            "Note for Morning (V: v1, Lang: EN): \"check source\""
        );
    }

    #[test]
    fn test_language_is_stored_lower_case() {
        match Proposal::language(&prayer("v1", "en", None, None), "FA") {
            Proposal::LanguageChange { language, .. } => assert_eq!(language, "fa"),
            other => panic!("unexpected proposal {other:?}"),
        }
    }

    #[test]
    fn test_kind_tags_match_serialized_type() {
        let p = Proposal::note(&prayer("v1", "en", None, None), "x");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], p.kind());
        assert_eq!(json["prayer"]["version"], "v1");
    }
}
