//! Proposals to `UPDATE` statements

use super::proposal::{resolve, Proposal, Resolution};
use super::CurationTool;
use crate::sql::escape;

fn update(column: &str, value: &str, version: &str) -> String {
    format!(
        "UPDATE writings SET {column} = '{}' WHERE version = '{}';",
        escape(value),
        escape(version)
    )
}

fn emit(out: &mut Vec<String>, statement: String, comment: Option<String>) {
    match comment {
        Some(comment) => out.push(format!("{statement} -- {comment}")),
        None => out.push(statement),
    }
}

impl CurationTool {
    /// `UPDATE` statements for the collected proposals, in list order
    ///
    /// Notes and already-coded equivalences produce nothing. With
    /// `with_comments`, each statement carries a trailing `-- ` explanation.
    pub fn compile(&self, with_comments: bool) -> Vec<String> {
        let mut out = Vec::new();
        for proposal in self.proposals() {
            compile_one(proposal, with_comments, &mut out);
        }
        out
    }
}

fn compile_one(proposal: &Proposal, with_comments: bool, out: &mut Vec<String>) {
    let comment = |text: String| with_comments.then_some(text);

    match proposal {
        Proposal::PhelpsAssignment { prayer, phelps, .. } => emit(
            out,
            update("phelps", phelps, &prayer.version),
            comment(format!(
                "Assign Phelps {phelps} to {} ({})",
                prayer.version, prayer.language
            )),
        ),
        Proposal::Equivalence {
            pinned, candidate, ..
        } => match resolve(pinned, candidate) {
            Resolution::ToCandidate(code) => emit(
                out,
                update("phelps", &code, &candidate.version),
                comment(format!(
                    "Auto-assign from pinned {} (Phelps: {code}) to {} ({})",
                    pinned.version, candidate.version, candidate.language
                )),
            ),
            Resolution::ToPinned(code) => emit(
                out,
                update("phelps", &code, &pinned.version),
                comment(format!(
                    "Auto-assign from current {} (Phelps: {code}) to {} ({})",
                    candidate.version, pinned.version, pinned.language
                )),
            ),
            Resolution::Synthetic(code) => {
                emit(
                    out,
                    update("phelps", &code, &pinned.version),
                    comment(format!(
                        "Assign new temp Phelps: {} ({}) linked with {} ({}) using {code}",
                        pinned.version, pinned.language, candidate.version, candidate.language
                    )),
                );
                emit(
                    out,
                    update("phelps", &code, &candidate.version),
                    comment(format!(
                        "Assign new temp Phelps: {} ({}) linked with {} ({}) using {code}",
                        candidate.version, candidate.language, pinned.version, pinned.language
                    )),
                );
            }
            Resolution::Confirmed | Resolution::Conflict => {}
        },
        Proposal::LanguageChange { prayer, language, .. } => emit(
            out,
            update("language", language, &prayer.version),
            comment(format!(
                "Change language for {} from {} to {language}",
                prayer.version, prayer.language
            )),
        ),
        Proposal::NameChange { prayer, name, .. } => emit(
            out,
            update("name", name, &prayer.version),
            comment(format!("Change name for {} to \"{name}\"", prayer.version)),
        ),
        Proposal::Note { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curation::synthetic_code;
    use crate::prayer::Prayer;

    fn prayer(version: &str, language: &str, phelps: Option<&str>) -> Prayer {
        Prayer {
            version: version.into(),
            language: language.into(),
            phelps: phelps.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn test_phelps_assignment_with_and_without_comment() {
        let mut tool = CurationTool::new();
        tool.propose_phelps(&prayer("v1", "en", None), "AB00001").unwrap();

        assert_eq!(
            tool.compile(false),
            vec!["UPDATE writings SET phelps = 'AB00001' WHERE version = 'v1';"]
        );
        assert_eq!(
            tool.compile(true),
            vec!["UPDATE writings SET phelps = 'AB00001' WHERE version = 'v1'; -- Assign Phelps AB00001 to v1 (en)"]
        );
    }

    #[test]
    fn test_equivalence_statement_counts() {
        let mut tool = CurationTool::new();

        // (a) pinned coded -> one statement for the candidate
        tool.pin(&prayer("p", "en", Some("AB1"))).unwrap();
        tool.propose_equivalence(&prayer("c", "fr", None)).unwrap();
        // (d) both coded, equal -> none
        tool.propose_equivalence(&prayer("d", "de", Some("AB1"))).unwrap();
        // (e) both coded, different -> none
        tool.propose_equivalence(&prayer("e", "es", Some("AB2"))).unwrap();

        assert_eq!(
            tool.compile(false),
            vec!["UPDATE writings SET phelps = 'AB1' WHERE version = 'c';"]
        );

        // (b) candidate coded -> one statement for the pinned side
        tool.pin(&prayer("q", "en", None)).unwrap();
        tool.propose_equivalence(&prayer("r", "fr", Some("BH7"))).unwrap();
        assert_eq!(
            tool.compile(true)[1],
            "UPDATE writings SET phelps = 'BH7' WHERE version = 'q'; -- Auto-assign from current r (Phelps: BH7) to q (en)"
        );
    }

    #[test]
    fn test_synthetic_equivalence_emits_pinned_first() {
        let mut tool = CurationTool::new();
        tool.pin(&prayer("ab-cd", "en", None)).unwrap();
        tool.propose_equivalence(&prayer("x", "fr", None)).unwrap();

        let code = synthetic_code("ab-cd");
        let statements = tool.compile(false);
        assert_eq!(
            statements,
            vec![
                format!("UPDATE writings SET phelps = '{code}' WHERE version = 'ab-cd';"),
                format!("UPDATE writings SET phelps = '{code}' WHERE version = 'x';"),
            ]
        );

        let commented = tool.compile(true);
        assert!(commented[0].ends_with(&format!("-- Assign new temp Phelps: ab-cd (en) linked with x (fr) using {code}")));
        assert!(commented[1].ends_with(&format!("-- Assign new temp Phelps: x (fr) linked with ab-cd (en) using {code}")));
    }

    #[test]
    fn test_quotes_are_doubled_in_values_and_ids() {
        let mut tool = CurationTool::new();
        tool.propose_name(&prayer("o'v", "en", None), "Bahá'u'lláh's Prayer").unwrap();
        assert_eq!(
            tool.compile(false),
            vec!["UPDATE writings SET name = 'Bahá''u''lláh''s Prayer' WHERE version = 'o''v';"]
        );
    }

    #[test]
    fn test_language_and_empty_name_and_notes() {
        let mut tool = CurationTool::new();
        let p = prayer("v1", "en", None);
        tool.propose_language(&p, " FA ").unwrap();
        tool.propose_note(&p, "source looks wrong").unwrap();
        tool.propose_name(&p, "").unwrap();

        assert_eq!(
            tool.compile(true),
            vec![
                "UPDATE writings SET language = 'fa' WHERE version = 'v1'; -- Change language for v1 from en to fa".to_string(),
                "UPDATE writings SET name = '' WHERE version = 'v1'; -- Change name for v1 to \"\"".to_string(),
            ]
        );
    }
}
