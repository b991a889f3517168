//! End-to-end matching tool workflow: pin, propose, compile, export

use hw_common::curation::{issue_body, CurationError, CurationTool, Handoff, Outcome, Proposal};
use hw_common::Prayer;

fn prayer(version: &str, language: &str, name: Option<&str>, phelps: Option<&str>) -> Prayer {
    Prayer {
        version: version.into(),
        language: language.into(),
        name: name.map(Into::into),
        phelps: phelps.map(Into::into),
        text: Some(format!("Text of {version}")),
        ..Default::default()
    }
}

#[test]
fn test_full_session() {
    let mut tool = CurationTool::new();
    let english = prayer("11111111-1111-1111-1111-111111111111", "en", Some("Healing Prayer"), Some("BH00123"));
    let french = prayer("22222222-2222-2222-2222-222222222222", "fr", None, None);
    let german = prayer("33333333-3333-3333-3333-333333333333", "de", Some("Heilung"), None);

    tool.pin(&english).unwrap();
    assert_eq!(tool.pinned().unwrap().text, "Text of 11111111-1111-1111-1111-111111111111");

    tool.propose_equivalence(&french).unwrap();
    tool.propose_equivalence(&german).unwrap();
    tool.propose_language(&german, "de-CH").unwrap();
    tool.propose_note(&french, "Missing final verse").unwrap();

    assert_eq!(tool.pinned().unwrap().name, "Healing Prayer");

    let statements = tool.compile(false);
    assert_eq!(statements.len(), 3);
    assert_eq!(
        statements[0],
        "UPDATE writings SET phelps = 'BH00123' WHERE version = '22222222-2222-2222-2222-222222222222';"
    );
    assert_eq!(
        statements[2],
        "UPDATE writings SET language = 'de-ch' WHERE version = '33333333-3333-3333-3333-333333333333';"
    );

    // Overlay shows the propagated code on the French record only
    assert_eq!(tool.overlay(&french).phelps.value.as_deref(), Some("BH00123"));
    assert!(tool.overlay(&french).phelps.suggested);
    assert!(!tool.overlay(&english).any_suggested());
    assert_eq!(tool.overlay(&german).language.value, "de-ch");

    let draft = Handoff::default().mail_draft(&tool, "https://holywritings.net/").unwrap();
    assert!(draft.body.contains("4. Note for V:22222222-2222-2222-2222-222222222222"));
    assert_eq!(draft.body.matches(" -- ").count(), 3);

    let body = issue_body(&tool, "https://holywritings.net/", "#prayer/x").unwrap();
    assert!(body.contains("**Suggestion 4 (Type: add_note):**"));
    assert!(body.contains("- Note: \"Missing final verse\""));

    // Unpin keeps the list; a rejected action changes nothing
    assert_eq!(tool.unpin().unwrap(), Outcome::Unpinned);
    assert_eq!(tool.propose_equivalence(&french).unwrap_err(), CurationError::NothingPinned);
    assert_eq!(tool.proposals().len(), 4);

    tool.remove_proposal(0).unwrap();
    assert!(matches!(tool.proposals()[0], Proposal::Equivalence { .. }));
    assert_eq!(tool.compile(false).len(), 2);

    assert_eq!(tool.clear_all(true).unwrap(), Outcome::Cleared { unpinned: false });
    assert_eq!(tool.clear_all(true).unwrap(), Outcome::NothingToClear);
}

#[test]
fn test_unnamed_pairs_share_a_placeholder() {
    let mut tool = CurationTool::new();
    let a = prayer("0000000a-0000-0000-0000-000000000000", "en", None, None);
    let b = prayer("b", "fa", None, None);

    tool.pin(&a).unwrap();
    tool.propose_equivalence(&b).unwrap();

    let statements = tool.compile(false);
    assert_eq!(statements.len(), 2);
    let code = |s: &str| s.split('\'').nth(1).map(str::to_string);
    assert_eq!(code(&statements[0]), code(&statements[1]));
    assert!(statements[0].contains("'TODO"));
    assert!(statements[0].ends_with("WHERE version = '0000000a-0000-0000-0000-000000000000';"));
    assert!(statements[1].ends_with("WHERE version = 'b';"));
}
