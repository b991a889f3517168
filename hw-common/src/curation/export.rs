//! Handoff of collected proposals to outside channels
//!
//! Nothing here sends anything. Each function builds the text or URL that
//! the browser shell opens: a mail draft, an issue body for the DoltHub
//! issue page, a DoltHub query-page link preloaded with the statements, or a
//! chat deep link.

use serde::{Deserialize, Serialize};

use super::{CurationError, CurationTool, Proposal};

pub const DEFAULT_QUERY_PAGE_BASE: &str =
    "https://www.dolthub.com/repositories/holywritings/bahaiwritings/query/main";
pub const DEFAULT_NEW_ISSUE_URL: &str =
    "https://www.dolthub.com/repositories/holywritings/bahaiwritings/issues/new";
pub const DEFAULT_MAIL_RECIPIENT: &str = "ikojba@gmail.com";
pub const MAIL_SUBJECT: &str = "holywritings.net: Prayer Matches/Suggestions";
pub const DEFAULT_WHATSAPP_NUMBER: &str = "351913044570";
pub const DEFAULT_TELEGRAM_HANDLE: &str = "lapingvino";

/// Where handoffs go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Handoff {
    pub mail_recipient: String,
    pub query_page_base: String,
    pub new_issue_url: String,
    pub whatsapp_number: String,
    pub telegram_handle: String,
}

impl Default for Handoff {
    fn default() -> Self {
        Self {
            mail_recipient: DEFAULT_MAIL_RECIPIENT.to_string(),
            query_page_base: DEFAULT_QUERY_PAGE_BASE.to_string(),
            new_issue_url: DEFAULT_NEW_ISSUE_URL.to_string(),
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
            telegram_handle: DEFAULT_TELEGRAM_HANDLE.to_string(),
        }
    }
}

/// A prepared e-mail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailDraft {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl MailDraft {
    pub fn mailto_url(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.recipient,
            urlencoding::encode(&self.subject),
            urlencoding::encode(&self.body)
        )
    }
}

impl Handoff {
    /// Mail draft listing every proposal and the commented statements
    pub fn mail_draft(&self, tool: &CurationTool, base_url: &str) -> Result<MailDraft, CurationError> {
        if !tool.has_items() {
            return Err(CurationError::NoItemsToSend);
        }

        let mut lines = vec![
            "Hello,".to_string(),
            "I've found/suggested the following prayer matches/assignments/changes on holywritings.net:".to_string(),
            String::new(),
        ];
        for (i, proposal) in tool.proposals().iter().enumerate() {
            lines.push(format!("{}. {}", i + 1, proposal.description()));
        }
        lines.push(String::new());
        lines.push("Thank you for maintaining this wonderful resource!".to_string());
        lines.push(format!("Base URL for reference: {base_url}"));
        lines.push(String::new());

        let statements = tool.compile(true);
        if statements.is_empty() {
            lines.push("--- No SQL UPDATE Statements Suggested for these items ---".to_string());
        } else {
            lines.push("--- Suggested SQL UPDATE Statements ---".to_string());
            lines.extend(statements);
        }
        lines.push(String::new());

        Ok(MailDraft {
            recipient: self.mail_recipient.clone(),
            subject: MAIL_SUBJECT.to_string(),
            body: lines.join("\n"),
        })
    }

    /// DoltHub query page preloaded with the uncommented statements
    pub fn query_url(&self, tool: &CurationTool) -> Result<String, CurationError> {
        if !tool.has_items() {
            return Err(CurationError::NoItemsForSql);
        }
        let statements = tool.compile(false);
        if statements.is_empty() {
            return Err(CurationError::NoSqlStatements);
        }
        Ok(format!(
            "{}?q={}",
            self.query_page_base,
            urlencoding::encode(&statements.join("\n"))
        ))
    }

    pub fn whatsapp_url(&self, text: &str) -> Result<String, CurationError> {
        if text.is_empty() {
            return Err(CurationError::NoContent);
        }
        Ok(format!(
            "https://wa.me/{}?text={}",
            self.whatsapp_number,
            urlencoding::encode(text)
        ))
    }

    pub fn telegram_url(&self, text: &str) -> Result<String, CurationError> {
        if text.is_empty() {
            return Err(CurationError::NoContent);
        }
        Ok(format!(
            "https://t.me/{}?text={}",
            self.telegram_handle,
            urlencoding::encode(text)
        ))
    }
}

/// Markdown body for a DoltHub issue
///
/// `origin` is the page URL without fragment and `fragment` the current
/// location hash, both quoted in the footer.
pub fn issue_body(tool: &CurationTool, origin: &str, fragment: &str) -> Result<String, CurationError> {
    if !tool.has_items() {
        return Err(CurationError::NoItemsForIssue);
    }

    let mut lines = vec![
        "The following prayer data suggestions have been collected using the holywritings.net web tool:".to_string(),
        String::new(),
    ];

    for (i, proposal) in tool.proposals().iter().enumerate() {
        lines.push(format!("**Suggestion {} (Type: {}):**", i + 1, proposal.kind()));
        lines.push(format!("> {}", proposal.description()));
        detail_lines(proposal, &mut lines);
        lines.push(String::new());
    }

    let statements = tool.compile(false);
    if statements.is_empty() {
        lines.push("--- No SQL UPDATE Statements Suggested ---".to_string());
    } else {
        lines.push("--- Suggested SQL UPDATE Statements ---".to_string());
        lines.push("```sql".to_string());
        lines.extend(statements);
        lines.push("```".to_string());
    }
    lines.push(String::new());
    lines.push(format!("Submitted from: {origin} (current hash: {fragment})"));

    Ok(lines.join("\n"))
}

fn detail_lines(proposal: &Proposal, lines: &mut Vec<String>) {
    let na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());

    match proposal {
        Proposal::Equivalence {
            pinned, candidate, ..
        } => {
            lines.push(format!(
                "- Pinned: Version {} ({}), Phelps: {}",
                pinned.version,
                pinned.language,
                na(&pinned.phelps)
            ));
            lines.push(format!(
                "- Current: Version {} ({}), Phelps: {}",
                candidate.version,
                candidate.language,
                na(&candidate.phelps)
            ));
        }
        Proposal::PhelpsAssignment { prayer, phelps, .. } => {
            lines.push(format!("- Prayer: Version {} ({})", prayer.version, prayer.language));
            lines.push(format!("- Suggested Phelps: {phelps}"));
        }
        Proposal::LanguageChange { prayer, language, .. } => {
            lines.push(format!(
                "- Prayer: Version {} (Current Lang: {})",
                prayer.version,
                prayer.language.to_uppercase()
            ));
            lines.push(format!("- Suggested New Language: {}", language.to_uppercase()));
        }
        Proposal::NameChange { prayer, name, .. } => {
            lines.push(format!(
                "- Prayer: Version {} (Lang: {})",
                prayer.version,
                prayer.language.to_uppercase()
            ));
            lines.push(format!(
                "- Suggested New Name: \"{name}\" (Current: \"{}\")",
                na(&prayer.name)
            ));
        }
        Proposal::Note { prayer, note, .. } => {
            lines.push(format!(
                "- Prayer: Version {} (Lang: {}, Name: \"{}\")",
                prayer.version,
                prayer.language.to_uppercase(),
                na(&prayer.name)
            ));
            lines.push(format!("- Note: \"{note}\""));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prayer::Prayer;

    fn prayer(version: &str, phelps: Option<&str>) -> Prayer {
        Prayer {
            version: version.into(),
            language: "en".into(),
            phelps: phelps.map(Into::into),
            ..Default::default()
        }
    }

    fn tool_with_phelps() -> CurationTool {
        let mut tool = CurationTool::new();
        tool.propose_phelps(&prayer("v1", None), "AB00001").unwrap();
        tool
    }

    #[test]
    fn test_empty_list_rejections() {
        let tool = CurationTool::new();
        let handoff = Handoff::default();
        assert_eq!(handoff.mail_draft(&tool, "x").unwrap_err().to_string(), "No items to send.");
        assert_eq!(issue_body(&tool, "x", "#").unwrap_err().to_string(), "No items to create an issue for.");
        assert_eq!(handoff.query_url(&tool).unwrap_err().to_string(), "No items to generate SQL for.");
        assert_eq!(handoff.whatsapp_url("").unwrap_err().to_string(), "No content to send.");
        assert_eq!(handoff.telegram_url("").unwrap_err(), CurationError::NoContent);
    }

    #[test]
    fn test_mail_body_sections() {
        let draft = Handoff::default()
            .mail_draft(&tool_with_phelps(), "https://holywritings.net/")
            .unwrap();
        assert_eq!(draft.recipient, "ikojba@gmail.com");
        assert_eq!(draft.subject, MAIL_SUBJECT);

        let expected = [
            "Hello,",
            "I've found/suggested the following prayer matches/assignments/changes on holywritings.net:",
            "",
            "1. Assign Phelps [AB00001] to V:v1 (Lang: en, V: v1)",
            "",
            "Thank you for maintaining this wonderful resource!",
            "Base URL for reference: https://holywritings.net/",
            "",
            "--- Suggested SQL UPDATE Statements ---",
            "UPDATE writings SET phelps = 'AB00001' WHERE version = 'v1'; -- Assign Phelps AB00001 to v1 (en)",
            "",
        ]
        .join("\n");
        assert_eq!(draft.body, expected);
        assert!(draft.mailto_url().starts_with("mailto:ikojba@gmail.com?subject=holywritings.net%3A%20Prayer"));
    }

    #[test]
    fn test_mail_body_without_statements() {
        let mut tool = CurationTool::new();
        tool.propose_note(&prayer("v1", None), "typo").unwrap();
        let draft = Handoff::default().mail_draft(&tool, "base").unwrap();
        assert!(draft
            .body
            .contains("--- No SQL UPDATE Statements Suggested for these items ---"));
    }

    #[test]
    fn test_issue_body_has_details_and_sql_block() {
        let mut tool = CurationTool::new();
        tool.pin(&prayer("p", Some("BH1"))).unwrap();
        tool.propose_equivalence(&prayer("c", None)).unwrap();

        let body = issue_body(&tool, "https://holywritings.net/", "#prayer/c").unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[2], "**Suggestion 1 (Type: match_prayers):**");
        assert!(lines[3].starts_with("> Pinned (Phelps BH1, V:p)"));
        assert_eq!(lines[4], "- Pinned: Version p (en), Phelps: BH1");
        assert_eq!(lines[5], "- Current: Version c (en), Phelps: N/A");
        assert!(body.contains("```sql\nUPDATE writings SET phelps = 'BH1' WHERE version = 'c';\n```"));
        assert!(!body.contains(" -- "));
        assert!(body.ends_with("Submitted from: https://holywritings.net/ (current hash: #prayer/c)"));
    }

    #[test]
    fn test_query_url_requires_statements() {
        let handoff = Handoff::default();
        let mut tool = CurationTool::new();
        tool.propose_note(&prayer("v1", None), "typo").unwrap();
        assert_eq!(handoff.query_url(&tool).unwrap_err(), CurationError::NoSqlStatements);

        let url = handoff.query_url(&tool_with_phelps()).unwrap();
        assert!(url.starts_with(DEFAULT_QUERY_PAGE_BASE));
        assert!(url.contains("?q=UPDATE%20writings%20SET%20phelps"));
    }

    #[test]
    fn test_chat_links() {
        let handoff = Handoff::default();
        assert_eq!(handoff.whatsapp_url("hi there").unwrap(), "https://wa.me/351913044570?text=hi%20there");
        assert_eq!(handoff.telegram_url("hi").unwrap(), "https://t.me/lapingvino?text=hi");
    }
}
