//! Matching tool: pin a prayer, collect proposals, export them
//!
//! All curation state lives in one [`CurationTool`] value. Every mutation
//! validates its input first and leaves the state untouched on error.
//!
//! ```
//! use hw_common::curation::CurationTool;
//! use hw_common::Prayer;
//!
//! let mut tool = CurationTool::new();
//! tool.pin(&Prayer::new("a", "en")).unwrap();
//! tool.propose_equivalence(&Prayer::new("b", "fr")).unwrap();
//! assert_eq!(tool.proposals().len(), 1);
//! assert_eq!(tool.compile(false).len(), 2);
//! ```

use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::prayer::Prayer;

mod compile;
pub mod export;
mod overlay;
mod proposal;

pub use export::{issue_body, Handoff, MailDraft};
pub use overlay::{DisplayProjection, Overlaid};
pub use proposal::{resolve, synthetic_code, PinnedPrayer, PrayerSnapshot, Proposal, Resolution};

/// Rejected curation actions; the message is shown to the user as-is
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurationError {
    #[error("No prayer is pinned to match against.")]
    NothingPinned,

    #[error("Cannot match a prayer with itself.")]
    SelfMatch,

    #[error("Phelps code cannot be empty.")]
    EmptyPhelps,

    #[error("Language code cannot be empty.")]
    EmptyLanguage,

    #[error("Note cannot be empty.")]
    EmptyNote,

    #[error("No items to send.")]
    NoItemsToSend,

    #[error("No items to create an issue for.")]
    NoItemsForIssue,

    #[error("No items to generate SQL for.")]
    NoItemsForSql,

    #[error("No SQL queries to run on DoltHub for these items.")]
    NoSqlStatements,

    #[error("No content to send.")]
    NoContent,
}

/// Result of a successful curation action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pinned,
    /// Something was pinned and now is not
    Unpinned,
    /// Unpin with nothing pinned
    NotPinned,
    Added(String),
    Removed,
    Cleared { unpinned: bool },
    NothingToClear,
    /// Clear requested without confirmation
    Declined,
}

impl Outcome {
    /// Confirmation text, if the action warrants one
    pub fn message(&self) -> Option<String> {
        let text = match self {
            Outcome::Pinned => "Prayer pinned.",
            Outcome::Unpinned => "Prayer unpinned.",
            Outcome::NotPinned | Outcome::Declined => return None,
            Outcome::Added(message) => return Some(message.clone()),
            Outcome::Removed => "Item removed from list.",
            Outcome::Cleared { unpinned: true } => "All items cleared and prayer unpinned.",
            Outcome::Cleared { unpinned: false } => "All collected items cleared.",
            Outcome::NothingToClear => "Nothing to clear.",
        };
        Some(text.to_string())
    }
}

/// Curation state: the pinned snapshot and the ordered proposal list
#[derive(Debug, Default)]
pub struct CurationTool {
    pinned: Option<PinnedPrayer>,
    proposals: Vec<Proposal>,
    /// Proposal positions by target version, rebuilt on every list change
    by_target: HashMap<String, Vec<usize>>,
}

impl CurationTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pinned(&self) -> Option<&PinnedPrayer> {
        self.pinned.as_ref()
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn has_pinned(&self) -> bool {
        self.pinned.is_some()
    }

    pub fn has_items(&self) -> bool {
        !self.proposals.is_empty()
    }

    pub fn is_pinned(&self, version: &str) -> bool {
        self.pinned.as_ref().is_some_and(|p| p.version == version)
    }

    /// Replace the pinned snapshot
    pub fn pin(&mut self, prayer: &Prayer) -> Result<Outcome, CurationError> {
        info!(version = %prayer.version, "Pinned prayer");
        self.pinned = Some(PinnedPrayer::snapshot(prayer));
        Ok(Outcome::Pinned)
    }

    /// Drop the pinned snapshot; proposals are kept
    pub fn unpin(&mut self) -> Result<Outcome, CurationError> {
        match self.pinned.take() {
            Some(p) => {
                info!(version = %p.version, "Unpinned prayer");
                Ok(Outcome::Unpinned)
            }
            None => Ok(Outcome::NotPinned),
        }
    }

    /// Propose that `candidate` is the same prayer as the pinned one
    pub fn propose_equivalence(&mut self, candidate: &Prayer) -> Result<Outcome, CurationError> {
        let pinned = self.pinned.as_ref().ok_or(CurationError::NothingPinned)?;
        if pinned.version == candidate.version {
            return Err(CurationError::SelfMatch);
        }
        let proposal = Proposal::equivalence(pinned, candidate);
        self.push(proposal);
        Ok(Outcome::Added("Item added to list.".to_string()))
    }

    pub fn propose_phelps(&mut self, prayer: &Prayer, code: &str) -> Result<Outcome, CurationError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(CurationError::EmptyPhelps);
        }
        self.push(Proposal::phelps(prayer, code));
        Ok(Outcome::Added(format!("Phelps code {code} suggestion added.")))
    }

    pub fn propose_language(&mut self, prayer: &Prayer, code: &str) -> Result<Outcome, CurationError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(CurationError::EmptyLanguage);
        }
        self.push(Proposal::language(prayer, code));
        Ok(Outcome::Added(format!(
            "Language change to {} suggestion added.",
            code.to_uppercase()
        )))
    }

    /// Propose a new name; an empty name proposes clearing it
    pub fn propose_name(&mut self, prayer: &Prayer, name: &str) -> Result<Outcome, CurationError> {
        let name = name.trim();
        self.push(Proposal::name(prayer, name));
        Ok(Outcome::Added(format!("Name change to \"{name}\" suggestion added.")))
    }

    pub fn propose_note(&mut self, prayer: &Prayer, note: &str) -> Result<Outcome, CurationError> {
        let note = note.trim();
        if note.is_empty() {
            return Err(CurationError::EmptyNote);
        }
        self.push(Proposal::note(prayer, note));
        Ok(Outcome::Added("Note added to items list.".to_string()))
    }

    /// Remove the proposal at `index`
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of range.
    pub fn remove_proposal(&mut self, index: usize) -> Result<Outcome, CurationError> {
        let removed = self.proposals.remove(index);
        debug!(index, kind = removed.kind(), "Removed proposal");
        self.reindex();
        Ok(Outcome::Removed)
    }

    /// Clear every proposal and unpin, once `confirmed`
    pub fn clear_all(&mut self, confirmed: bool) -> Result<Outcome, CurationError> {
        if self.proposals.is_empty() && self.pinned.is_none() {
            return Ok(Outcome::NothingToClear);
        }
        if !confirmed {
            return Ok(Outcome::Declined);
        }

        self.proposals.clear();
        self.by_target.clear();
        let unpinned = self.pinned.take().is_some();
        info!(unpinned, "Cleared curation state");
        Ok(Outcome::Cleared { unpinned })
    }

    fn push(&mut self, proposal: Proposal) {
        info!(kind = proposal.kind(), description = %proposal.description(), "Collected proposal");
        self.proposals.push(proposal);
        self.reindex();
    }

    fn reindex(&mut self) {
        self.by_target.clear();
        for (i, proposal) in self.proposals.iter().enumerate() {
            for target in proposal.targets() {
                self.by_target.entry(target.to_string()).or_default().push(i);
            }
        }
    }

    /// Proposals touching `version`, in list order
    pub(crate) fn proposals_for(&self, version: &str) -> impl Iterator<Item = &Proposal> {
        self.by_target
            .get(version)
            .into_iter()
            .flatten()
            .map(|&i| &self.proposals[i])
    }
}
