//! Pending-proposal overlay for display
//!
//! Views show a record as it would look once the collected proposals were
//! applied, flagging each field that differs because of a proposal. The
//! record itself is never modified.

use serde::Serialize;

use super::proposal::{resolve, Proposal, Resolution};
use super::CurationTool;
use crate::prayer::Prayer;

/// A displayed value and whether a pending proposal produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlaid<T> {
    pub value: T,
    pub suggested: bool,
}

impl<T> Overlaid<T> {
    fn actual(value: T) -> Self {
        Self {
            value,
            suggested: false,
        }
    }

    fn suggest(&mut self, value: T) {
        self.value = value;
        self.suggested = true;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayProjection {
    pub phelps: Overlaid<Option<String>>,
    pub language: Overlaid<String>,
    pub name: Overlaid<Option<String>>,
}

impl DisplayProjection {
    pub fn any_suggested(&self) -> bool {
        self.phelps.suggested || self.language.suggested || self.name.suggested
    }
}

impl CurationTool {
    /// How `prayer` should be displayed given the pending proposals
    ///
    /// Later proposals win over earlier ones.
    pub fn overlay(&self, prayer: &Prayer) -> DisplayProjection {
        let mut view = DisplayProjection {
            phelps: Overlaid::actual(prayer.phelps.clone()),
            language: Overlaid::actual(prayer.language.clone()),
            name: Overlaid::actual(prayer.name.clone()),
        };

        for proposal in self.proposals_for(&prayer.version) {
            match proposal {
                Proposal::PhelpsAssignment { phelps, .. } => view.phelps.suggest(Some(phelps.clone())),
                Proposal::LanguageChange { language, .. } => view.language.suggest(language.clone()),
                Proposal::NameChange { name, .. } => {
                    view.name.suggest((!name.is_empty()).then(|| name.clone()))
                }
                Proposal::Equivalence {
                    pinned, candidate, ..
                } => match resolve(pinned, candidate) {
                    Resolution::ToCandidate(code) if candidate.version == prayer.version => {
                        view.phelps.suggest(Some(code))
                    }
                    Resolution::ToPinned(code) if pinned.version == prayer.version => {
                        view.phelps.suggest(Some(code))
                    }
                    Resolution::Synthetic(code) => view.phelps.suggest(Some(code)),
                    _ => {}
                },
                Proposal::Note { .. } => {}
            }
        }

        view
    }
}
