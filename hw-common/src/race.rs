//! Timer-versus-future race
//!
//! Used by the language-name prefetch: whichever settles first wins and the
//! loser is dropped, so a late network answer has no further effect.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Result of [`with_timeout`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceOutcome<T> {
    /// The future settled before the timer
    Completed(T),
    /// The timer fired first; the future was dropped
    TimedOut,
}

impl<T> RaceOutcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            RaceOutcome::Completed(value) => Some(value),
            RaceOutcome::TimedOut => None,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, RaceOutcome::TimedOut)
    }
}

/// Race `future` against a `limit` timer
pub async fn with_timeout<F, T>(limit: Duration, label: &str, future: F) -> RaceOutcome<T>
where
    F: Future<Output = T>,
{
    tokio::select! {
        value = future => RaceOutcome::Completed(value),
        _ = tokio::time::sleep(limit) => {
            warn!("{} timed out after {:?}", label, limit);
            RaceOutcome::TimedOut
        }
    }
}
