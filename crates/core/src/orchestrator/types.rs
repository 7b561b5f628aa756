//! Types for the monitor orchestrator.

use thiserror::Error;

use crate::monitor::{MonitorKind, MonitorRecord};
use crate::searcher::TorrentCandidate;

/// Errors that can occur during orchestration.
///
/// Lookup failures never show up here; only store failures abort a run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Monitor store error.
    #[error("monitor store error: {0}")]
    Store(#[from] crate::store::StoreError),

    /// The blocking task running a store call panicked or was cancelled.
    #[error("monitor store task failed: {0}")]
    StoreTask(#[from] tokio::task::JoinError),
}

/// A candidate found by one monitor during a round.
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    /// What was found.
    pub candidate: TorrentCandidate,
    /// The record as it was when the lookup ran. For a series this names
    /// the episode that was found, not the one looked for next.
    pub record: MonitorRecord,
}

impl JobResult {
    pub fn kind(&self) -> MonitorKind {
        self.record.monitor.kind()
    }
}
