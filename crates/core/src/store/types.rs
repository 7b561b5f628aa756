//! Monitor storage trait and types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::monitor::{MonitorRecord, OwnerId};

/// Error type for monitor store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document could not be read.
    #[error("failed to read monitor document {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document could not be written.
    #[error("failed to write monitor document {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document is not a valid JSON monitor list.
    #[error("monitor document {} is corrupted: {source}", path.display())]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A record carries a kind discriminator this build does not know.
    #[error("unknown monitor kind: {kind:?}")]
    UnknownMonitorKind { kind: String },

    /// A record is missing fields its kind requires.
    #[error("invalid monitor record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    /// A record with this id is already stored.
    #[error("monitor already exists: {0}")]
    DuplicateId(String),

    /// The in-memory set could not be encoded.
    #[error("failed to encode monitor document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A mutation applied by the orchestrator after a round.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreChange {
    /// Replace the stored record with the same id.
    Update(MonitorRecord),
    /// Delete the record with this id.
    Remove(String),
}

/// Trait for monitor storage backends.
///
/// The store owns both the durable document and its in-memory mirror.
pub trait MonitorStore: Send + Sync {
    /// Replace the in-memory set with the durable one.
    fn load(&self) -> Result<(), StoreError>;

    /// Overwrite the durable set with the in-memory one.
    fn save(&self) -> Result<(), StoreError>;

    /// Add a record, then save.
    fn add(&self, record: MonitorRecord) -> Result<(), StoreError>;

    /// Remove a record by id, then save. Returns the removed record if found.
    fn remove(&self, id: &str) -> Result<Option<MonitorRecord>, StoreError>;

    /// Apply a batch of changes, then save once.
    fn apply(&self, changes: Vec<StoreChange>) -> Result<(), StoreError>;

    /// Reload, then return every record.
    fn all(&self) -> Result<Vec<MonitorRecord>, StoreError>;

    /// Reload, then return the records owned by `owner_id`.
    fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<MonitorRecord>, StoreError>;

    /// Look a record up by id in the in-memory set.
    fn find_by_id(&self, id: &str) -> Option<MonitorRecord>;
}
