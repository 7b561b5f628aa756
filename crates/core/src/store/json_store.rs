//! JSON file backed monitor store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::monitor::{MonitorRecord, OwnerId};

use super::document::RecordDocument;
use super::{MonitorStore, StoreChange, StoreError};

/// Monitor store persisted as a single JSON array.
///
/// Every mutation rewrites the whole document. There is no cross-process
/// lock: when two processes save, the last write wins.
pub struct JsonMonitorStore {
    path: PathBuf,
    records: Mutex<Vec<MonitorRecord>>,
}

impl JsonMonitorStore {
    /// Open the store at `path`, creating an empty document if none exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            records: Mutex::new(Vec::new()),
        };
        store.load()?;
        Ok(store)
    }

    /// Location of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn records(&self) -> MutexGuard<'_, Vec<MonitorRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn create_empty(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        fs::write(&self.path, "[]").map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "Created empty monitor document");
        Ok(())
    }

    /// Read and decode the document. The flag is true when ids were generated.
    fn read_document(&self) -> Result<(Vec<MonitorRecord>, bool), StoreError> {
        if !self.path.exists() {
            self.create_empty()?;
            return Ok((Vec::new(), false));
        }

        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        let documents: Vec<RecordDocument> =
            serde_json::from_str(&content).map_err(|source| StoreError::Corrupted {
                path: self.path.clone(),
                source,
            })?;

        let mut any_generated = false;
        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            let (record, generated) = document.into_record()?;
            any_generated |= generated;
            records.push(record);
        }

        Ok((records, any_generated))
    }

    /// Write the given records, replacing the document atomically.
    fn write_document(&self, records: &[MonitorRecord]) -> Result<(), StoreError> {
        let documents: Vec<RecordDocument> = records.iter().map(RecordDocument::from).collect();
        let json = serde_json::to_string_pretty(&documents).map_err(StoreError::Encode)?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), records = records.len(), "Saved monitor document");
        Ok(())
    }
}

impl MonitorStore for JsonMonitorStore {
    fn load(&self) -> Result<(), StoreError> {
        let mut records = self.records();
        let (loaded, generated_ids) = self.read_document()?;
        *records = loaded;

        if generated_ids {
            info!(path = %self.path.display(), "Assigned ids to monitors without one");
            self.write_document(&records)?;
        }
        Ok(())
    }

    fn save(&self) -> Result<(), StoreError> {
        let records = self.records();
        self.write_document(&records)
    }

    fn add(&self, record: MonitorRecord) -> Result<(), StoreError> {
        let mut records = self.records();
        if records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }
        info!(monitor_id = %record.id, owner_id = record.owner_id, monitor = %record.monitor, "Adding monitor");
        records.push(record);
        self.write_document(&records)
    }

    fn remove(&self, id: &str) -> Result<Option<MonitorRecord>, StoreError> {
        let mut records = self.records();
        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let removed = records.remove(pos);
        info!(monitor_id = %id, monitor = %removed.monitor, "Removed monitor");
        self.write_document(&records)?;
        Ok(Some(removed))
    }

    fn apply(&self, changes: Vec<StoreChange>) -> Result<(), StoreError> {
        let mut records = self.records();
        for change in changes {
            match change {
                StoreChange::Update(record) => {
                    match records.iter_mut().find(|r| r.id == record.id) {
                        Some(slot) => *slot = record,
                        None => warn!(monitor_id = %record.id, "Monitor vanished before update"),
                    }
                }
                StoreChange::Remove(id) => {
                    let before = records.len();
                    records.retain(|r| r.id != id);
                    if records.len() == before {
                        warn!(monitor_id = %id, "Monitor vanished before removal");
                    }
                }
            }
        }
        self.write_document(&records)
    }

    fn all(&self) -> Result<Vec<MonitorRecord>, StoreError> {
        self.load()?;
        Ok(self.records().clone())
    }

    fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<MonitorRecord>, StoreError> {
        self.load()?;
        Ok(self
            .records()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: &str) -> Option<MonitorRecord> {
        self.records().iter().find(|r| r.id == id).cloned()
    }
}
