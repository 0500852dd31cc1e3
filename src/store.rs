// 📚 Student Record Store - the one owner of the student collection
//
// Callers get clones or borrowed slices, never a handle on the Vec itself.
// Each mutation is applied to a copy, persisted, and only then swapped in,
// so a failed write leaves both memory and storage as they were.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::db::BlobStore;
use crate::error::{LedgerError, Result};
use crate::student::{is_known_class, time_based_id, StudentDraft, StudentRecord};

/// Storage key the browser dashboard keeps its collection under.
pub const DEFAULT_STORAGE_KEY: &str = "shivsadhana_students";

pub struct StudentStore {
    backend: Box<dyn BlobStore>,
    key: String,
    records: Vec<StudentRecord>,
    /// Highest numeric id issued or loaded; new ids start above it.
    last_issued: i64,
}

impl StudentStore {
    /// Wrap a backend and load whatever is already stored under `key`.
    pub fn open(backend: Box<dyn BlobStore>, key: &str) -> Self {
        let mut store = StudentStore {
            backend,
            key: key.to_string(),
            records: Vec::new(),
            last_issued: 0,
        };
        store.load();
        store
    }

    /// Re-read the collection from storage.
    ///
    /// Fails soft: a missing slot, a corrupt blob or an unreadable backend all
    /// give an empty collection.
    pub fn load(&mut self) -> Vec<StudentRecord> {
        self.records = match self.backend.read(&self.key) {
            Ok(Some(blob)) => match decode_records(&blob) {
                Ok(records) => records,
                Err(e) => {
                    warn!(key = %self.key, error = %e, "Discarding stored students");
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!(key = %self.key, "No stored students yet");
                Vec::new()
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Could not read stored students");
                Vec::new()
            }
        };

        self.note_issued_ids();
        info!(count = self.records.len(), "Loaded students");
        self.records.clone()
    }

    /// Serialize the full collection, overwrite the storage slot, and make it
    /// the in-memory collection. Memory is untouched if the write fails.
    pub fn persist(&mut self, records: &[StudentRecord]) -> Result<()> {
        let blob = serde_json::to_string(records)?;
        self.backend.write(&self.key, &blob)?;
        debug!(key = %self.key, count = records.len(), bytes = blob.len(), "Persisted students");

        self.records = records.to_vec();
        self.note_issued_ids();
        Ok(())
    }

    pub fn add(&mut self, draft: &StudentDraft) -> Result<StudentRecord> {
        let id = time_based_id(Utc::now(), self.last_issued + 1, |candidate| {
            self.contains(candidate)
        });
        let record = StudentRecord::new(id, draft)?;
        if !is_known_class(record.class_grade()) {
            warn!(class = %record.class_grade(), "Class is not one of the standard options");
        }

        let mut next = self.records.clone();
        next.push(record.clone());
        self.commit(next)?;

        info!(id = %record.id(), class = %record.class_grade(), "Added student");
        Ok(record)
    }

    /// Full replace by id, keeping the record's position and id.
    pub fn update(&mut self, id: &str, draft: &StudentDraft) -> Result<StudentRecord> {
        let index = self.position(id)?;
        let record = StudentRecord::new(id.to_string(), draft)?;

        let mut next = self.records.clone();
        next[index] = record.clone();
        self.commit(next)?;

        info!(id = %id, due = record.due_fees(), "Updated student");
        Ok(record)
    }

    pub fn remove(&mut self, id: &str) -> Result<()> {
        let index = self.position(id)?;

        let mut next = self.records.clone();
        let removed = next.remove(index);
        self.commit(next)?;

        info!(id = %id, name = %removed.name(), "Removed student");
        Ok(())
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&StudentRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }

    fn commit(&mut self, next: Vec<StudentRecord>) -> Result<()> {
        self.persist(&next)
    }

    fn note_issued_ids(&mut self) {
        let highest = self
            .records
            .iter()
            .filter_map(|r| r.id().parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        self.last_issued = self.last_issued.max(highest);
    }
}

/// Parse a stored blob, repairing any record whose due amount went stale.
pub fn decode_records(blob: &str) -> Result<Vec<StudentRecord>> {
    let records: Vec<StudentRecord> =
        serde_json::from_str(blob).map_err(|e| LedgerError::StorageCorrupt(e.to_string()))?;

    Ok(records
        .into_iter()
        .map(|record| {
            if record.is_consistent() {
                record
            } else {
                warn!(id = %record.id(), "Recomputing stale due amount");
                record.reconciled()
            }
        })
        .collect())
}

// ============================================================================
// TESTS
// ============================================================================
