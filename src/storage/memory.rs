//! In-memory record store.

use crate::models::{Record, RecordId};
use crate::storage::RecordStore;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory record store backed by a `RwLock<HashMap>`.
///
/// Holds nothing across restarts. Used by tests and as the store for
/// ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<RecordId, Record>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn put(&self, record: &Record) -> Result<()> {
        let mut records = self.records.write().map_err(|e| Error::Storage {
            operation: "lock_records".to_string(),
            cause: e.to_string(),
        })?;
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn get(&self, id: &RecordId) -> Result<Option<Record>> {
        let records = self.records.read().map_err(|e| Error::Storage {
            operation: "lock_records".to_string(),
            cause: e.to_string(),
        })?;
        Ok(records.get(id).cloned())
    }

    fn delete(&self, id: &RecordId) -> Result<bool> {
        let mut records = self.records.write().map_err(|e| Error::Storage {
            operation: "lock_records".to_string(),
            cause: e.to_string(),
        })?;
        Ok(records.remove(id).is_some())
    }

    fn list_ids(&self) -> Result<Vec<RecordId>> {
        let records = self.records.read().map_err(|e| Error::Storage {
            operation: "lock_records".to_string(),
            cause: e.to_string(),
        })?;
        Ok(records.keys().cloned().collect())
    }

    fn list(&self) -> Result<Vec<Record>> {
        let records = self.records.read().map_err(|e| Error::Storage {
            operation: "lock_records".to_string(),
            cause: e.to_string(),
        })?;
        Ok(records.values().cloned().collect())
    }

    fn count(&self) -> Result<usize> {
        let records = self.records.read().map_err(|e| Error::Storage {
            operation: "lock_records".to_string(),
            cause: e.to_string(),
        })?;
        Ok(records.len())
    }
}
