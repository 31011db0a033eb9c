//! Record store trait.

use crate::Result;
use crate::models::{Record, RecordId};

/// Trait for record store adapters.
///
/// Stores are the authoritative source of truth for records. `put`
/// replaces the whole record (last write wins); conflict resolution
/// between concurrent writers is not provided here.
pub trait RecordStore: Send + Sync {
    /// Stores a record, replacing any existing record with the same id.
    fn put(&self, record: &Record) -> Result<()>;

    /// Retrieves a record by ID.
    fn get(&self, id: &RecordId) -> Result<Option<Record>>;

    /// Deletes a record by ID. Returns false if it was already absent.
    fn delete(&self, id: &RecordId) -> Result<bool>;

    /// Lists all record IDs.
    fn list_ids(&self) -> Result<Vec<RecordId>>;

    /// Lists all records.
    fn list(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        for id in self.list_ids()? {
            if let Some(record) = self.get(&id)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Checks if a record exists.
    fn exists(&self, id: &RecordId) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// Returns the total count of records.
    fn count(&self) -> Result<usize> {
        Ok(self.list_ids()?.len())
    }
}
