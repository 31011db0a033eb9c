//! Filesystem-based record store.
//!
//! Stores each record as an individual JSON document. Useful for small
//! deployments and for inspecting records with ordinary shell tools.
//!
//! # Security
//!
//! - **Path traversal**: record IDs are validated before being used as
//!   filenames
//! - **File size limits**: a maximum file size is enforced on read

use crate::models::{Record, RecordId, RecordKind, RecordPayload};
use crate::storage::RecordStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum file size for record files (1MB).
/// Prevents memory exhaustion from maliciously large files.
const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Serializable record format for filesystem storage.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    id: String,
    kind: String,
    created_at: u64,
    #[serde(default)]
    deleted_at: Option<u64>,
    payload: RecordPayload,
}

impl From<&Record> for StoredRecord {
    fn from(r: &Record) -> Self {
        Self {
            id: r.id.as_str().to_string(),
            kind: r.kind.as_str().to_string(),
            created_at: r.created_at,
            deleted_at: r.deleted_at,
            payload: r.payload.clone(),
        }
    }
}

impl StoredRecord {
    fn into_record(self) -> Record {
        // The payload tag is authoritative if the kind column disagrees
        let kind = RecordKind::parse(&self.kind).unwrap_or(self.payload.kind());
        Record {
            id: RecordId::new(self.id),
            kind,
            created_at: self.created_at,
            deleted_at: self.deleted_at,
            payload: self.payload,
        }
    }
}

/// Filesystem-based record store.
pub struct FilesystemStore {
    /// Base directory for storage.
    base_path: PathBuf,
}

impl FilesystemStore {
    /// Creates a new filesystem store.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let path = base_path.into();

        // Try to create directory, ignore errors for now
        let _ = fs::create_dir_all(&path);

        Self { base_path: path }
    }

    /// Creates a new filesystem store with checked directory creation.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_create(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).map_err(|e| Error::Storage {
            operation: "create_storage_dir".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self { base_path })
    }

    /// Returns the path for a record file.
    ///
    /// # Security
    ///
    /// The record ID is sanitized to prevent path traversal attacks.
    /// Only alphanumeric characters, dashes, and underscores are allowed.
    fn record_path(&self, id: &RecordId) -> Result<PathBuf> {
        let id_str = id.as_str();

        if !Self::is_safe_filename(id_str) {
            return Err(Error::InvalidInput(format!(
                "record ID contains invalid characters: {id_str}",
            )));
        }

        let path = self.base_path.join(format!("{id_str}.json"));

        // Double-check: ensure the resulting path is under base_path.
        // Non-canonical comparison is fine here: the ID validation above
        // already rejects ".." and separators, and the file may not
        // exist yet for put operations.
        if !path.starts_with(&self.base_path) {
            return Err(Error::InvalidInput(format!(
                "path traversal attempt detected for ID: {id_str}",
            )));
        }

        Ok(path)
    }

    /// Checks if a filename is safe (no path traversal).
    fn is_safe_filename(name: &str) -> bool {
        // Only allow alphanumeric, dash, underscore
        // Reject: .. / \ NUL and other special chars
        !name.is_empty()
            && name.len() <= 255
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    }

    /// Returns the base path.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl RecordStore for FilesystemStore {
    fn put(&self, record: &Record) -> Result<()> {
        // Ensure directory exists before storing
        let _ = fs::create_dir_all(&self.base_path);

        let path = self.record_path(&record.id)?;
        let stored = StoredRecord::from(record);

        let json = serde_json::to_string_pretty(&stored).map_err(|e| Error::Storage {
            operation: "serialize_record".to_string(),
            cause: e.to_string(),
        })?;

        fs::write(&path, json).map_err(|e| Error::Storage {
            operation: "write_record_file".to_string(),
            cause: e.to_string(),
        })?;

        Ok(())
    }

    fn get(&self, id: &RecordId) -> Result<Option<Record>> {
        let Ok(path) = self.record_path(id) else {
            return Ok(None); // Invalid ID means no record
        };

        if !path.exists() {
            return Ok(None);
        }

        // Validate file size before reading to prevent memory exhaustion
        let metadata = fs::metadata(&path).map_err(|e| Error::Storage {
            operation: "read_file_metadata".to_string(),
            cause: e.to_string(),
        })?;

        if metadata.len() > MAX_FILE_SIZE {
            return Err(Error::InvalidInput(format!(
                "record file exceeds maximum size of {MAX_FILE_SIZE} bytes: {}",
                path.display()
            )));
        }

        let json = fs::read_to_string(&path).map_err(|e| Error::Storage {
            operation: "read_record_file".to_string(),
            cause: e.to_string(),
        })?;

        let stored: StoredRecord = serde_json::from_str(&json).map_err(|e| Error::Storage {
            operation: "deserialize_record".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Some(stored.into_record()))
    }

    fn delete(&self, id: &RecordId) -> Result<bool> {
        let Ok(path) = self.record_path(id) else {
            return Ok(false); // Invalid ID means nothing to delete
        };

        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path).map_err(|e| Error::Storage {
            operation: "delete_record_file".to_string(),
            cause: e.to_string(),
        })?;

        Ok(true)
    }

    fn list_ids(&self) -> Result<Vec<RecordId>> {
        let mut ids = Vec::new();

        // If directory doesn't exist, return empty list
        if !self.base_path.exists() {
            return Ok(ids);
        }

        let entries = fs::read_dir(&self.base_path).map_err(|e| Error::Storage {
            operation: "read_storage_dir".to_string(),
            cause: e.to_string(),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| Error::Storage {
                operation: "read_dir_entry".to_string(),
                cause: e.to_string(),
            })?;

            if let Some(id) = extract_record_id_from_path(&entry.path()) {
                ids.push(id);
            }
        }

        Ok(ids)
    }
}

/// Extracts a record ID from a JSON file path.
fn extract_record_id_from_path(path: &Path) -> Option<RecordId> {
    if path.extension().is_none_or(|ext| ext != "json") {
        return None;
    }

    let stem = path.file_stem()?;
    let id_str = stem.to_str()?;

    Some(RecordId::new(id_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmergencyReport, LocationShare, Severity};
    use tempfile::TempDir;

    fn create_test_record(id: &str) -> Record {
        Record::new(
            RecordId::new(id),
            1_700_000_000,
            RecordPayload::EmergencyReport(EmergencyReport {
                reporter_name: "Dana Cruz".to_string(),
                location: "5th and Main".to_string(),
                description: "Street flooding".to_string(),
                severity: Severity::High,
            }),
        )
    }

    #[test]
    fn test_put_and_get() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        let record = create_test_record("test_id");
        store.put(&record).unwrap();

        let retrieved = store.get(&RecordId::new("test_id")).unwrap();
        assert_eq!(retrieved, Some(record));
    }

    #[test]
    fn test_get_nonexistent() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        let result = store.get(&RecordId::new("nonexistent")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_delete() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        let record = create_test_record("to_delete");
        store.put(&record).unwrap();

        assert!(store.delete(&RecordId::new("to_delete")).unwrap());
        assert!(store.get(&RecordId::new("to_delete")).unwrap().is_none());
    }

    #[test]
    fn test_delete_nonexistent() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        assert!(!store.delete(&RecordId::new("nonexistent")).unwrap());
    }

    #[test]
    fn test_deserialize_without_deleted_at() {
        let json = r#"{
            "id": "legacy-id",
            "kind": "location-share",
            "created_at": 123,
            "payload": {
                "type": "location-share",
                "sharer_name": "Ari",
                "latitude": 29.95,
                "longitude": -90.07
            }
        }"#;

        let stored: StoredRecord = serde_json::from_str(json).unwrap();
        let record = stored.into_record();
        assert!(record.deleted_at.is_none());
        assert_eq!(record.kind, RecordKind::LocationShare);
    }

    #[test]
    fn test_list_ids() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        store.put(&create_test_record("id1")).unwrap();
        store.put(&create_test_record("id2")).unwrap();
        store.put(&create_test_record("id3")).unwrap();

        let ids = store.list_ids().unwrap();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_count() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        assert_eq!(store.count().unwrap(), 0);

        store.put(&create_test_record("id1")).unwrap();
        store.put(&create_test_record("id2")).unwrap();

        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_exists() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        store.put(&create_test_record("exists")).unwrap();

        assert!(store.exists(&RecordId::new("exists")).unwrap());
        assert!(!store.exists(&RecordId::new("not_exists")).unwrap());
    }

    #[test]
    fn test_path_traversal_protection() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        let result = store.record_path(&RecordId::new("../../../etc/passwd"));
        assert!(result.is_err());

        let result = store.record_path(&RecordId::new("dir/subdir/file"));
        assert!(result.is_err());

        let result = store.record_path(&RecordId::new("dir\\subdir\\file"));
        assert!(result.is_err());
    }

    #[test]
    fn test_safe_filename_validation() {
        // Valid filenames (UUIDs fall in this set)
        assert!(FilesystemStore::is_safe_filename("valid_id"));
        assert!(FilesystemStore::is_safe_filename(
            "550e8400-e29b-41d4-a716-446655440000"
        ));
        assert!(FilesystemStore::is_safe_filename("abc123"));
        assert!(FilesystemStore::is_safe_filename("UPPERCASE"));

        // Invalid filenames
        assert!(!FilesystemStore::is_safe_filename(""));
        assert!(!FilesystemStore::is_safe_filename("../path"));
        assert!(!FilesystemStore::is_safe_filename("path/to/file"));
        assert!(!FilesystemStore::is_safe_filename("path\\to\\file"));
        assert!(!FilesystemStore::is_safe_filename("file.json"));
        assert!(!FilesystemStore::is_safe_filename("file with space"));
    }

    #[test]
    fn test_with_create_success() {
        let dir = TempDir::new().unwrap();
        let subdir = dir.path().join("subdir");

        let store = FilesystemStore::with_create(&subdir);
        assert!(store.is_ok());
        assert!(subdir.exists());
    }

    #[test]
    fn test_base_path_accessor() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        assert_eq!(store.base_path(), dir.path());
    }

    #[test]
    fn test_round_trip_both_kinds() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        let report = create_test_record("report1");
        let mut share = Record::new(
            RecordId::new("share1"),
            1_700_000_050,
            RecordPayload::LocationShare(LocationShare {
                sharer_name: "Ari".to_string(),
                latitude: 29.95,
                longitude: -90.07,
                note: Some("on the roof".to_string()),
            }),
        );
        share.deleted_at = Some(1_700_000_400);

        store.put(&report).unwrap();
        store.put(&share).unwrap();

        assert_eq!(store.get(&report.id).unwrap(), Some(report));
        assert_eq!(store.get(&share.id).unwrap(), Some(share));
    }
}
