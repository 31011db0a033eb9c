//! Record type and identifier.

use crate::models::{RecordKind, RecordPayload, SoftDeletable};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a record ID from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random record ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A soft-deletable record.
///
/// `deleted_at` is the only field the lifecycle mutates. `kind` always
/// matches the payload variant; construct records through
/// [`Record::new`] to keep them in step.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Unique identifier, assigned at creation.
    pub id: RecordId,
    /// The domain type of this record.
    pub kind: RecordKind,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: u64,
    /// Soft-delete timestamp (Unix epoch seconds); `None` means live.
    pub deleted_at: Option<u64>,
    /// Domain data, opaque to the lifecycle.
    pub payload: RecordPayload,
}

impl Record {
    /// Creates a live record, deriving `kind` from the payload.
    #[must_use]
    pub fn new(id: RecordId, created_at: u64, payload: RecordPayload) -> Self {
        Self {
            id,
            kind: payload.kind(),
            created_at,
            deleted_at: None,
            payload,
        }
    }

    /// Returns true if the record is currently soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl SoftDeletable for Record {
    fn record_id(&self) -> &RecordId {
        &self.id
    }

    fn kind(&self) -> RecordKind {
        self.kind
    }

    fn created_at(&self) -> u64 {
        self.created_at
    }

    fn deleted_at(&self) -> Option<u64> {
        self.deleted_at
    }

    fn set_deleted_at(&mut self, deleted_at: Option<u64>) {
        self.deleted_at = deleted_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmergencyReport, Severity};

    fn test_payload() -> RecordPayload {
        RecordPayload::EmergencyReport(EmergencyReport {
            reporter_name: "Dana Cruz".to_string(),
            location: "5th and Main".to_string(),
            description: "Street flooding".to_string(),
            severity: Severity::High,
        })
    }

    #[test]
    fn test_new_record_is_live() {
        let record = Record::new(RecordId::generate(), 1_700_000_000, test_payload());
        assert!(!record.is_deleted());
        assert_eq!(record.kind, RecordKind::EmergencyReport);
        assert_eq!(record.deleted_at, None);
    }

    #[test]
    fn test_soft_deletable_accessors() {
        let mut record = Record::new(RecordId::new("r1"), 100, test_payload());
        assert_eq!(SoftDeletable::created_at(&record), 100);
        record.set_deleted_at(Some(200));
        assert!(record.is_deleted());
        assert_eq!(SoftDeletable::deleted_at(&record), Some(200));
        record.set_deleted_at(None);
        assert!(!record.is_deleted());
    }
}
