//! The soft-delete lifecycle contract.

use crate::models::{RecordId, RecordKind};

/// A record that participates in the soft-delete lifecycle.
///
/// The tombstone manager and sweep planner are written against this
/// trait, so one implementation of the transition rules covers every
/// record kind. Payload fields stay invisible behind it.
pub trait SoftDeletable {
    /// The record's unique identifier.
    fn record_id(&self) -> &RecordId;

    /// The record's kind, used to select per-kind policy overrides.
    fn kind(&self) -> RecordKind;

    /// Creation timestamp (Unix epoch seconds). Immutable.
    fn created_at(&self) -> u64;

    /// Soft-delete timestamp; `None` means live.
    fn deleted_at(&self) -> Option<u64>;

    /// Sets or clears the soft-delete timestamp.
    fn set_deleted_at(&mut self, deleted_at: Option<u64>);

    /// Returns true if the record is currently soft-deleted.
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}
