//! Tombstone operations for soft-delete lifecycle.

use crate::clock::Clock;
use crate::gc::PolicySettings;
use crate::models::{Record, RecordId, SoftDeletable};
use crate::storage::RecordStore;
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Result of a [`TombstoneManager::soft_delete`] call.
///
/// Both variants carry the deletion instant so callers can render an
/// accurate countdown either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftDeleteOutcome {
    /// The record was live and is now soft-deleted at this instant.
    Deleted {
        /// Instant the tombstone was written.
        deleted_at: u64,
    },
    /// The record was already soft-deleted; its timestamp is unchanged.
    AlreadyDeleted {
        /// The original deletion instant, left untouched.
        deleted_at: u64,
    },
}

impl SoftDeleteOutcome {
    /// The deletion instant governing the record's restore window.
    #[must_use]
    pub const fn deleted_at(&self) -> u64 {
        match self {
            Self::Deleted { deleted_at } | Self::AlreadyDeleted { deleted_at } => *deleted_at,
        }
    }
}

/// Result of a [`TombstoneManager::undo_delete`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The record was soft-deleted and is live again.
    Restored,
    /// The record was never deleted; nothing to restore.
    AlreadyLive,
}

/// Service enforcing the soft-delete, undo and expiry rules.
///
/// The manager owns no record state: the store owns the records and
/// the manager owns only the transition rules. Every operation is one
/// read-modify-write against the store, evaluated at the injected
/// clock's current instant.
pub struct TombstoneManager {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    settings: PolicySettings,
}

impl TombstoneManager {
    /// Creates a new tombstone manager.
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        settings: PolicySettings,
    ) -> Self {
        // Arc::strong_count prevents clippy::missing_const_for_fn false positive
        let _ = Arc::strong_count(&store);
        Self {
            store,
            clock,
            settings,
        }
    }

    /// Returns the policy settings the manager resolves windows from.
    #[must_use]
    pub const fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    fn fetch(&self, id: &RecordId) -> Result<Record> {
        self.store.get(id)?.ok_or_else(|| Error::NotFound {
            id: id.as_str().to_string(),
        })
    }

    /// Soft-deletes a record.
    ///
    /// Sets `deleted_at` to the current instant and persists. Calling
    /// it on an already-deleted record succeeds without touching the
    /// timestamp, so repeated delete calls cannot extend a record's
    /// restore window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has this id.
    #[instrument(skip(self), fields(record_id = %id.as_str()))]
    pub fn soft_delete(&self, id: &RecordId) -> Result<SoftDeleteOutcome> {
        let mut record = self.fetch(id)?;

        if let Some(deleted_at) = record.deleted_at() {
            // Grace clock keeps its original start.
            return Ok(SoftDeleteOutcome::AlreadyDeleted { deleted_at });
        }

        let now = self.clock.now();
        record.set_deleted_at(Some(now));
        self.store.put(&record)?;

        info!(
            record_id = %id.as_str(),
            deleted_at = now,
            "Soft-deleted record"
        );
        metrics::counter!("soft_delete_record_total").increment(1);

        Ok(SoftDeleteOutcome::Deleted { deleted_at: now })
    }

    /// Restores a soft-deleted record.
    ///
    /// Allowed strictly while the grace period has time remaining;
    /// after a successful restore the record is identical to its
    /// never-deleted self. Undo on a live record is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has this id, or
    /// [`Error::GracePeriodExpired`] once the window has closed. The
    /// two stay distinct: a caller racing the sweep may find the record
    /// already purged (`NotFound`) or still present but past its window
    /// (`GracePeriodExpired`), and each deserves an accurate message.
    #[instrument(skip(self), fields(record_id = %id.as_str()))]
    pub fn undo_delete(&self, id: &RecordId) -> Result<UndoOutcome> {
        let mut record = self.fetch(id)?;

        let Some(deleted_at) = record.deleted_at() else {
            return Ok(UndoOutcome::AlreadyLive);
        };

        let policy = self.settings.effective_policy(record.kind);
        let now = self.clock.now();
        if !policy.undo_allowed(deleted_at, now) {
            return Err(Error::GracePeriodExpired {
                id: id.as_str().to_string(),
                deleted_at,
                grace_secs: policy.grace_secs(),
            });
        }

        record.set_deleted_at(None);
        self.store.put(&record)?;

        info!(record_id = %id.as_str(), "Restored record");
        metrics::counter!("undo_delete_record_total").increment(1);

        Ok(UndoOutcome::Restored)
    }

    /// Time left in a soft-deleted record's restore window.
    ///
    /// Returns the window remainder, saturating at zero once the
    /// window has closed. Used to render "will be removed in N hours".
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotDeleted`] for a live record (no countdown to
    /// show) or [`Error::NotFound`] if the id is unknown.
    #[instrument(skip(self), fields(record_id = %id.as_str()))]
    pub fn time_remaining(&self, id: &RecordId) -> Result<Duration> {
        let record = self.fetch(id)?;

        let Some(deleted_at) = record.deleted_at() else {
            return Err(Error::NotDeleted {
                id: id.as_str().to_string(),
            });
        };

        let policy = self.settings.effective_policy(record.kind);
        Ok(policy.time_remaining(deleted_at, self.clock.now()))
    }
}
