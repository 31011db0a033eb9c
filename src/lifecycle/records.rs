//! Record creation and read surface.
//!
//! Thin service the admin surface drives: create, fetch, list with a
//! lifecycle filter, and store-wide status totals. Lifecycle
//! transitions stay in [`TombstoneManager`].
//!
//! [`TombstoneManager`]: super::TombstoneManager

use crate::clock::Clock;
use crate::gc::PolicySettings;
use crate::models::{
    EmergencyReport, LocationShare, Record, RecordId, RecordKind, RecordPayload, Severity,
};
use crate::storage::RecordStore;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Lifecycle state selector for listing and export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StateFilter {
    /// Only records with no tombstone.
    #[default]
    Live,
    /// Only soft-deleted records.
    Deleted,
    /// Everything in the store.
    All,
}

/// Filter for [`RecordService::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Restrict to one record kind, or `None` for all kinds.
    pub kind: Option<RecordKind>,
    /// Lifecycle state selector.
    pub state: StateFilter,
}

impl RecordFilter {
    /// Creates a filter matching live records of every kind.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the filter to one kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: RecordKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Selects a lifecycle state.
    #[must_use]
    pub const fn with_state(mut self, state: StateFilter) -> Self {
        self.state = state;
        self
    }

    /// Whether a record passes the filter.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        if self.kind.is_some_and(|kind| kind != record.kind) {
            return false;
        }

        match self.state {
            StateFilter::Live => record.deleted_at.is_none(),
            StateFilter::Deleted => record.deleted_at.is_some(),
            StateFilter::All => true,
        }
    }
}

/// Per-kind record totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
    /// Records with no tombstone.
    pub live: usize,
    /// Soft-deleted records still inside a window.
    pub deleted: usize,
    /// Records a sweep would purge right now.
    pub purgeable: usize,
}

/// Store-wide lifecycle totals, as reported by `winder status`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatus {
    /// Total records in the store.
    pub total: usize,
    /// Totals broken down by record kind.
    pub by_kind: HashMap<RecordKind, KindCounts>,
    /// Earliest future instant at which another record becomes
    /// purgeable, if any record is still inside a window.
    pub next_purge_at: Option<u64>,
}

/// Service for creating and reading records.
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl RecordService {
    /// Creates a new record service.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        // Arc::strong_count prevents clippy::missing_const_for_fn false positive
        let _ = Arc::strong_count(&store);
        Self { store, clock }
    }

    /// Creates and persists an emergency report.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when a required field is empty.
    #[instrument(skip_all, fields(kind = "emergency-report"))]
    pub fn create_report(
        &self,
        reporter_name: &str,
        location: &str,
        description: &str,
        severity: Severity,
    ) -> Result<Record> {
        self.create(RecordPayload::EmergencyReport(EmergencyReport {
            reporter_name: reporter_name.trim().to_string(),
            location: location.trim().to_string(),
            description: description.trim().to_string(),
            severity,
        }))
    }

    /// Creates and persists a location share.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the name is empty or the
    /// coordinates fall outside their valid ranges.
    #[instrument(skip_all, fields(kind = "location-share"))]
    pub fn create_share(
        &self,
        sharer_name: &str,
        latitude: f64,
        longitude: f64,
        note: Option<String>,
    ) -> Result<Record> {
        self.create(RecordPayload::LocationShare(LocationShare {
            sharer_name: sharer_name.trim().to_string(),
            latitude,
            longitude,
            note: note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        }))
    }

    fn create(&self, payload: RecordPayload) -> Result<Record> {
        payload.validate()?;

        let record = Record::new(RecordId::generate(), self.clock.now(), payload);
        self.store.put(&record)?;

        info!(
            record_id = %record.id,
            kind = %record.kind,
            "Created record"
        );
        metrics::counter!("create_record_total", "kind" => record.kind.as_str()).increment(1);

        Ok(record)
    }

    /// Fetches one record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the id is unknown.
    pub fn get(&self, id: &RecordId) -> Result<Record> {
        self.store.get(id)?.ok_or_else(|| Error::NotFound {
            id: id.as_str().to_string(),
        })
    }

    /// Lists records passing the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the snapshot fails.
    #[instrument(skip(self))]
    pub fn list(&self, filter: &RecordFilter) -> Result<Vec<Record>> {
        let mut records: Vec<Record> = self
            .store
            .list()?
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect();

        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });

        Ok(records)
    }

    /// Computes store-wide lifecycle totals at the current instant.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the snapshot fails.
    #[instrument(skip_all)]
    pub fn status(&self, settings: &PolicySettings) -> Result<StoreStatus> {
        let now = self.clock.now();
        let mut status = StoreStatus::default();

        for record in self.store.list()? {
            status.total += 1;
            let policy = settings.effective_policy(record.kind);
            let counts = status.by_kind.entry(record.kind).or_default();

            let purgeable = match record.deleted_at {
                Some(deleted_at) => {
                    counts.deleted += 1;
                    policy.grace_elapsed(deleted_at, now)
                        || policy.retention_elapsed(record.created_at, now)
                }
                None => {
                    counts.live += 1;
                    policy.retention_elapsed(record.created_at, now)
                }
            };

            if purgeable {
                counts.purgeable += 1;
                continue;
            }

            // Next instant this record crosses a window
            let mut next = record.created_at.saturating_add(policy.retention_secs());
            if let Some(deleted_at) = record.deleted_at {
                next = next.min(deleted_at.saturating_add(policy.grace_secs()));
            }
            status.next_purge_at = Some(status.next_purge_at.map_or(next, |cur| cur.min(next)));
        }

        Ok(status)
    }
}
