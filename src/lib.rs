//! # Winder
//!
//! Record retention and soft-delete engine for the WINDER+ emergency
//! response platform.
//!
//! Winder owns the lifecycle of soft-deletable records (emergency reports,
//! location shares): marking them deleted, counting down a restore window,
//! undoing deletion, and sweeping expired records out of storage.
//!
//! ## Features
//!
//! - Soft delete with a 24-hour undo window (grace period)
//! - Retention sweep purging records past a 30-day maximum age
//! - Pure sweep planning decoupled from storage I/O
//! - Pluggable record stores (in-memory, JSON files, SQLite)
//! - Injected clock so every time-dependent rule is deterministic in tests
//! - Admin CLI for create / delete / restore / sweep / export
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use winder::{MemoryStore, PolicySettings, SystemClock, TombstoneManager};
//!
//! let store = Arc::new(MemoryStore::new());
//! let manager = TombstoneManager::new(store, Arc::new(SystemClock), PolicySettings::default());
//! manager.soft_delete(&record_id)?;
//! let remaining = manager.time_remaining(&record_id)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
// Cannot be moved to function level. Current duplicates: metrics exporter transitive deps.
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod clock;
pub mod config;
pub mod export;
pub mod gc;
pub mod lifecycle;
pub mod models;
pub mod observability;
pub mod storage;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::WinderConfig;
pub use export::{ExportFormat, ExportResult};
pub use gc::{
    PolicySettings, PurgeReason, RetentionPolicy, SweepDriver, SweepOutcome, SweepPlan, plan_sweep,
};
pub use lifecycle::{
    KindCounts, RecordFilter, RecordService, SoftDeleteOutcome, StateFilter, StoreStatus,
    TombstoneManager, UndoOutcome,
};
pub use models::{
    EmergencyReport, LocationShare, Record, RecordId, RecordKind, RecordPayload, Severity,
    SoftDeletable,
};
pub use storage::{FilesystemStore, MemoryStore, RecordStore, SqliteStore};

/// Error type for winder operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `NotFound` | Operation references a record id absent from the store (purged or never existed) |
/// | `GracePeriodExpired` | `undo_delete` called at or after the restore window closed |
/// | `NotDeleted` | `time_remaining` called on a live record |
/// | `InvalidInput` | Empty required fields, out-of-range coordinates, malformed ids or formats |
/// | `Storage` | A store or I/O operation fails (file read/write, SQLite query, subscriber setup) |
#[derive(Debug, ThisError)]
pub enum Error {
    /// The referenced record does not exist in the store.
    ///
    /// Raised when:
    /// - The record was already purged by a sweep
    /// - The record never existed (stale id from the caller)
    ///
    /// Never retried: absence is a fact a retry cannot change. Delete
    /// callers treat this as success-by-absence.
    #[error("record '{id}' not found")]
    NotFound {
        /// The record id that could not be resolved.
        id: String,
    },

    /// `undo_delete` was called after the restore window closed.
    ///
    /// Surfaced distinctly from `NotFound`: a caller racing the sweep
    /// gets an accurate "too late" rather than "already gone".
    #[error("restore window expired for record '{id}': deleted at {deleted_at}, grace {grace_secs}s")]
    GracePeriodExpired {
        /// The record id whose window closed.
        id: String,
        /// Unix timestamp (seconds) the record was soft-deleted.
        deleted_at: u64,
        /// The configured grace period in seconds.
        grace_secs: u64,
    },

    /// `time_remaining` was called on a record that is not soft-deleted.
    ///
    /// Not a user-visible failure: it means no countdown should render.
    #[error("record '{id}' is not deleted")]
    NotDeleted {
        /// The live record's id.
        id: String,
    },

    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - Required creation fields are empty (reporter name, description)
    /// - Location share coordinates are out of range
    /// - A record kind, export format, or id string fails to parse
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A storage or I/O operation failed.
    ///
    /// Raised when:
    /// - Filesystem I/O errors occur (read, write, remove)
    /// - `SQLite` statements fail
    /// - A stored document fails to deserialize
    /// - Log file or metrics exporter setup fails
    ///
    /// Propagated unchanged through the lifecycle layer; retry policy
    /// belongs to the caller.
    #[error("operation '{operation}' failed: {cause}")]
    Storage {
        /// The store operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for winder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Centralized so wall-clock reads happen in exactly one place; the
/// lifecycle layer never calls this directly and goes through an
/// injected [`Clock`] instead. Falls back to 0 if the system clock is
/// before the Unix epoch.
///
/// # Examples
///
/// ```rust
/// use winder::current_timestamp;
///
/// let ts = current_timestamp();
/// assert!(ts > 0); // Should be a reasonable Unix timestamp
/// ```
#[must_use]
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
