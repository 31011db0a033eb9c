//! Retention sweep module.
//!
//! This module decides which records have outlived their windows and
//! purges them: soft-deleted records whose grace period has elapsed,
//! and records of any state whose total age has exceeded the retention
//! period.
//!
//! # Overview
//!
//! Planning and execution are split. [`plan_sweep`] is a pure function
//! over a snapshot of records and an explicit instant, so expiry logic
//! can be tested without storage or a real clock. [`SweepDriver`] wraps
//! it with the store and clock and executes the resulting plan.
//!
//! # Example
//!
//! ```rust,ignore
//! use winder::gc::{PolicySettings, SweepDriver};
//! use winder::{SqliteStore, SystemClock};
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteStore::new("records.db")?);
//! let driver = SweepDriver::new(store, Arc::new(SystemClock), PolicySettings::from_env());
//!
//! // Dry run to see what would be purged
//! let outcome = driver.run(true)?;
//! println!("{}", outcome.summary());
//!
//! // Actually purge
//! let outcome = driver.run(false)?;
//! println!("Purged {} records", outcome.records_purged);
//! ```
//!
//! # Policy
//!
//! Expiry windows come from [`PolicySettings`]: a default grace period
//! of 24 hours and retention period of 30 days, overridable globally or
//! per record kind via environment variables or the config file.

mod driver;
mod policy;
mod sweep;

pub use driver::{SweepDriver, SweepOutcome};
pub use policy::{
    DEFAULT_GRACE_HOURS, DEFAULT_RETENTION_DAYS, GRACE_HOURS_ENV, PolicySettings, RETENTION_DAYS_ENV,
    RetentionPolicy,
};
pub use sweep::{PlannedPurge, PurgeReason, SweepPlan, plan_sweep};
