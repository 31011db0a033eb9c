//! Retention policy configuration.
//!
//! Two independent expiry rules govern every record:
//! - **Grace period**: how long after soft-delete an undo is still
//!   allowed; once elapsed the record is purgeable.
//! - **Retention period**: maximum age of any record, deleted or not.
//!
//! # Configuration
//!
//! Policy can be configured via:
//! - Environment variables: `WINDER_GRACE_HOURS` (default: 24),
//!   `WINDER_RETENTION_DAYS` (default: 30)
//! - Config file: `[policy] grace_hours = 24`
//! - Per-kind overrides: `WINDER_GRACE_REPORT_HOURS`,
//!   `WINDER_RETENTION_SHARE_DAYS`, and the `[policy.grace_hours_by_kind]`
//!   table

use crate::models::RecordKind;
use std::collections::HashMap;
use std::time::Duration;

/// Environment variable for the default grace period in hours.
pub const GRACE_HOURS_ENV: &str = "WINDER_GRACE_HOURS";

/// Environment variable for the default retention period in days.
pub const RETENTION_DAYS_ENV: &str = "WINDER_RETENTION_DAYS";

/// Default grace period in hours (restore window after soft delete).
pub const DEFAULT_GRACE_HOURS: u32 = 24;

/// Default retention period in days (maximum record age).
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_DAY: u64 = 86400;

/// The effective policy for one record kind.
///
/// Holds resolved durations; see [`PolicySettings`] for the layered
/// configuration they come from. The boundary comparisons live here so
/// the tombstone manager and the sweep planner can never disagree about
/// the instant a window closes: undo is allowed strictly before
/// `deleted_at + grace_period`, and the sweep purges from that instant
/// on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Duration after `deleted_at` before a soft-deleted record becomes
    /// eligible for purge.
    pub grace_period: Duration,
    /// Duration after `created_at` before any record becomes eligible
    /// for purge regardless of deletion state.
    pub retention_period: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(u64::from(DEFAULT_GRACE_HOURS) * SECONDS_PER_HOUR),
            retention_period: Duration::from_secs(
                u64::from(DEFAULT_RETENTION_DAYS) * SECONDS_PER_DAY,
            ),
        }
    }
}

impl RetentionPolicy {
    /// Creates a policy from explicit durations.
    #[must_use]
    pub const fn new(grace_period: Duration, retention_period: Duration) -> Self {
        Self {
            grace_period,
            retention_period,
        }
    }

    /// Returns the grace period in whole seconds.
    #[must_use]
    pub const fn grace_secs(&self) -> u64 {
        self.grace_period.as_secs()
    }

    /// Returns the retention period in whole seconds.
    #[must_use]
    pub const fn retention_secs(&self) -> u64 {
        self.retention_period.as_secs()
    }

    /// True once the grace period has elapsed for a record deleted at
    /// `deleted_at`, evaluated at `now`.
    ///
    /// Elapsed time saturates at zero, so a `deleted_at` in the future
    /// (clock skew) never counts as expired.
    #[must_use]
    pub const fn grace_elapsed(&self, deleted_at: u64, now: u64) -> bool {
        now.saturating_sub(deleted_at) >= self.grace_secs()
    }

    /// True while an undo is still permitted for a record deleted at
    /// `deleted_at`. Exact complement of [`Self::grace_elapsed`].
    #[must_use]
    pub const fn undo_allowed(&self, deleted_at: u64, now: u64) -> bool {
        !self.grace_elapsed(deleted_at, now)
    }

    /// True once the retention period has elapsed for a record created
    /// at `created_at`, evaluated at `now`.
    #[must_use]
    pub const fn retention_elapsed(&self, created_at: u64, now: u64) -> bool {
        now.saturating_sub(created_at) >= self.retention_secs()
    }

    /// Time left in the restore window for a record deleted at
    /// `deleted_at`, saturating at zero.
    #[must_use]
    pub const fn time_remaining(&self, deleted_at: u64, now: u64) -> Duration {
        let elapsed = now.saturating_sub(deleted_at);
        Duration::from_secs(self.grace_secs().saturating_sub(elapsed))
    }
}

/// Layered policy configuration.
///
/// Supports defaults, per-kind overrides, and safety floors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySettings {
    /// Default grace period in hours.
    pub default_grace_hours: u32,

    /// Per-kind grace overrides.
    ///
    /// Kinds not in this map use `default_grace_hours`.
    pub grace_hours_by_kind: HashMap<RecordKind, u32>,

    /// Minimum grace period in hours (cannot go below this).
    ///
    /// A zero grace period would make every delete instantly
    /// irreversible.
    pub minimum_grace_hours: u32,

    /// Default retention period in days.
    pub default_retention_days: u32,

    /// Per-kind retention overrides.
    pub retention_days_by_kind: HashMap<RecordKind, u32>,

    /// Minimum retention period in days (cannot go below this).
    ///
    /// Provides a safety floor to prevent accidental data loss.
    pub minimum_retention_days: u32,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            default_grace_hours: DEFAULT_GRACE_HOURS,
            grace_hours_by_kind: HashMap::new(),
            minimum_grace_hours: 1,
            default_retention_days: DEFAULT_RETENTION_DAYS,
            retention_days_by_kind: HashMap::new(),
            minimum_retention_days: 1,
        }
    }
}

impl PolicySettings {
    /// Creates policy settings with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates policy settings from environment variables.
    ///
    /// Reads:
    /// - `WINDER_GRACE_HOURS`: Default grace period
    /// - `WINDER_RETENTION_DAYS`: Default retention period
    /// - `WINDER_GRACE_MIN_HOURS` / `WINDER_RETENTION_MIN_DAYS`: Floors
    /// - `WINDER_GRACE_<KIND>_HOURS` / `WINDER_RETENTION_<KIND>_DAYS`:
    ///   Per-kind overrides (`REPORT`, `SHARE`)
    #[must_use]
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env();
        settings
    }

    /// Overlays environment variables onto existing settings.
    ///
    /// Same variables as [`Self::from_env`]; values already present
    /// (for example from a config file) survive unless the environment
    /// overrides them.
    pub fn apply_env(&mut self) {
        if let Some(h) = read_env_u32(GRACE_HOURS_ENV) {
            self.default_grace_hours = h;
        }
        if let Some(d) = read_env_u32(RETENTION_DAYS_ENV) {
            self.default_retention_days = d;
        }
        if let Some(h) = read_env_u32("WINDER_GRACE_MIN_HOURS") {
            self.minimum_grace_hours = h;
        }
        if let Some(d) = read_env_u32("WINDER_RETENTION_MIN_DAYS") {
            self.minimum_retention_days = d;
        }

        for kind in RecordKind::all().iter().copied() {
            let grace_key = format!("WINDER_GRACE_{}_HOURS", kind.env_suffix());
            if let Some(h) = read_env_u32(&grace_key) {
                self.grace_hours_by_kind.insert(kind, h);
            }

            let retention_key = format!("WINDER_RETENTION_{}_DAYS", kind.env_suffix());
            if let Some(d) = read_env_u32(&retention_key) {
                self.retention_days_by_kind.insert(kind, d);
            }
        }
    }

    /// Sets the default grace period.
    #[must_use]
    pub const fn with_grace_hours(mut self, hours: u32) -> Self {
        self.default_grace_hours = hours;
        self
    }

    /// Sets the default retention period.
    #[must_use]
    pub const fn with_retention_days(mut self, days: u32) -> Self {
        self.default_retention_days = days;
        self
    }

    /// Sets the minimum grace period.
    #[must_use]
    pub const fn with_minimum_grace_hours(mut self, hours: u32) -> Self {
        self.minimum_grace_hours = hours;
        self
    }

    /// Sets the minimum retention period.
    #[must_use]
    pub const fn with_minimum_retention_days(mut self, days: u32) -> Self {
        self.minimum_retention_days = days;
        self
    }

    /// Sets a per-kind grace override.
    #[must_use]
    pub fn with_kind_grace_hours(mut self, kind: RecordKind, hours: u32) -> Self {
        self.grace_hours_by_kind.insert(kind, hours);
        self
    }

    /// Sets a per-kind retention override.
    #[must_use]
    pub fn with_kind_retention_days(mut self, kind: RecordKind, days: u32) -> Self {
        self.retention_days_by_kind.insert(kind, days);
        self
    }

    /// Gets the effective grace period in hours for a kind.
    ///
    /// Returns the kind-specific override if set, otherwise the default.
    /// The result is clamped to be at least `minimum_grace_hours`.
    #[must_use]
    pub fn effective_grace_hours(&self, kind: RecordKind) -> u32 {
        let hours = self
            .grace_hours_by_kind
            .get(&kind)
            .copied()
            .unwrap_or(self.default_grace_hours);

        hours.max(self.minimum_grace_hours)
    }

    /// Gets the effective retention period in days for a kind.
    #[must_use]
    pub fn effective_retention_days(&self, kind: RecordKind) -> u32 {
        let days = self
            .retention_days_by_kind
            .get(&kind)
            .copied()
            .unwrap_or(self.default_retention_days);

        days.max(self.minimum_retention_days)
    }

    /// Resolves the effective policy for a kind.
    #[must_use]
    pub fn effective_policy(&self, kind: RecordKind) -> RetentionPolicy {
        RetentionPolicy::new(
            Duration::from_secs(
                u64::from(self.effective_grace_hours(kind)) * SECONDS_PER_HOUR,
            ),
            Duration::from_secs(
                u64::from(self.effective_retention_days(kind)) * SECONDS_PER_DAY,
            ),
        )
    }
}

fn read_env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
