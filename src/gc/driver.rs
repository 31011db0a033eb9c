//! Sweep driver.
//!
//! [`SweepDriver`] wires the pure [`plan_sweep`] planner to a record
//! store and a clock: it snapshots the store, plans, then executes the
//! purges. Purging is at-least-once; a record that vanished between
//! snapshot and purge counts as missing, not as a failure, and a
//! failed purge is retried naturally by the next sweep.

use super::{plan_sweep, PlannedPurge, PolicySettings};
use crate::clock::Clock;
use crate::storage::RecordStore;
use crate::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Poll interval for the watch loop's shutdown flag.
const WATCH_TICK: Duration = Duration::from_millis(200);

/// Result of one sweep pass.
#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    /// Total number of records examined.
    pub records_checked: usize,

    /// Number of records that were (or would be) purged.
    pub records_purged: usize,

    /// Number of planned purges whose record was already gone.
    pub records_missing: usize,

    /// Number of planned purges that failed at the store.
    pub records_failed: usize,

    /// Number of records left untouched.
    pub records_kept: usize,

    /// Purge counts by record kind.
    pub by_kind: HashMap<String, usize>,

    /// Purge counts by purge reason.
    pub by_reason: HashMap<String, usize>,

    /// Whether this was a dry run (no actual changes made).
    pub dry_run: bool,

    /// Duration of the sweep pass in milliseconds.
    pub duration_ms: u64,
}

impl SweepOutcome {
    /// Returns `true` if any records were (or would be) purged.
    #[must_use]
    pub const fn has_purges(&self) -> bool {
        self.records_purged > 0
    }

    /// Returns a human-readable summary of the sweep pass.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.records_purged == 0 {
            let mut line = format!(
                "No expired records found ({} records checked in {}ms)",
                self.records_checked, self.duration_ms
            );
            if self.records_failed > 0 {
                line.push_str(&format!(", {} purge(s) failed", self.records_failed));
            }
            return line;
        }

        let action = if self.dry_run { "Would purge" } else { "Purged" };

        let mut reasons: Vec<String> = self
            .by_reason
            .iter()
            .map(|(reason, count)| format!("{reason}: {count}"))
            .collect();
        reasons.sort();

        let mut line = format!(
            "{} {} expired record(s) ({}) - checked {} in {}ms",
            action,
            self.records_purged,
            reasons.join(", "),
            self.records_checked,
            self.duration_ms
        );
        if self.records_failed > 0 {
            line.push_str(&format!(", {} purge(s) failed", self.records_failed));
        }
        line
    }

    fn count_purge(&mut self, purge: &PlannedPurge) {
        self.records_purged += 1;
        *self
            .by_kind
            .entry(purge.kind.as_str().to_string())
            .or_insert(0) += 1;
        *self
            .by_reason
            .entry(purge.reason.as_str().to_string())
            .or_insert(0) += 1;
    }
}

/// Service that runs retention sweeps against a record store.
///
/// # Thread Safety
///
/// The driver holds `Arc` references to the store and clock, making it
/// safe to share across threads.
pub struct SweepDriver {
    /// Store the sweep snapshots and purges from.
    store: Arc<dyn RecordStore>,

    /// Clock supplying the evaluation instant.
    clock: Arc<dyn Clock>,

    /// Policy the planner resolves per-kind windows from.
    settings: PolicySettings,
}

impl SweepDriver {
    /// Creates a new sweep driver.
    ///
    /// # Arguments
    ///
    /// * `store` - Shared reference to the record store.
    /// * `clock` - Clock used to evaluate expiry windows.
    /// * `settings` - Policy configuration.
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

    /// Returns the current policy settings.
    #[must_use]
    pub const fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    /// Performs one sweep pass.
    ///
    /// This method:
    /// 1. Snapshots all records from the store
    /// 2. Plans purges with [`plan_sweep`] at the clock's current instant
    /// 3. Executes the purges (unless `dry_run`)
    ///
    /// # Arguments
    ///
    /// * `dry_run` - If true, only report what would be done without
    ///   making changes
    ///
    /// # Returns
    ///
    /// A `SweepOutcome` containing statistics about the pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot itself fails. Individual purge
    /// failures are counted in the outcome instead, so one bad record
    /// cannot abort the pass.
    #[instrument(
        name = "winder.gc.sweep",
        skip(self),
        fields(component = "gc", operation = "sweep", dry_run = dry_run)
    )]
    pub fn run(&self, dry_run: bool) -> Result<SweepOutcome> {
        let start = Instant::now();
        let now = self.clock.now();

        let records = self.store.list()?;

        debug!(
            record_count = records.len(),
            now, "Checking records for expiry"
        );

        let plan = plan_sweep(&records, &self.settings, now);

        let mut outcome = SweepOutcome {
            records_checked: records.len(),
            records_kept: plan.kept,
            dry_run,
            ..Default::default()
        };

        for purge in &plan.purges {
            if dry_run {
                outcome.count_purge(purge);
                continue;
            }

            match self.store.delete(&purge.id) {
                Ok(true) => {
                    debug!(
                        record_id = %purge.id,
                        reason = %purge.reason,
                        "Purged expired record"
                    );
                    outcome.count_purge(purge);
                }
                Ok(false) => {
                    // Gone between snapshot and purge; the goal state
                    // is already reached.
                    debug!(record_id = %purge.id, "Record already absent, skipping purge");
                    outcome.records_missing += 1;
                }
                Err(e) => {
                    warn!(
                        record_id = %purge.id,
                        error = %e,
                        "Failed to purge expired record"
                    );
                    outcome.records_failed += 1;
                }
            }
        }

        outcome.duration_ms = duration_to_millis(start.elapsed());

        // Record metrics
        metrics::counter!(
            "gc_sweep_runs_total",
            "dry_run" => dry_run.to_string()
        )
        .increment(1);
        metrics::gauge!("gc_sweep_purged").set(usize_to_f64(outcome.records_purged));
        metrics::histogram!("gc_sweep_duration_ms").record(u64_to_f64(outcome.duration_ms));
        metrics::histogram!(
            "record_lifecycle_duration_ms",
            "component" => "gc",
            "operation" => "sweep"
        )
        .record(u64_to_f64(outcome.duration_ms));

        info!(
            records_checked = outcome.records_checked,
            records_purged = outcome.records_purged,
            records_missing = outcome.records_missing,
            records_failed = outcome.records_failed,
            duration_ms = outcome.duration_ms,
            dry_run,
            "Sweep completed"
        );

        Ok(outcome)
    }

    /// Runs sweeps on an interval until the shutdown flag is raised.
    ///
    /// The first pass runs immediately; later passes run once `interval`
    /// has elapsed since the previous one. The shutdown flag is polled
    /// between passes, so shutdown latency is bounded by the poll tick
    /// rather than by `interval`. A failed pass is logged and the loop
    /// keeps going.
    ///
    /// # Returns
    ///
    /// The number of sweep passes executed.
    pub async fn watch(&self, interval: Duration, shutdown: Arc<AtomicBool>) -> usize {
        info!(interval_secs = interval.as_secs(), "Sweep watch started");

        let mut passes = 0usize;
        let mut last_run: Option<Instant> = None;

        while !shutdown.load(Ordering::Relaxed) {
            let due = last_run.is_none_or(|at| at.elapsed() >= interval);
            if due {
                match self.run(false) {
                    Ok(outcome) if outcome.has_purges() => {
                        info!(summary = %outcome.summary(), "Sweep pass purged records");
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "Sweep pass failed"),
                }
                passes += 1;
                last_run = Some(Instant::now());
            }

            tokio::time::sleep(WATCH_TICK).await;
        }

        info!(passes, "Sweep watch stopped");
        passes
    }
}

/// Converts a Duration to milliseconds, capping at `u64::MAX`.
fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Converts usize to f64 for metrics, capping at f64's exact integer range.
#[allow(clippy::cast_precision_loss)]
fn usize_to_f64(value: usize) -> f64 {
    const MAX_EXACT: usize = 1 << 52;
    if value > MAX_EXACT {
        MAX_EXACT as f64
    } else {
        value as f64
    }
}

/// Converts u64 to f64 for metrics, capping at f64's exact integer range.
#[allow(clippy::cast_precision_loss)]
fn u64_to_f64(value: u64) -> f64 {
    const MAX_EXACT: u64 = 1 << 52;
    if value > MAX_EXACT {
        MAX_EXACT as f64
    } else {
        value as f64
    }
}
