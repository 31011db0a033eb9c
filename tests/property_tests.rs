//! Property-based tests for the record lifecycle.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Repeated soft deletes never move the original tombstone
//! - Restoring within the window reproduces the record exactly
//! - Undo permission and purge eligibility are exact complements
//! - Sweep planning partitions every snapshot and is deterministic
//! - The restore countdown only ever shrinks
//! - Kind, severity and export format names roundtrip through parse

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use winder::clock::ManualClock;
use winder::gc::{PolicySettings, PurgeReason, RetentionPolicy, plan_sweep};
use winder::lifecycle::{SoftDeleteOutcome, TombstoneManager, UndoOutcome};
use winder::models::{
    EmergencyReport, Record, RecordId, RecordKind, RecordPayload, Severity, SoftDeletable,
};
use winder::storage::{MemoryStore, RecordStore};
use winder::{Clock, ExportFormat};

const HOUR: u64 = 3_600;
const DAY: u64 = 86_400;
const GRACE_SECS: u64 = 24 * HOUR;

fn report(id: &str, created_at: u64, reporter: &str) -> Record {
    Record::new(
        RecordId::new(id),
        created_at,
        RecordPayload::EmergencyReport(EmergencyReport {
            reporter_name: reporter.to_string(),
            location: "Main St bridge".to_string(),
            description: "Flooded underpass".to_string(),
            severity: Severity::High,
        }),
    )
}

fn manager_at(
    start: u64,
    records: &[Record],
) -> (TombstoneManager, Arc<ManualClock>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    for record in records {
        store.put(record).expect("seeding the store should work");
    }
    let clock = Arc::new(ManualClock::new(start));
    let manager = TombstoneManager::new(
        Arc::clone(&store) as Arc<dyn RecordStore>,
        Arc::clone(&clock) as Arc<dyn Clock>,
        PolicySettings::new(),
    );
    (manager, clock, store)
}

/// Builds a snapshot of records from (created_at, deleted_at) pairs.
fn snapshot(shape: &[(u64, Option<u64>)]) -> Vec<Record> {
    shape
        .iter()
        .enumerate()
        .map(|(i, (created_at, deleted_at))| {
            let mut record = report(&format!("r{i}"), *created_at, "Dana");
            record.deleted_at = *deleted_at;
            record
        })
        .collect()
}

proptest! {
    /// Property: deleting an already-deleted record keeps the first tombstone.
    #[test]
    fn prop_repeat_delete_keeps_first_timestamp(
        start in 1_000_000u64..2_000_000_000,
        gaps in prop::collection::vec(0u64..10 * DAY, 1..5),
    ) {
        let (manager, clock, store) = manager_at(start, &[report("r1", start, "Dana")]);
        let id = RecordId::new("r1");

        let first = manager.soft_delete(&id).expect("first delete");
        prop_assert_eq!(first, SoftDeleteOutcome::Deleted { deleted_at: start });

        for gap in gaps {
            clock.advance(gap);
            let again = manager.soft_delete(&id).expect("repeat delete");
            prop_assert_eq!(again, SoftDeleteOutcome::AlreadyDeleted { deleted_at: start });
        }

        let stored = store.get(&id).expect("get").expect("still present");
        prop_assert_eq!(stored.deleted_at, Some(start));
    }

    /// Property: restoring within the window reproduces the record exactly.
    #[test]
    fn prop_restore_is_exact(
        reporter in "[A-Z][a-z]{2,12}",
        created in 0u64..1_000_000_000,
        delete_after in 0u64..30 * DAY,
        wait in 0u64..GRACE_SECS,
    ) {
        let original = report("r1", created, &reporter);
        let (manager, clock, store) = manager_at(created, std::slice::from_ref(&original));
        let id = RecordId::new("r1");

        clock.set(created + delete_after);
        manager.soft_delete(&id).expect("delete");
        clock.advance(wait);

        let outcome = manager.undo_delete(&id).expect("restore inside the window");
        prop_assert_eq!(outcome, UndoOutcome::Restored);

        let restored = store.get(&id).expect("get").expect("record should exist");
        prop_assert_eq!(restored, original);
    }

    /// Property: undo is allowed exactly while elapsed time is under the grace period.
    #[test]
    fn prop_undo_window_is_half_open(
        deleted_at in 0u64..3_000_000_000,
        offset in 0u64..3 * DAY,
        grace_hours in 1u64..168,
    ) {
        let policy = RetentionPolicy::new(
            Duration::from_secs(grace_hours * HOUR),
            Duration::from_secs(365 * DAY),
        );
        let now = deleted_at + offset;

        prop_assert_eq!(policy.undo_allowed(deleted_at, now), offset < grace_hours * HOUR);
        prop_assert_ne!(
            policy.undo_allowed(deleted_at, now),
            policy.grace_elapsed(deleted_at, now)
        );
    }

    /// Property: a tombstone dated in the future never counts as expired.
    #[test]
    fn prop_future_tombstone_is_not_expired(
        now in 0u64..1_000_000_000,
        skew in 1u64..1_000_000,
    ) {
        let policy = RetentionPolicy::default();
        let deleted_at = now + skew;

        prop_assert!(policy.undo_allowed(deleted_at, now));
        prop_assert_eq!(
            policy.time_remaining(deleted_at, now).as_secs(),
            policy.grace_secs()
        );
    }

    /// Property: every snapshot record lands on exactly one side of the plan,
    /// and each side satisfies its own rule.
    #[test]
    fn prop_plan_partitions_snapshot(
        shape in prop::collection::vec(
            (0u64..100 * DAY, prop::option::of(0u64..100 * DAY)),
            0..40,
        ),
        now in 0u64..200 * DAY,
    ) {
        let records = snapshot(&shape);
        let settings = PolicySettings::new();
        let plan = plan_sweep(&records, &settings, now);

        prop_assert_eq!(plan.total_examined(), records.len());

        let purged: std::collections::HashSet<_> =
            plan.purged_ids().into_iter().collect();

        for record in &records {
            let policy = settings.effective_policy(record.kind);
            let grace_purge = record
                .deleted_at
                .is_some_and(|d| policy.grace_elapsed(d, now));
            let retention_purge = policy.retention_elapsed(record.created_at, now);

            prop_assert_eq!(
                purged.contains(&record.id),
                grace_purge || retention_purge,
                "record {:?} on the wrong side of the plan",
                record.id
            );
        }

        for purge in &plan.purges {
            let record = records
                .iter()
                .find(|r| r.id == purge.id)
                .expect("planned purge must come from the snapshot");
            let policy = settings.effective_policy(record.kind);
            match purge.reason {
                PurgeReason::GraceElapsed => {
                    let deleted_at = record.deleted_at.expect("grace purge implies deleted");
                    prop_assert!(policy.grace_elapsed(deleted_at, now));
                }
                PurgeReason::RetentionElapsed => {
                    prop_assert!(policy.retention_elapsed(record.created_at, now));
                    // Grace takes precedence, so this record's window
                    // must still be open (or it was never deleted).
                    prop_assert!(
                        record.deleted_at.is_none_or(|d| policy.undo_allowed(d, now))
                    );
                }
            }
        }
    }

    /// Property: planning is pure; the same snapshot and instant give the same plan.
    #[test]
    fn prop_plan_is_deterministic(
        shape in prop::collection::vec(
            (0u64..100 * DAY, prop::option::of(0u64..100 * DAY)),
            0..30,
        ),
        now in 0u64..200 * DAY,
    ) {
        let records = snapshot(&shape);
        let settings = PolicySettings::new();

        let first = plan_sweep(&records, &settings, now);
        let second = plan_sweep(&records, &settings, now);
        prop_assert_eq!(first, second);
    }

    /// Property: the restore countdown never increases as time advances,
    /// and stays at zero once it gets there.
    #[test]
    fn prop_countdown_only_shrinks(
        deleted_at in 0u64..1_000_000_000,
        steps in prop::collection::vec(0u64..12 * HOUR, 1..20),
    ) {
        let policy = RetentionPolicy::default();
        let mut now = deleted_at;
        let mut previous = policy.time_remaining(deleted_at, now);

        for step in steps {
            now += step;
            let current = policy.time_remaining(deleted_at, now);
            prop_assert!(current <= previous);
            if previous.is_zero() {
                prop_assert!(current.is_zero());
            }
            previous = current;
        }
    }

    /// Property: while the window is open, remaining plus elapsed equals the
    /// grace period exactly.
    #[test]
    fn prop_remaining_complements_elapsed(
        deleted_at in 0u64..2_000_000_000,
        elapsed in 0u64..GRACE_SECS,
    ) {
        let policy = RetentionPolicy::default();
        let remaining = policy.time_remaining(deleted_at, deleted_at + elapsed);
        prop_assert_eq!(remaining.as_secs() + elapsed, GRACE_SECS);
    }

    /// Property: `RecordKind::as_str` roundtrips through parse.
    #[test]
    fn prop_kind_roundtrips(kind in prop::sample::select(RecordKind::all().to_vec())) {
        prop_assert_eq!(RecordKind::parse(kind.as_str()), Some(kind));
    }

    /// Property: severity parsing is case-insensitive.
    #[test]
    fn prop_severity_parse_case_insensitive(
        name in prop::sample::select(vec!["low", "medium", "high", "critical"])
    ) {
        let lower = Severity::parse(name);
        let upper = Severity::parse(&name.to_uppercase());
        prop_assert!(lower.is_some());
        prop_assert_eq!(lower, upper);
        prop_assert_eq!(lower.unwrap().as_str(), name);
    }

    /// Property: export format parsing is case-insensitive and roundtrips.
    #[test]
    fn prop_export_format_roundtrips(
        name in prop::sample::select(vec!["json", "csv"])
    ) {
        let format = ExportFormat::parse(name);
        prop_assert!(format.is_some());
        prop_assert_eq!(ExportFormat::parse(&name.to_uppercase()), format);
        prop_assert_eq!(format.unwrap().as_str(), name);
    }
}

/// Manually-written property tests for specific edge cases.
mod manual_property_tests {
    use super::*;

    #[test]
    fn test_window_closes_exactly_at_the_boundary() {
        let policy = RetentionPolicy::default();
        let deleted_at = 1_704_189_600;

        // One second before the boundary: still open.
        assert!(policy.undo_allowed(deleted_at, deleted_at + GRACE_SECS - 1));
        assert_eq!(
            policy
                .time_remaining(deleted_at, deleted_at + GRACE_SECS - 1)
                .as_secs(),
            1
        );

        // The boundary instant itself: closed.
        assert!(!policy.undo_allowed(deleted_at, deleted_at + GRACE_SECS));
        assert!(policy.grace_elapsed(deleted_at, deleted_at + GRACE_SECS));
        assert!(
            policy
                .time_remaining(deleted_at, deleted_at + GRACE_SECS)
                .is_zero()
        );
    }

    #[test]
    fn test_full_window_at_the_instant_of_deletion() {
        let policy = RetentionPolicy::default();
        assert_eq!(policy.time_remaining(500, 500).as_secs(), GRACE_SECS);
        assert!(policy.undo_allowed(500, 500));
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let policy = RetentionPolicy::default();

        assert!(policy.undo_allowed(u64::MAX, 0));
        assert!(!policy.undo_allowed(0, u64::MAX));
        assert!(policy.time_remaining(0, u64::MAX).is_zero());
        assert!(policy.retention_elapsed(0, u64::MAX));
        assert!(!policy.retention_elapsed(u64::MAX, 0));
    }

    #[test]
    fn test_retention_applies_to_live_and_deleted_alike() {
        let settings = PolicySettings::new();
        let now = 40 * DAY;

        let records = snapshot(&[
            (0, None),             // live, 40 days old
            (0, Some(39 * DAY)),   // deleted yesterday, 40 days old
            (20 * DAY, None),      // live, 20 days old
        ]);
        let plan = plan_sweep(&records, &settings, now);

        let ids = plan.purged_ids();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&RecordId::new("r0")));
        assert!(ids.contains(&RecordId::new("r1")));
        assert_eq!(plan.kept, 1);
    }

    #[test]
    fn test_grace_reason_wins_when_both_rules_apply() {
        let settings = PolicySettings::new();
        // Created 40 days ago and deleted 10 days ago: both rules fire.
        let records = snapshot(&[(0, Some(30 * DAY))]);

        let plan = plan_sweep(&records, &settings, 40 * DAY);
        assert_eq!(plan.purges.len(), 1);
        assert_eq!(plan.purges[0].reason, PurgeReason::GraceElapsed);
    }

    #[test]
    fn test_soft_deletable_view_matches_record_fields() {
        let mut record = report("r1", 1_704_067_200, "Dana");
        record.deleted_at = Some(1_704_189_600);

        assert_eq!(record.record_id(), &RecordId::new("r1"));
        assert_eq!(record.kind(), RecordKind::EmergencyReport);
        assert_eq!(record.created_at(), 1_704_067_200);
        assert_eq!(record.deleted_at(), Some(1_704_189_600));
    }
}
