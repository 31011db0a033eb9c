//! Pure sweep planning.
//!
//! [`plan_sweep`] partitions a snapshot of records into purges and
//! keeps without touching storage or the wall clock. The caller passes
//! the snapshot and the evaluation instant; the [`SweepDriver`] owns
//! the I/O around it.
//!
//! [`SweepDriver`]: super::SweepDriver

use super::PolicySettings;
use crate::models::{RecordId, RecordKind, SoftDeletable};

/// Why a record was selected for purging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PurgeReason {
    /// The record was soft-deleted and its grace period has elapsed.
    GraceElapsed,
    /// The record's total age exceeds the retention period.
    RetentionElapsed,
}

impl PurgeReason {
    /// Returns the reason as a stable string for logs and summaries.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GraceElapsed => "grace-elapsed",
            Self::RetentionElapsed => "retention-elapsed",
        }
    }
}

impl std::fmt::Display for PurgeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One purge decision in a [`SweepPlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPurge {
    /// ID of the record to purge.
    pub id: RecordId,
    /// Kind of the record, for per-kind accounting.
    pub kind: RecordKind,
    /// Why the record is purgeable.
    pub reason: PurgeReason,
}

/// The outcome of planning a sweep over a snapshot.
///
/// Every record in the snapshot lands on exactly one side: in
/// `purges` or counted in `kept`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepPlan {
    /// Records to purge, in snapshot order.
    pub purges: Vec<PlannedPurge>,
    /// Number of records the sweep leaves untouched.
    pub kept: usize,
}

impl SweepPlan {
    /// True when the plan purges nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.purges.is_empty()
    }

    /// Number of records examined to produce this plan.
    #[must_use]
    pub fn total_examined(&self) -> usize {
        self.purges.len() + self.kept
    }

    /// IDs of all records the plan purges.
    #[must_use]
    pub fn purged_ids(&self) -> Vec<RecordId> {
        self.purges.iter().map(|p| p.id.clone()).collect()
    }
}

/// Plans a sweep over a snapshot of records at instant `now`.
///
/// A record is planned for purge when either:
/// - it is soft-deleted and its grace period has elapsed
///   ([`PurgeReason::GraceElapsed`]), or
/// - its age since creation exceeds the retention period, deleted or
///   not ([`PurgeReason::RetentionElapsed`]).
///
/// When both apply, the grace reason is reported. All other records
/// are kept. The function is deterministic: the same snapshot, settings
/// and instant always produce the same plan.
pub fn plan_sweep<R: SoftDeletable>(
    records: &[R],
    settings: &PolicySettings,
    now: u64,
) -> SweepPlan {
    let mut plan = SweepPlan::default();

    for record in records {
        let policy = settings.effective_policy(record.kind());

        let reason = match record.deleted_at() {
            Some(deleted_at) if policy.grace_elapsed(deleted_at, now) => {
                Some(PurgeReason::GraceElapsed)
            }
            _ if policy.retention_elapsed(record.created_at(), now) => {
                Some(PurgeReason::RetentionElapsed)
            }
            _ => None,
        };

        match reason {
            Some(reason) => plan.purges.push(PlannedPurge {
                id: record.record_id().clone(),
                kind: record.kind(),
                reason,
            }),
            None => plan.kept += 1,
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmergencyReport, LocationShare, Record, RecordPayload, Severity};

    const HOUR: u64 = 3600;
    const DAY: u64 = 86400;

    fn report_record(id: &str, created_at: u64) -> Record {
        Record::new(
            RecordId::new(id),
            created_at,
            RecordPayload::EmergencyReport(EmergencyReport {
                reporter_name: "Dana".to_string(),
                location: "Main St bridge".to_string(),
                description: "Flooded underpass".to_string(),
                severity: Severity::High,
            }),
        )
    }

    fn share_record(id: &str, created_at: u64) -> Record {
        Record::new(
            RecordId::new(id),
            created_at,
            RecordPayload::LocationShare(LocationShare {
                sharer_name: "Ana".to_string(),
                latitude: 39.05,
                longitude: -94.58,
                note: None,
            }),
        )
    }

    fn deleted(mut record: Record, deleted_at: u64) -> Record {
        record.deleted_at = Some(deleted_at);
        record
    }

    #[test]
    fn test_empty_snapshot() {
        let plan = plan_sweep::<Record>(&[], &PolicySettings::default(), 1_000_000);
        assert!(plan.is_empty());
        assert_eq!(plan.kept, 0);
        assert_eq!(plan.total_examined(), 0);
    }

    #[test]
    fn test_live_fresh_record_kept() {
        let now = 1_000_000;
        let records = vec![report_record("r1", now - HOUR)];

        let plan = plan_sweep(&records, &PolicySettings::default(), now);

        assert!(plan.is_empty());
        assert_eq!(plan.kept, 1);
    }

    #[test]
    fn test_deleted_past_grace_purged() {
        let now = 10_000_000;
        let records = vec![deleted(report_record("r1", now - 2 * DAY), now - 25 * HOUR)];

        let plan = plan_sweep(&records, &PolicySettings::default(), now);

        assert_eq!(plan.purges.len(), 1);
        assert_eq!(plan.purges[0].reason, PurgeReason::GraceElapsed);
        assert_eq!(plan.purges[0].id.as_str(), "r1");
        assert_eq!(plan.kept, 0);
    }

    #[test]
    fn test_deleted_within_grace_kept() {
        let now = 10_000_000;
        let records = vec![deleted(report_record("r1", now - 2 * DAY), now - HOUR)];

        let plan = plan_sweep(&records, &PolicySettings::default(), now);

        assert!(plan.is_empty());
        assert_eq!(plan.kept, 1);
    }

    #[test]
    fn test_grace_boundary_exact() {
        let now = 10_000_000;
        let at_boundary = deleted(report_record("r1", now - 2 * DAY), now - 24 * HOUR);
        let just_inside = deleted(report_record("r2", now - 2 * DAY), now - 24 * HOUR + 1);

        let plan = plan_sweep(&[at_boundary, just_inside], &PolicySettings::default(), now);

        assert_eq!(plan.purged_ids(), vec![RecordId::new("r1")]);
        assert_eq!(plan.kept, 1);
    }

    #[test]
    fn test_live_record_past_retention_purged() {
        let now = 10_000_000;
        let records = vec![report_record("r1", now - 31 * DAY)];

        let plan = plan_sweep(&records, &PolicySettings::default(), now);

        assert_eq!(plan.purges.len(), 1);
        assert_eq!(plan.purges[0].reason, PurgeReason::RetentionElapsed);
    }

    #[test]
    fn test_recently_deleted_but_retention_expired_purged() {
        // Deleted an hour ago (inside grace) but 31 days old overall.
        // Retention ignores deletion state.
        let now = 10_000_000;
        let records = vec![deleted(report_record("r1", now - 31 * DAY), now - HOUR)];

        let plan = plan_sweep(&records, &PolicySettings::default(), now);

        assert_eq!(plan.purges.len(), 1);
        assert_eq!(plan.purges[0].reason, PurgeReason::RetentionElapsed);
    }

    #[test]
    fn test_grace_reason_wins_when_both_elapsed() {
        let now = 10_000_000;
        let records = vec![deleted(report_record("r1", now - 40 * DAY), now - 2 * DAY)];

        let plan = plan_sweep(&records, &PolicySettings::default(), now);

        assert_eq!(plan.purges.len(), 1);
        assert_eq!(plan.purges[0].reason, PurgeReason::GraceElapsed);
    }

    #[test]
    fn test_partition_is_exact() {
        let now = 10_000_000;
        let records = vec![
            report_record("live-fresh", now - HOUR),
            deleted(report_record("deleted-fresh", now - 2 * HOUR), now - HOUR),
            deleted(report_record("deleted-stale", now - 3 * DAY), now - 2 * DAY),
            share_record("live-old", now - 31 * DAY),
        ];

        let plan = plan_sweep(&records, &PolicySettings::default(), now);

        assert_eq!(plan.total_examined(), records.len());
        assert_eq!(
            plan.purged_ids(),
            vec![RecordId::new("deleted-stale"), RecordId::new("live-old")]
        );
        assert_eq!(plan.kept, 2);
    }

    #[test]
    fn test_deterministic_for_same_input() {
        let now = 10_000_000;
        let records = vec![
            report_record("a", now - 31 * DAY),
            deleted(share_record("b", now - DAY), now - 25 * HOUR),
            share_record("c", now - HOUR),
        ];
        let settings = PolicySettings::default();

        let first = plan_sweep(&records, &settings, now);
        let second = plan_sweep(&records, &settings, now);

        assert_eq!(first, second);
    }

    #[test]
    fn test_per_kind_override_applies() {
        let now = 10_000_000;
        let settings = PolicySettings::new().with_kind_grace_hours(RecordKind::LocationShare, 6);

        // Both deleted 7 hours ago: past the share override, inside the
        // report default.
        let records = vec![
            deleted(report_record("report", now - DAY), now - 7 * HOUR),
            deleted(share_record("share", now - DAY), now - 7 * HOUR),
        ];

        let plan = plan_sweep(&records, &settings, now);

        assert_eq!(plan.purged_ids(), vec![RecordId::new("share")]);
        assert_eq!(plan.purges[0].kind, RecordKind::LocationShare);
        assert_eq!(plan.kept, 1);
    }

    #[test]
    fn test_purge_reason_display() {
        assert_eq!(PurgeReason::GraceElapsed.to_string(), "grace-elapsed");
        assert_eq!(
            PurgeReason::RetentionElapsed.to_string(),
            "retention-elapsed"
        );
    }
}
