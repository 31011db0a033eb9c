//! Delete and restore commands.
//!
//! Deletion is always soft: the record keeps its data and can be
//! restored until the grace period runs out, after which the sweep
//! purges it for good.
//!
//! # Usage
//!
//! ```bash
//! # Soft-delete, with confirmation
//! winder delete abc123
//! winder delete id1 id2 id3
//!
//! # Preview without deleting
//! winder delete --dry-run abc123
//!
//! # Skip confirmation
//! winder delete --force abc123
//!
//! # Change your mind within the grace period
//! winder restore abc123
//! ```

// Allow print_stdout/stderr in CLI module (consistent with main.rs)
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]
// Allow pass-by-value for command functions (consistent with main.rs)
#![allow(clippy::needless_pass_by_value)]

use crate::cli::{build_store, confirm};
use crate::clock::SystemClock;
use crate::config::WinderConfig;
use crate::export::format_timestamp;
use crate::lifecycle::{SoftDeleteOutcome, TombstoneManager, UndoOutcome};
use crate::models::{Record, RecordId};
use crate::{Error, Result};
use std::sync::Arc;

/// Result of a batch soft-delete.
#[derive(Debug, Default)]
pub(crate) struct DeleteBatch {
    /// Deleted IDs with the instant their restore window closes.
    pub deleted: Vec<(RecordId, u64)>,
    /// IDs that already carried a tombstone.
    pub already_deleted: Vec<RecordId>,
    /// Number of records that failed to delete.
    pub failed: usize,
}

/// Result of a batch restore.
#[derive(Debug, Default)]
pub(crate) struct RestoreBatch {
    /// IDs restored to live.
    pub restored: Vec<RecordId>,
    /// IDs that were never deleted.
    pub already_live: Vec<RecordId>,
    /// IDs whose restore window had closed.
    pub expired: Vec<RecordId>,
    /// IDs not present in the store.
    pub missing: Vec<RecordId>,
    /// Number of records that failed with a storage error.
    pub failed: usize,
}

/// Executes the delete command.
///
/// # Errors
///
/// Returns an error if storage access fails.
pub fn cmd_delete(
    config: &WinderConfig,
    ids: Vec<String>,
    force: bool,
    dry_run: bool,
) -> Result<()> {
    if ids.is_empty() {
        println!("No record IDs provided. Usage: winder delete <ID>...");
        return Ok(());
    }

    let store = build_store(config)?;
    let manager = TombstoneManager::new(
        Arc::clone(&store),
        Arc::new(SystemClock),
        config.policy.clone(),
    );

    // Validate IDs and collect existing records
    let mut found: Vec<Record> = Vec::new();
    let mut not_found: Vec<String> = Vec::new();

    for id in &ids {
        match store.get(&RecordId::new(id.clone()))? {
            Some(record) => found.push(record),
            None => not_found.push(id.clone()),
        }
    }

    if !not_found.is_empty() {
        println!("Not found ({}):", not_found.len());
        for id in &not_found {
            println!("  - {id} (already removed or never existed)");
        }
        println!();
    }

    if found.is_empty() {
        println!("No records to delete.");
        return Ok(());
    }

    if dry_run {
        println!("Would delete {} record(s):", found.len());
        for record in &found {
            println!(
                "  - {} ({}), restorable for {}h after deletion",
                record.id,
                record.kind,
                config.policy.effective_grace_hours(record.kind)
            );
        }
        println!("\nDry run; no records were deleted.");
        return Ok(());
    }

    if !force {
        println!("About to delete {} record(s):\n", found.len());
        for record in &found {
            println!("  - {} ({})", record.id, record.kind);
        }
        println!();
        println!("Deleted records can be restored with `winder restore` until");
        println!("their grace period runs out, then the sweep purges them.");
        println!();

        if !confirm("Proceed?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let batch = soft_delete_batch(&manager, &found);

    println!();
    for (id, restore_by) in &batch.deleted {
        println!("Deleted {id} (restorable until {})", format_timestamp(*restore_by));
    }
    for id in &batch.already_deleted {
        println!("{id} was already deleted; its restore window is unchanged");
    }

    println!("\nDeleted {} record(s).", batch.deleted.len());
    if batch.failed > 0 {
        println!("{} record(s) failed to delete.", batch.failed);
    }

    Ok(())
}

/// Executes the restore command.
///
/// # Errors
///
/// Returns an error if storage access fails while opening the store.
pub fn cmd_restore(config: &WinderConfig, ids: Vec<String>) -> Result<()> {
    if ids.is_empty() {
        println!("No record IDs provided. Usage: winder restore <ID>...");
        return Ok(());
    }

    let manager = TombstoneManager::new(
        build_store(config)?,
        Arc::new(SystemClock),
        config.policy.clone(),
    );

    let ids: Vec<RecordId> = ids.into_iter().map(RecordId::new).collect();
    let batch = restore_batch(&manager, &ids);

    for id in &batch.restored {
        println!("Restored {id}");
    }
    for id in &batch.already_live {
        println!("{id} is already live");
    }
    for id in &batch.expired {
        println!("{id}: restore window has passed; the record awaits purge");
    }
    for id in &batch.missing {
        println!("{id}: not found (purged or never existed)");
    }

    println!("\nRestored {} of {} record(s).", batch.restored.len(), ids.len());

    Ok(())
}

/// Soft-deletes each record, collecting per-record outcomes.
fn soft_delete_batch(manager: &TombstoneManager, records: &[Record]) -> DeleteBatch {
    let mut batch = DeleteBatch::default();

    for record in records {
        let grace_secs = manager.settings().effective_policy(record.kind).grace_secs();

        match manager.soft_delete(&record.id) {
            Ok(SoftDeleteOutcome::Deleted { deleted_at }) => {
                batch
                    .deleted
                    .push((record.id.clone(), deleted_at.saturating_add(grace_secs)));
            }
            Ok(SoftDeleteOutcome::AlreadyDeleted { .. }) => {
                batch.already_deleted.push(record.id.clone());
            }
            Err(e) => {
                eprintln!("Failed to delete {}: {e}", record.id);
                batch.failed += 1;
            }
        }
    }

    batch
}

/// Restores each record, collecting per-record outcomes.
fn restore_batch(manager: &TombstoneManager, ids: &[RecordId]) -> RestoreBatch {
    let mut batch = RestoreBatch::default();

    for id in ids {
        match manager.undo_delete(id) {
            Ok(UndoOutcome::Restored) => batch.restored.push(id.clone()),
            Ok(UndoOutcome::AlreadyLive) => batch.already_live.push(id.clone()),
            Err(Error::GracePeriodExpired { .. }) => batch.expired.push(id.clone()),
            Err(Error::NotFound { .. }) => batch.missing.push(id.clone()),
            Err(e) => {
                eprintln!("Failed to restore {id}: {e}");
                batch.failed += 1;
            }
        }
    }

    batch
}
