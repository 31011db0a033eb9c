//! List and show commands.
//!
//! # Usage
//!
//! ```bash
//! # Live records (default)
//! winder list
//!
//! # Soft-deleted location shares, as JSON
//! winder list --kind share --deleted --json
//!
//! # One record with its restore countdown
//! winder show 7c9e6679-7425-40de-944b-e07fc1f90ae7
//! ```

// Allow print_stdout/stderr in CLI module (consistent with main.rs)
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]
// Allow pass-by-value for command functions (consistent with main.rs)
#![allow(clippy::needless_pass_by_value)]

use crate::cli::{build_store, format_duration};
use crate::clock::SystemClock;
use crate::config::WinderConfig;
use crate::export::{ExportRow, format_timestamp};
use crate::lifecycle::{RecordFilter, RecordService, StateFilter, TombstoneManager};
use crate::models::{Record, RecordId, RecordKind, RecordPayload};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Executes the list command.
///
/// # Errors
///
/// Returns an error if the kind filter is unknown or the store cannot
/// be read.
pub fn cmd_list(
    config: &WinderConfig,
    kind: Option<String>,
    deleted: bool,
    all: bool,
    json: bool,
) -> Result<()> {
    let filter = parse_filter(kind.as_deref(), deleted, all)?;

    let service = RecordService::new(build_store(config)?, Arc::new(SystemClock));
    let records = service.list(&filter)?;

    if json {
        let rows: Vec<ExportRow> = records.iter().map(ExportRow::from).collect();
        println!("{}", to_json(&rows)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No records found.");
        return Ok(());
    }

    println!("Found {} record(s):", records.len());
    println!();
    for record in &records {
        println!("  {}", record_line(record));
        println!("       {}", record.payload.summary());
    }

    Ok(())
}

/// Executes the show command.
///
/// # Errors
///
/// Returns an error if the record does not exist or the store cannot
/// be read.
pub fn cmd_show(config: &WinderConfig, id: String, json: bool) -> Result<()> {
    let store = build_store(config)?;
    let clock = Arc::new(SystemClock);
    let service = RecordService::new(Arc::clone(&store), clock.clone());
    let manager = TombstoneManager::new(store, clock, config.policy.clone());

    let record_id = RecordId::new(id);
    let record = service.get(&record_id)?;

    let remaining = if record.is_deleted() {
        Some(manager.time_remaining(&record_id)?)
    } else {
        None
    };

    if json {
        let mut value = serde_json::to_value(ExportRow::from(&record)).map_err(|e| {
            Error::Storage {
                operation: "serialize_record".to_string(),
                cause: e.to_string(),
            }
        })?;
        if let (Some(object), Some(remaining)) = (value.as_object_mut(), remaining) {
            object.insert(
                "grace_remaining_secs".to_string(),
                remaining.as_secs().into(),
            );
        }
        println!("{}", to_json(&value)?);
        return Ok(());
    }

    println!("ID: {}", record.id);
    println!("Kind: {}", record.kind);
    println!("Created: {}", format_timestamp(record.created_at));

    match record.deleted_at {
        Some(deleted_at) => {
            println!("State: deleted");
            println!("Deleted: {}", format_timestamp(deleted_at));
            match remaining {
                Some(window) if window > Duration::ZERO => {
                    println!("Restore window: {} remaining", format_duration(window));
                }
                _ => println!("Restore window has passed; awaiting purge"),
            }
        }
        None => println!("State: live"),
    }

    println!();
    print_payload(&record.payload);

    Ok(())
}

/// Builds a record filter from CLI flags.
pub(crate) fn parse_filter(
    kind: Option<&str>,
    deleted: bool,
    all: bool,
) -> Result<RecordFilter> {
    let mut filter = RecordFilter::new();

    if let Some(kind) = kind {
        let kind = RecordKind::parse(kind).ok_or_else(|| {
            Error::InvalidInput(format!(
                "unknown record kind '{kind}' (expected report or share)"
            ))
        })?;
        filter = filter.with_kind(kind);
    }

    if all {
        filter = filter.with_state(StateFilter::All);
    } else if deleted {
        filter = filter.with_state(StateFilter::Deleted);
    }

    Ok(filter)
}

fn record_line(record: &Record) -> String {
    let state = if record.is_deleted() { "deleted" } else { "live" };
    format!(
        "{}  {:<16}  {:<7}  {}",
        record.id,
        record.kind.as_str(),
        state,
        format_timestamp(record.created_at)
    )
}

fn print_payload(payload: &RecordPayload) {
    match payload {
        RecordPayload::EmergencyReport(report) => {
            println!("Reporter: {}", report.reporter_name);
            println!("Location: {}", report.location);
            println!("Severity: {}", report.severity);
            println!("Description: {}", report.description);
        }
        RecordPayload::LocationShare(share) => {
            println!("Sharer: {}", share.sharer_name);
            println!("Position: {:.4}, {:.4}", share.latitude, share.longitude);
            if let Some(note) = &share.note {
                println!("Note: {note}");
            }
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Storage {
        operation: "serialize_record".to_string(),
        cause: e.to_string(),
    })
}
