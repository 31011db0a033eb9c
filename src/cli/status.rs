//! Status command.

// Allow print_stdout/stderr in CLI module (consistent with main.rs)
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

use crate::cli::build_store;
use crate::clock::SystemClock;
use crate::config::WinderConfig;
use crate::export::format_timestamp;
use crate::lifecycle::{KindCounts, RecordService, StoreStatus};
use crate::models::RecordKind;
use crate::{Error, Result};
use std::sync::Arc;

/// Executes the status command.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn cmd_status(config: &WinderConfig, json: bool) -> Result<()> {
    let service = RecordService::new(build_store(config)?, Arc::new(SystemClock));
    let status = service.status(&config.policy)?;

    if json {
        println!("{}", render_json(config, &status)?);
        return Ok(());
    }

    println!("Winder Status");
    println!("=============");
    println!();
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Data Directory: {}", config.data_dir.display());
    println!("Storage Backend: {}", config.backend.as_str());
    println!();
    println!("Records: {}", status.total);

    for kind in RecordKind::all() {
        let counts = status.by_kind.get(kind).copied().unwrap_or_default();
        println!(
            "  {}: {} live, {} deleted, {} awaiting purge (grace {}h, retention {}d)",
            kind,
            counts.live,
            counts.deleted,
            counts.purgeable,
            config.policy.effective_grace_hours(*kind),
            config.policy.effective_retention_days(*kind),
        );
    }

    println!();
    match status.next_purge_at {
        Some(at) => println!("Next purge due: {}", format_timestamp(at)),
        None => println!("Next purge due: none scheduled"),
    }

    Ok(())
}

fn render_json(config: &WinderConfig, status: &StoreStatus) -> Result<String> {
    let mut by_kind = serde_json::Map::new();
    for kind in RecordKind::all() {
        let counts: KindCounts = status.by_kind.get(kind).copied().unwrap_or_default();
        by_kind.insert(
            kind.as_str().to_string(),
            serde_json::json!({
                "live": counts.live,
                "deleted": counts.deleted,
                "purgeable": counts.purgeable,
                "grace_hours": config.policy.effective_grace_hours(*kind),
                "retention_days": config.policy.effective_retention_days(*kind),
            }),
        );
    }

    let value = serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "backend": config.backend.as_str(),
        "data_dir": config.data_dir.display().to_string(),
        "total": status.total,
        "by_kind": by_kind,
        "next_purge_at": status.next_purge_at.map(format_timestamp),
    });

    serde_json::to_string_pretty(&value).map_err(|e| Error::Storage {
        operation: "serialize_status".to_string(),
        cause: e.to_string(),
    })
}
