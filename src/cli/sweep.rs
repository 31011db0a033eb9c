//! Retention sweep command.
//!
//! # Usage
//!
//! ```bash
//! # Preview without purging
//! winder sweep --dry-run
//!
//! # Purge once
//! winder sweep
//!
//! # Keep sweeping until interrupted
//! winder sweep --watch --interval-secs 600
//! ```

// Allow print_stdout/stderr in CLI module (consistent with main.rs)
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

use crate::cli::build_store;
use crate::clock::SystemClock;
use crate::config::WinderConfig;
use crate::gc::SweepDriver;
use crate::observability;
use crate::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Executes the sweep command.
///
/// A one-shot sweep prints the outcome summary and returns. Watch mode
/// sweeps on an interval until Ctrl-C, exposing Prometheus metrics
/// when a metrics port is configured.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or a one-shot sweep
/// pass fails.
pub async fn cmd_sweep(
    config: &WinderConfig,
    dry_run: bool,
    watch: bool,
    interval_secs: Option<u64>,
) -> Result<()> {
    let driver = SweepDriver::new(
        build_store(config)?,
        Arc::new(SystemClock),
        config.policy.clone(),
    );

    if watch {
        if let Some(port) = config.metrics_port {
            observability::install_metrics_exporter(port)?;
        }

        let interval = Duration::from_secs(interval_secs.unwrap_or(config.sweep_interval_secs));
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)).map_err(|e| {
            Error::Storage {
                operation: "install_signal_handler".to_string(),
                cause: e.to_string(),
            }
        })?;

        println!(
            "Sweeping every {}s; press Ctrl-C to stop.",
            interval.as_secs()
        );
        let passes = driver.watch(interval, shutdown).await;
        println!("Stopped after {passes} sweep pass(es).");
        return Ok(());
    }

    let outcome = driver.run(dry_run)?;
    println!("{}", outcome.summary());

    Ok(())
}
