//! Record creation commands.
//!
//! # Usage
//!
//! ```bash
//! # File an emergency report
//! winder report --reporter "Dana Cruz" --location "5th and Main" \
//!     --severity high "Street flooding past the curb"
//!
//! # Share a location
//! winder share --sharer "Ari" --lat 29.9511 --lon -90.0715 --note "on the roof"
//! ```

// Allow print_stdout/stderr in CLI module (consistent with main.rs)
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]
// Allow pass-by-value for command functions (consistent with main.rs)
#![allow(clippy::needless_pass_by_value)]

use crate::cli::build_store;
use crate::clock::SystemClock;
use crate::config::WinderConfig;
use crate::lifecycle::RecordService;
use crate::models::Severity;
use crate::{Error, Result};
use std::sync::Arc;

/// Executes the report command.
///
/// # Errors
///
/// Returns an error if a field fails validation or the store rejects
/// the write.
pub fn cmd_report(
    config: &WinderConfig,
    reporter: String,
    location: String,
    severity: String,
    description: String,
) -> Result<()> {
    let severity = Severity::parse(&severity).ok_or_else(|| {
        Error::InvalidInput(format!(
            "unknown severity '{severity}' (expected low, medium, high, or critical)"
        ))
    })?;

    let service = RecordService::new(build_store(config)?, Arc::new(SystemClock));
    let record = service.create_report(&reporter, &location, &description, severity)?;

    println!("Report filed:");
    println!("  ID: {}", record.id);
    println!("  {}", record.payload.summary());

    Ok(())
}

/// Executes the share command.
///
/// # Errors
///
/// Returns an error if the coordinates are out of range or the store
/// rejects the write.
pub fn cmd_share(
    config: &WinderConfig,
    sharer: String,
    latitude: f64,
    longitude: f64,
    note: Option<String>,
) -> Result<()> {
    let service = RecordService::new(build_store(config)?, Arc::new(SystemClock));
    let record = service.create_share(&sharer, latitude, longitude, note)?;

    println!("Location shared:");
    println!("  ID: {}", record.id);
    println!("  {}", record.payload.summary());

    Ok(())
}
