//! Export command.
//!
//! # Usage
//!
//! ```bash
//! # Everything still live, as JSON on stdout
//! winder export
//!
//! # Deleted reports to a CSV file (format detected from the extension)
//! winder export --kind report --deleted --output deleted-reports.csv
//! ```

// Allow print_stdout/stderr in CLI module (consistent with main.rs)
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]
// Allow pass-by-value for command functions (consistent with main.rs)
#![allow(clippy::needless_pass_by_value)]

use crate::cli::{build_store, list::parse_filter};
use crate::clock::SystemClock;
use crate::config::WinderConfig;
use crate::export::{ExportFormat, export_records, export_to_file};
use crate::lifecycle::RecordService;
use crate::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Executes the export command.
///
/// Writes to stdout unless an output path is given, so logs never mix
/// into the exported data.
///
/// # Errors
///
/// Returns an error if the filter or format is invalid, or the export
/// cannot be written.
pub fn cmd_export(
    config: &WinderConfig,
    kind: Option<String>,
    deleted: bool,
    all: bool,
    format: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let filter = parse_filter(kind.as_deref(), deleted, all)?;

    let format = match format {
        Some(name) => Some(ExportFormat::parse(&name).ok_or_else(|| {
            Error::InvalidInput(format!(
                "unknown export format '{name}' (expected json or csv)"
            ))
        })?),
        None => None,
    };

    let service = RecordService::new(build_store(config)?, Arc::new(SystemClock));
    let records = service.list(&filter)?;

    match output {
        Some(path) => {
            let result = export_to_file(&records, format, &path)?;
            println!(
                "Exported {} record(s) to {} ({})",
                result.exported,
                path.display(),
                result.format
            );
        }
        None => {
            let stdout = std::io::stdout().lock();
            export_records(&records, format.unwrap_or_default(), stdout)?;
        }
    }

    Ok(())
}
