//! CLI command implementations.
//!
//! This module provides the command-line interface for winder. Each
//! submodule implements one or two closely related commands.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `report` | File an emergency report |
//! | `share` | Share a location while awaiting assistance |
//! | `list` | List records, filtered by kind and state |
//! | `show` | Show one record with its restore countdown |
//! | `delete` | Soft-delete records (restorable within the grace period) |
//! | `restore` | Restore soft-deleted records |
//! | `status` | Show store statistics and the next purge instant |
//! | `sweep` | Run the retention sweep, once or on an interval |
//! | `export` | Export records as JSON or CSV |
//! | `config` | Show the active configuration |
//!
//! # Example Usage
//!
//! ```bash
//! # File a report
//! winder report --reporter "Dana Cruz" --location "5th and Main" \
//!     --severity high "Street flooding past the curb"
//!
//! # Delete it, then change your mind
//! winder delete 7c9e6679-7425-40de-944b-e07fc1f90ae7
//! winder restore 7c9e6679-7425-40de-944b-e07fc1f90ae7
//!
//! # Preview what the sweep would purge
//! winder sweep --dry-run
//! ```

// Allow print_stdout/stderr in CLI module (consistent with main.rs)
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

mod config;
mod create;
mod delete;
mod export;
mod list;
mod status;
mod sweep;

pub use config::cmd_config;
pub use create::{cmd_report, cmd_share};
pub use delete::{cmd_delete, cmd_restore};
pub use export::cmd_export;
pub use list::{cmd_list, cmd_show};
pub use status::cmd_status;
pub use sweep::cmd_sweep;

use crate::config::{StorageBackend, WinderConfig};
use crate::storage::{FilesystemStore, MemoryStore, RecordStore, SqliteStore};
use crate::{Error, Result};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

/// Opens the record store selected by the configuration.
///
/// The data directory is created on first use.
///
/// # Errors
///
/// Returns an error if the data directory or the backing store cannot
/// be initialized.
pub fn build_store(config: &WinderConfig) -> Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Filesystem => Arc::new(FilesystemStore::with_create(config.records_dir())?),
        StorageBackend::Sqlite => {
            std::fs::create_dir_all(&config.data_dir).map_err(|e| Error::Storage {
                operation: "create_data_dir".to_string(),
                cause: format!("{}: {e}", config.data_dir.display()),
            })?;
            Arc::new(SqliteStore::new(config.db_path())?)
        }
    };

    Ok(store)
}

/// Asks a yes/no question on stdout and reads the answer from stdin.
pub(crate) fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush().map_err(|e| Error::Storage {
        operation: "flush_stdout".to_string(),
        cause: e.to_string(),
    })?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).map_err(|e| Error::Storage {
        operation: "read_stdin".to_string(),
        cause: e.to_string(),
    })?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Renders a duration as a compact countdown like `23h 59m 59s`.
pub(crate) fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_secs(59)), "59s");
        assert_eq!(format_duration(Duration::from_secs(61)), "1m 1s");
        assert_eq!(format_duration(Duration::from_secs(86_399)), "23h 59m 59s");
    }

    #[test]
    fn test_build_store_memory_backend() {
        let config = WinderConfig::default().with_backend(StorageBackend::Memory);
        let store = build_store(&config).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_build_store_sqlite_creates_data_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = WinderConfig::default()
            .with_data_dir(dir.path().join("nested"))
            .with_backend(StorageBackend::Sqlite);

        let store = build_store(&config).unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(config.db_path().exists());
    }
}
