//! Observability and telemetry.
//!
//! Structured logging via `tracing` with an `EnvFilter`, pretty or JSON
//! output, and an optional log file. Metrics go through the `metrics`
//! facade everywhere; the Prometheus exporter is only installed for
//! long-running watch mode.

use crate::{Error, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding log filter directives.
pub const LOG_FILTER_ENV: &str = "WINDER_LOG";

/// Environment variable selecting the log format (`pretty` or `json`).
pub const LOG_FORMAT_ENV: &str = "WINDER_LOG_FORMAT";

/// Environment variable pointing logs at a file.
pub const LOG_FILE_ENV: &str = "WINDER_LOG_FILE";

const DEFAULT_FILTER: &str = "winder=info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, falling back to pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directives, e.g. `winder=debug`.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
    /// Log file path; `None` logs to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Builds logging configuration from environment variables.
    ///
    /// Filter precedence: `WINDER_LOG`, then `RUST_LOG`, then
    /// `winder=debug` when `verbose` is set, then the default.
    #[must_use]
    pub fn from_env(verbose: bool) -> Self {
        let filter = std::env::var(LOG_FILTER_ENV)
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                if verbose {
                    "winder=debug".to_string()
                } else {
                    DEFAULT_FILTER.to_string()
                }
            });

        let format = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .map_or_else(LogFormat::default, |v| LogFormat::parse(&v));

        let file = std::env::var(LOG_FILE_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self {
            filter,
            format,
            file,
        }
    }
}

static OBSERVABILITY_INIT: OnceLock<()> = OnceLock::new();

/// Initializes logging for the process.
///
/// Safe to call more than once; later calls are no-ops. Console output
/// goes to stderr so command output on stdout stays machine-readable.
///
/// # Errors
///
/// Returns an error if the filter directives are malformed or the log
/// file cannot be opened.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    if OBSERVABILITY_INIT.get().is_some() {
        return Ok(());
    }

    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| Error::InvalidInput(format!("log filter '{}': {e}", config.filter)))?;

    match (&config.file, config.format) {
        (Some(log_file), LogFormat::Json) => {
            let writer = open_log_file(log_file)?;
            let _ = tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_current_span(true)
                        .with_target(true),
                )
                .with(filter)
                .try_init();
        }
        (Some(log_file), LogFormat::Pretty) => {
            let writer = open_log_file(log_file)?;
            let _ = tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(true),
                )
                .with(filter)
                .try_init();
        }
        (None, LogFormat::Json) => {
            let _ = tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(io::stderr)
                        .with_current_span(true)
                        .with_target(true),
                )
                .with(filter)
                .try_init();
        }
        (None, LogFormat::Pretty) => {
            let _ = tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(true),
                )
                .with(filter)
                .try_init();
        }
    }

    let _ = OBSERVABILITY_INIT.set(());
    Ok(())
}

/// Installs the Prometheus metrics exporter with an HTTP listener.
///
/// Only watch mode calls this; one-shot commands record metrics into
/// the facade's no-op recorder instead of binding a port.
///
/// # Errors
///
/// Returns an error if the exporter fails to install (for example the
/// port is already bound).
pub fn install_metrics_exporter(port: u16) -> Result<()> {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| Error::Storage {
            operation: "install_metrics_exporter".to_string(),
            cause: format!("{addr}: {e}"),
        })?;

    tracing::info!(listen_addr = %addr, "Prometheus exporter listening");
    Ok(())
}

/// Thread-safe file writer for logging.
#[derive(Clone)]
struct LogFileWriter {
    file: Arc<Mutex<File>>,
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        guard.flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogFileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Opens a log file for appending.
fn open_log_file(path: &Path) -> Result<LogFileWriter> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::Storage {
            operation: "create_log_dir".to_string(),
            cause: e.to_string(),
        })?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::Storage {
            operation: "open_log_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

    Ok(LogFileWriter {
        file: Arc::new(Mutex::new(file)),
    })
}
