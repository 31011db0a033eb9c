//! Binary entry point for winder.
//!
//! This binary provides the CLI interface for the winder record
//! retention system.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process::ExitCode;
use winder::cli;
use winder::config::{StorageBackend, WinderConfig};
use winder::observability::{self, LoggingConfig};

/// Winder - record retention and soft delete for community emergency
/// response data.
#[derive(Parser)]
#[command(name = "winder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storage backend: filesystem, sqlite, or memory.
    #[arg(long, global = true)]
    store: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// File an emergency report.
    Report {
        /// What is happening.
        description: String,

        /// Name of the person filing the report.
        #[arg(short, long)]
        reporter: String,

        /// Where it is happening (address, landmark, intersection).
        #[arg(short, long)]
        location: String,

        /// Severity: low, medium, high, or critical.
        #[arg(short, long, default_value = "medium")]
        severity: String,
    },

    /// Share a location while awaiting assistance.
    Share {
        /// Name of the person sharing their location.
        #[arg(short, long)]
        sharer: String,

        /// Latitude in decimal degrees.
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees.
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Optional note for responders.
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List records.
    List {
        /// Filter by kind: report or share.
        #[arg(short, long)]
        kind: Option<String>,

        /// Show only soft-deleted records.
        #[arg(long, conflicts_with = "all")]
        deleted: bool,

        /// Show live and deleted records.
        #[arg(long)]
        all: bool,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show one record, with its restore countdown when deleted.
    Show {
        /// Record ID.
        id: String,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Soft-delete records. Restorable within the grace period.
    Delete {
        /// Record IDs to delete.
        ids: Vec<String>,

        /// Skip confirmation.
        #[arg(short, long)]
        force: bool,

        /// Show what would be deleted without changing anything.
        #[arg(long, conflicts_with = "force")]
        dry_run: bool,
    },

    /// Restore soft-deleted records.
    Restore {
        /// Record IDs to restore.
        ids: Vec<String>,
    },

    /// Show store statistics and the next purge instant.
    Status {
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Purge records whose grace or retention window has run out.
    Sweep {
        /// Show what would be purged without changing anything.
        #[arg(long, conflicts_with = "watch")]
        dry_run: bool,

        /// Keep sweeping on an interval until interrupted.
        #[arg(long)]
        watch: bool,

        /// Seconds between watch passes (defaults to the configured interval).
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Export records as JSON or CSV.
    Export {
        /// Filter by kind: report or share.
        #[arg(short, long)]
        kind: Option<String>,

        /// Export only soft-deleted records.
        #[arg(long, conflicts_with = "all")]
        deleted: bool,

        /// Export live and deleted records.
        #[arg(long)]
        all: bool,

        /// Output format: json or csv (detected from the output path when omitted).
        #[arg(short, long)]
        format: Option<String>,

        /// Output file (stdout when omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let logging = LoggingConfig::from_env(cli.verbose);
    if let Err(e) = observability::init_logging(&logging) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected command.
async fn run_command(cli: Cli, config: WinderConfig) -> winder::Result<()> {
    match cli.command {
        Commands::Report {
            description,
            reporter,
            location,
            severity,
        } => cli::cmd_report(&config, reporter, location, severity, description),

        Commands::Share {
            sharer,
            lat,
            lon,
            note,
        } => cli::cmd_share(&config, sharer, lat, lon, note),

        Commands::List {
            kind,
            deleted,
            all,
            json,
        } => cli::cmd_list(&config, kind, deleted, all, json),

        Commands::Show { id, json } => cli::cmd_show(&config, id, json),

        Commands::Delete {
            ids,
            force,
            dry_run,
        } => cli::cmd_delete(&config, ids, force, dry_run),

        Commands::Restore { ids } => cli::cmd_restore(&config, ids),

        Commands::Status { json } => cli::cmd_status(&config, json),

        Commands::Sweep {
            dry_run,
            watch,
            interval_secs,
        } => cli::cmd_sweep(&config, dry_run, watch, interval_secs).await,

        Commands::Export {
            kind,
            deleted,
            all,
            format,
            output,
        } => cli::cmd_export(&config, kind, deleted, all, format, output),

        Commands::Config { show } => cli::cmd_config(&config, show),

        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

/// Loads configuration, applying global CLI overrides.
fn load_config(cli: &Cli) -> winder::Result<WinderConfig> {
    let mut config = WinderConfig::load(cli.config.as_deref())?;

    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(backend) = &cli.store {
        config = config.with_backend(StorageBackend::parse(backend));
    }

    Ok(config)
}

/// Prints shell completions for the given shell.
fn cmd_completions(shell: Shell) {
    clap_complete::generate(shell, &mut Cli::command(), "winder", &mut std::io::stdout());
}
