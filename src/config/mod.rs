//! Configuration management.
//!
//! Layered: built-in defaults, then a TOML config file, then `WINDER_*`
//! environment variables, then CLI flags (applied by the command layer).

use crate::gc::PolicySettings;
use crate::models::RecordKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable selecting the storage backend.
pub const STORE_ENV: &str = "WINDER_STORE";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "WINDER_DATA_DIR";

/// Default seconds between watch-mode sweep passes.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// One JSON document per record under the data directory.
    #[default]
    Filesystem,
    /// Single `SQLite` database file.
    Sqlite,
    /// In-memory map, lost on exit.
    Memory,
}

impl StorageBackend {
    /// Parses a backend name, falling back to the filesystem store.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "sqlite" | "db" => Self::Sqlite,
            "memory" | "mem" => Self::Memory,
            _ => Self::Filesystem,
        }
    }

    /// Returns the backend name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Filesystem => "filesystem",
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

/// Main configuration for winder.
#[derive(Debug, Clone)]
pub struct WinderConfig {
    /// Directory holding record storage.
    pub data_dir: PathBuf,
    /// Which store adapter to open.
    pub backend: StorageBackend,
    /// Retention policy settings.
    pub policy: PolicySettings,
    /// Seconds between watch-mode sweep passes.
    pub sweep_interval_secs: u64,
    /// Port for the Prometheus exporter in watch mode, if enabled.
    pub metrics_port: Option<u16>,
}

impl Default for WinderConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: StorageBackend::default(),
            policy: PolicySettings::default(),
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            metrics_port: None,
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Storage backend name.
    pub backend: Option<String>,
    /// Watch-mode sweep interval in seconds.
    pub sweep_interval_secs: Option<u64>,
    /// Prometheus exporter port.
    pub metrics_port: Option<u16>,
    /// Retention policy section.
    pub policy: Option<ConfigFilePolicy>,
}

/// Policy section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFilePolicy {
    /// Default grace period in hours.
    pub grace_hours: Option<u32>,
    /// Default retention period in days.
    pub retention_days: Option<u32>,
    /// Minimum grace period in hours.
    pub minimum_grace_hours: Option<u32>,
    /// Minimum retention period in days.
    pub minimum_retention_days: Option<u32>,
    /// Per-kind grace overrides keyed by kind name.
    pub grace_hours_by_kind: Option<HashMap<String, u32>>,
    /// Per-kind retention overrides keyed by kind name.
    pub retention_days_by_kind: Option<HashMap<String, u32>>,
}

impl WinderConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the effective configuration.
    ///
    /// An explicit `path` must exist and parse; without one, the
    /// default locations are tried and silently skipped when absent.
    /// Environment variables are overlaid last.
    ///
    /// # Errors
    ///
    /// Returns an error only for an explicit `path` that cannot be
    /// read or parsed.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| crate::Error::Storage {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| {
            crate::Error::InvalidInput(format!("config file {}: {e}", path.display()))
        })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/winder/` on macOS)
    /// 2. XDG config dir (`~/.config/winder/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        // Check platform-specific config dir first
        let platform_config = base_dirs.config_dir().join("winder").join("config.toml");
        if platform_config.exists() {
            if let Ok(config) = Self::load_from_file(&platform_config) {
                return config;
            }
        }

        // Fall back to XDG-style ~/.config/winder/ for Unix compatibility
        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join("winder")
            .join("config.toml");
        if xdg_config.exists() {
            if let Ok(config) = Self::load_from_file(&xdg_config) {
                return config;
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `WinderConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(backend) = file.backend {
            config.backend = StorageBackend::parse(&backend);
        }
        if let Some(secs) = file.sweep_interval_secs {
            config.sweep_interval_secs = secs;
        }
        if let Some(port) = file.metrics_port {
            config.metrics_port = Some(port);
        }
        if let Some(policy) = file.policy {
            if let Some(hours) = policy.grace_hours {
                config.policy.default_grace_hours = hours;
            }
            if let Some(days) = policy.retention_days {
                config.policy.default_retention_days = days;
            }
            if let Some(hours) = policy.minimum_grace_hours {
                config.policy.minimum_grace_hours = hours;
            }
            if let Some(days) = policy.minimum_retention_days {
                config.policy.minimum_retention_days = days;
            }
            if let Some(by_kind) = policy.grace_hours_by_kind {
                for (name, hours) in by_kind {
                    if let Some(kind) = RecordKind::parse(&name) {
                        config.policy.grace_hours_by_kind.insert(kind, hours);
                    }
                }
            }
            if let Some(by_kind) = policy.retention_days_by_kind {
                for (name, days) in by_kind {
                    if let Some(kind) = RecordKind::parse(&name) {
                        config.policy.retention_days_by_kind.insert(kind, days);
                    }
                }
            }
        }

        config
    }

    /// Overlays `WINDER_*` environment variables.
    pub fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(backend) = std::env::var(STORE_ENV) {
            if !backend.is_empty() {
                self.backend = StorageBackend::parse(&backend);
            }
        }
        if let Some(secs) = std::env::var("WINDER_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.sweep_interval_secs = secs;
        }
        if let Some(port) = std::env::var("WINDER_METRICS_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.metrics_port = Some(port);
        }

        self.policy.apply_env();
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Sets the storage backend.
    #[must_use]
    pub const fn with_backend(mut self, backend: StorageBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the policy settings.
    #[must_use]
    pub fn with_policy(mut self, policy: PolicySettings) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the watch-mode sweep interval.
    #[must_use]
    pub const fn with_sweep_interval_secs(mut self, secs: u64) -> Self {
        self.sweep_interval_secs = secs;
        self
    }

    /// Directory holding the filesystem store's JSON documents.
    #[must_use]
    pub fn records_dir(&self) -> PathBuf {
        self.data_dir.join("records")
    }

    /// Path of the `SQLite` database file.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("records.db")
    }
}

fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".winder"),
        |dirs| dirs.data_local_dir().join("winder"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse() {
        assert_eq!(StorageBackend::parse("sqlite"), StorageBackend::Sqlite);
        assert_eq!(StorageBackend::parse("MEMORY"), StorageBackend::Memory);
        assert_eq!(
            StorageBackend::parse("filesystem"),
            StorageBackend::Filesystem
        );
        assert_eq!(StorageBackend::parse("what"), StorageBackend::Filesystem);
    }

    #[test]
    fn test_default_config() {
        let config = WinderConfig::default();
        assert_eq!(config.backend, StorageBackend::Filesystem);
        assert_eq!(config.sweep_interval_secs, 3600);
        assert_eq!(config.metrics_port, None);
        assert_eq!(config.policy.default_grace_hours, 24);
    }

    #[test]
    fn test_from_config_file_full() {
        let toml = r#"
            data_dir = "/var/lib/winder"
            backend = "sqlite"
            sweep_interval_secs = 900
            metrics_port = 9184

            [policy]
            grace_hours = 48
            retention_days = 60

            [policy.grace_hours_by_kind]
            location-share = 6
            bogus-kind = 99
        "#;
        let file: ConfigFile = toml::from_str(toml).unwrap();
        let config = WinderConfig::from_config_file(file);

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/winder"));
        assert_eq!(config.backend, StorageBackend::Sqlite);
        assert_eq!(config.sweep_interval_secs, 900);
        assert_eq!(config.metrics_port, Some(9184));
        assert_eq!(config.policy.default_grace_hours, 48);
        assert_eq!(config.policy.default_retention_days, 60);
        assert_eq!(
            config
                .policy
                .grace_hours_by_kind
                .get(&RecordKind::LocationShare),
            Some(&6)
        );
        // Unknown kind names are ignored
        assert_eq!(config.policy.grace_hours_by_kind.len(), 1);
    }

    #[test]
    fn test_from_config_file_partial_keeps_defaults() {
        let file: ConfigFile = toml::from_str("backend = \"memory\"").unwrap();
        let config = WinderConfig::from_config_file(file);

        assert_eq!(config.backend, StorageBackend::Memory);
        assert_eq!(config.sweep_interval_secs, 3600);
        assert_eq!(config.policy.default_retention_days, 30);
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        let err = WinderConfig::load_from_file(Path::new("/nonexistent/winder.toml")).unwrap_err();
        assert!(matches!(err, crate::Error::Storage { .. }));
    }

    #[test]
    fn test_storage_paths() {
        let config = WinderConfig::default().with_data_dir("/tmp/w");
        assert_eq!(config.records_dir(), PathBuf::from("/tmp/w/records"));
        assert_eq!(config.db_path(), PathBuf::from("/tmp/w/records.db"));
    }
}
