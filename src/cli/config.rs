//! Config command.

// Allow print_stdout/stderr in CLI module (consistent with main.rs)
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

use crate::Result;
use crate::config::WinderConfig;
use crate::models::RecordKind;

/// Executes the config command.
///
/// # Errors
///
/// Currently infallible; the signature matches the other commands.
pub fn cmd_config(config: &WinderConfig, show: bool) -> Result<()> {
    if !show {
        println!("Use --show to display configuration");
        println!();
        println!("Configuration is read from config.toml, then overridden by");
        println!("WINDER_* environment variables and command-line flags.");
        return Ok(());
    }

    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("Data Directory: {}", config.data_dir.display());
    println!("Storage Backend: {}", config.backend.as_str());
    println!("Sweep Interval: {}s", config.sweep_interval_secs);
    println!(
        "Metrics Port: {}",
        config
            .metrics_port
            .map_or_else(|| "(disabled)".to_string(), |p| p.to_string())
    );
    println!();
    println!("Retention Policy:");
    for kind in RecordKind::all() {
        println!(
            "  {}: grace {}h, retention {}d",
            kind,
            config.policy.effective_grace_hours(*kind),
            config.policy.effective_retention_days(*kind),
        );
    }
    println!(
        "  Minimum grace: {}h, minimum retention: {}d",
        config.policy.minimum_grace_hours, config.policy.minimum_retention_days
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_config_show() {
        let config = WinderConfig::default();
        assert!(cmd_config(&config, true).is_ok());
        assert!(cmd_config(&config, false).is_ok());
    }
}
