//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for the filter:
//! 1. `--log-level` CLI flag
//! 2. `GEOFLOW_LOG` environment variable (level or filter directive)
//! 3. `[logging] level` from the config file
//!
//! Logs go to stderr so stdout stays machine-readable.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "GEOFLOW_LOG";

/// Initialise the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, config_level: &str) -> Result<()> {
    let directive = resolve_directive(cli_level, std::env::var(LOG_ENV).ok(), config_level);
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter {directive:?}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))?;

    Ok(())
}

fn resolve_directive(cli_level: Option<LogLevel>, env: Option<String>, config_level: &str) -> String {
    if let Some(level) = cli_level {
        return level.as_str().to_string();
    }
    env.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| config_level.to_string())
}
