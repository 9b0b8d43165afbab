//! Engine configuration (TOML).
//!
//! Every section and key is optional:
//!
//! ```toml
//! [scheduler]
//! poll_interval_ms = 5000
//! task_pause_ms = 0
//! execution_timeout_ms = 300000   # 0 disables the deadline
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::scheduler::SchedulerConfig;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "GEOFLOW_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "geoflow.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file at {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parsing TOML config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub scheduler: SchedulerSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// `[scheduler]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Pause between polls of the queued task set.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Pause after each executed task.
    #[serde(default)]
    pub task_pause_ms: u64,

    /// Per-task execution deadline; 0 disables it.
    #[serde(default = "default_execution_timeout_ms")]
    pub execution_timeout_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_execution_timeout_ms() -> u64 {
    300_000
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            task_pause_ms: 0,
            execution_timeout_ms: default_execution_timeout_ms(),
        }
    }
}

impl SchedulerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn task_pause(&self) -> Duration {
        Duration::from_millis(self.task_pause_ms)
    }

    pub fn execution_timeout(&self) -> Option<Duration> {
        (self.execution_timeout_ms > 0).then(|| Duration::from_millis(self.execution_timeout_ms))
    }
}

impl From<&SchedulerSettings> for SchedulerConfig {
    fn from(settings: &SchedulerSettings) -> Self {
        SchedulerConfig {
            poll_interval: settings.poll_interval(),
            task_pause: settings.task_pause(),
            execution_timeout: settings.execution_timeout(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Level or filter directive (e.g. `"debug"`, `"geoflow_core=trace"`).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml(contents: &str, path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.into(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents, path)
    }

    /// Like `load_from_path`, but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(?path, "config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// `$GEOFLOW_CONFIG` if set, else `geoflow.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_file_gives_defaults() {
        let config = EngineConfig::from_toml("", "geoflow.toml").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.scheduler.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.scheduler.task_pause(), Duration::ZERO);
        assert_eq!(
            config.scheduler.execution_timeout(),
            Some(Duration::from_secs(300))
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn overrides_are_applied() {
        let toml = r#"
[scheduler]
poll_interval_ms = 250
execution_timeout_ms = 0

[logging]
level = "debug"
"#;
        let config = EngineConfig::from_toml(toml, "geoflow.toml").unwrap();
        assert_eq!(config.scheduler.poll_interval_ms, 250);
        assert_eq!(config.scheduler.task_pause_ms, 0);
        assert_eq!(config.scheduler.execution_timeout(), None);
        assert_eq!(config.logging.level, "debug");

        let scheduler = SchedulerConfig::from(&config.scheduler);
        assert_eq!(scheduler.poll_interval, Duration::from_millis(250));
        assert_eq!(scheduler.execution_timeout, None);
    }

    #[rstest]
    #[case::zero_poll("[scheduler]\npoll_interval_ms = 0\n")]
    #[case::blank_level("[logging]\nlevel = \"  \"\n")]
    fn invalid_values_are_rejected(#[case] toml: &str) {
        let err = EngineConfig::from_toml(toml, "geoflow.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = EngineConfig::from_toml("[scheduler\n", "bad.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == Path::new("bad.toml")));
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_or_default(dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geoflow.toml");
        std::fs::write(&path, "[scheduler]\ntask_pause_ms = 10\n").unwrap();

        let config = EngineConfig::load_from_path(&path).unwrap();
        assert_eq!(config.scheduler.task_pause(), Duration::from_millis(10));

        let err = EngineConfig::load_from_path(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
