//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "geoflow",
    version,
    about = "Build workflows from YAML definitions and drive their tasks to completion.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the engine config file (TOML).
    ///
    /// Default: `$GEOFLOW_CONFIG`, else `geoflow.toml` in the working directory.
    /// A missing file means built-in defaults.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GEOFLOW_LOG`, then `[logging] level` from the config is used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create a workflow in an in-memory store and run it until it settles.
    Run(RunArgs),

    /// Parse and validate a workflow definition without running anything.
    Validate(ValidateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Workflow definition (YAML).
    #[arg(long, value_name = "PATH")]
    pub definition: PathBuf,

    /// Client identifier recorded on the workflow and its tasks.
    #[arg(long, value_name = "ID")]
    pub client_id: String,

    /// Initial payload shared by every task (a GeoJSON geometry file).
    #[arg(long, value_name = "PATH")]
    pub payload: PathBuf,

    /// Give up after this many scheduler cycles.
    #[arg(long, value_name = "N", default_value_t = 100)]
    pub max_cycles: usize,
}

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Workflow definition (YAML).
    #[arg(long, value_name = "PATH")]
    pub definition: PathBuf,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
