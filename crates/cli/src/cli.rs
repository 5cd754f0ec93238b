//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Fake range sensor - synthesizes a down-facing rangefinder from pose telemetry
#[derive(Parser, Debug)]
#[command(
    name = "fake-range-sensor",
    author,
    version,
    about = "Synthetic down-facing range sensor driven by pose telemetry",
    long_about = "Subscribes to pose telemetry, converts the vertical coordinate into a \n\
                  VL53L1X-style range reading and publishes it on the range topic.\n\n\
                  Pose samples come from a recorded JSON-lines flight or a scripted \n\
                  altitude profile; readings are routed to log, file or UDP sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FAKE_SENSOR_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FAKE_SENSOR_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sensor
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display the sensor model and wiring
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone, Default)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults if omitted
    #[arg(short, long, env = "FAKE_SENSOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Replay a JSON-lines pose recording instead of the configured source (`-` for stdin)
    #[arg(long, env = "FAKE_SENSOR_REPLAY")]
    pub replay: Option<PathBuf>,

    /// Replay speed multiplier (0 = as fast as possible)
    #[arg(long, env = "FAKE_SENSOR_REPLAY_SPEED")]
    pub replay_speed: Option<f64>,

    /// Loop the replay until stopped
    #[arg(long)]
    pub replay_loop: bool,

    /// Stop after this many range readings (0 = unlimited)
    #[arg(long, default_value = "0", env = "FAKE_SENSOR_MAX_READINGS")]
    pub max_readings: u64,

    /// Stop after this many seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "FAKE_SENSOR_TIMEOUT")]
    pub timeout: u64,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "FAKE_SENSOR_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, env = "FAKE_SENSOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, env = "FAKE_SENSOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
