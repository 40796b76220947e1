//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::config::MAX_INTERVAL_DAYS;
use crate::flight::Direction;
use crate::source::SourceMode;

/// Parse an outlier threshold, accepting only positive finite numbers.
fn parse_threshold(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{raw} is not a positive number"))
    }
}

/// Flight selection shared by every analysis command.
#[derive(Debug, Clone, Args)]
pub struct FlightArgs {
    /// Analyse departures instead of arrivals
    #[arg(short, long)]
    pub departure: bool,

    /// Days to look back (defaults to the configured interval)
    #[arg(
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_INTERVAL_DAYS))
    )]
    pub days: Option<u32>,
}

impl FlightArgs {
    /// The selected direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        if self.departure {
            Direction::Departure
        } else {
            Direction::Arrival
        }
    }
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    #[command(flatten)]
    pub flights: FlightArgs,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Distribution command arguments.
#[derive(Debug, Args)]
pub struct DistributionCommand {
    #[command(flatten)]
    pub flights: FlightArgs,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Histogram command arguments.
#[derive(Debug, Args)]
pub struct HistogramCommand {
    #[command(flatten)]
    pub flights: FlightArgs,

    /// Bin width in minutes (defaults to the configured size)
    #[arg(short, long)]
    pub bin_size: Option<u32>,

    /// Outlier threshold in standard deviations (defaults to the configured value)
    #[arg(short, long, value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Flights command arguments.
#[derive(Debug, Args)]
pub struct FlightsCommand {
    #[command(flatten)]
    pub flights: FlightArgs,

    /// Maximum number of flights to print
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Snapshot command arguments.
#[derive(Debug, Args)]
pub struct SnapshotCommand {
    /// Number of days before today to download
    #[arg(long, default_value = "91")]
    pub days: u32,

    /// Directory to write into (defaults to the configured cache directory)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Source mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceModeArg {
    /// Saved payloads and the fixed replay reference time
    Replay,
    /// The live API and the current time
    Live,
}

impl From<SourceModeArg> for SourceMode {
    fn from(arg: SourceModeArg) -> Self {
        match arg {
            SourceModeArg::Replay => Self::Replay,
            SourceModeArg::Live => Self::Live,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
