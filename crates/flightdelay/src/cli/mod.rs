//! Command-line interface for flightdelay.
//!
//! This module provides the CLI structure for the `fltdelay` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DistributionCommand, FlightArgs, FlightsCommand, HistogramCommand,
    OutputFormat, SnapshotCommand, SourceModeArg, StatsCommand,
};

/// fltdelay - Delay statistics for Hong Kong International Airport
///
/// Fetches past arrivals or departures, normalizes their status text into
/// timestamps and reports how late they were.
#[derive(Debug, Parser)]
#[command(name = "fltdelay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where to read flights from (overrides the configured mode)
    #[arg(short, long, global = true, value_enum)]
    pub mode: Option<SourceModeArg>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mean, median, mode, standard deviation and range of delays
    Stats(StatsCommand),

    /// Flight count for every delay minute with a fitted normal curve
    Distribution(DistributionCommand),

    /// Binned delays after removing outliers
    Histogram(HistogramCommand),

    /// List the normalized flights
    Flights(FlightsCommand),

    /// Download past payloads from the live API into the cache
    Snapshot(SnapshotCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.verbose, self.quiet)
    }
}
