//! `fltdelay` - CLI for flightdelay
//!
//! This binary fetches past Hong Kong International Airport flights and prints
//! delay statistics over them.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::IsTerminal;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use flightdelay::analysis::{corrected_histogram, distribution, summarize};
use flightdelay::cli::{Cli, Command, ConfigCommand, FlightArgs, OutputFormat};
use flightdelay::logging::Verbosity;
use flightdelay::source::snapshot;
use flightdelay::{init_logging, Analysis, Clock, Config, Error, SourceMode, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let verbosity = cli.verbosity();
    init_logging(verbosity);

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;
    let mode = cli.mode.map_or(config.source.mode, SourceMode::from);

    let command = match cli.command {
        Command::Config(config_cmd) => return handle_config(&config, config_cmd),
        command => command,
    };

    let spinner = spawn_spinner(verbosity == Verbosity::Normal);
    let result = tokio::select! {
        result = run(&config, mode, command) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, abandoning outstanding requests");
            Err(Error::Cancelled.into())
        }
    };
    if let Some(handle) = spinner {
        handle.abort();
        eprint!("\r{:20}\r", "");
    }
    result
}

/// Print a progress indicator on stderr until aborted.
fn spawn_spinner(enabled: bool) -> Option<JoinHandle<()>> {
    if !enabled || !std::io::stderr().is_terminal() {
        return None;
    }

    Some(tokio::spawn(async {
        let mut ticker = tokio::time::interval(Duration::from_millis(120));
        for frame in ['|', '/', '-', '\\'].iter().cycle() {
            ticker.tick().await;
            eprint!("\rFetching... {frame}");
        }
    }))
}

fn build_analysis(config: &Config, mode: SourceMode, args: &FlightArgs) -> anyhow::Result<Analysis> {
    let mut analysis = Analysis::from_config(config, mode)?;
    if let Some(days) = args.days {
        analysis = analysis.with_interval_days(days);
    }
    info!(
        source = analysis.source().name(),
        direction = %args.direction(),
        days = analysis.interval_days(),
        "Analysing flights"
    );
    Ok(analysis)
}

async fn run(config: &Config, mode: SourceMode, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Stats(cmd) => {
            let analysis = build_analysis(config, mode, &cmd.flights)?;
            let summary = summarize(&analysis, cmd.flights.direction()).await?;
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Delay statistics ({}s)", cmd.flights.direction());
                println!("----------------------------");
                println!("Flights:       {}", summary.count);
                println!("Mean:          {:.2} min", summary.mean);
                println!("Median:        {:.1} min", summary.median);
                println!("Mode:          {} min", summary.mode);
                println!("Std deviation: {:.2} min", summary.stdev);
                println!("Range:         {} .. {} min", summary.min, summary.max);
            }
        }
        Command::Distribution(cmd) => {
            let analysis = build_analysis(config, mode, &cmd.flights)?;
            let dist = distribution(&analysis, cmd.flights.direction()).await?;
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&dist)?);
            } else {
                println!("{:>7}  {:>6}  {:>9}", "Delay", "Count", "Expected");
                for point in dist.points.iter().filter(|p| p.count > 0) {
                    println!(
                        "{:>7}  {:>6}  {:>9.2}",
                        point.minute, point.count, point.expected
                    );
                }
            }
        }
        Command::Histogram(cmd) => {
            let analysis = build_analysis(config, mode, &cmd.flights)?;
            let threshold = cmd.threshold.unwrap_or(config.analysis.outlier_threshold);
            let bin_size = cmd.bin_size.unwrap_or(config.analysis.bin_size);
            let hist =
                corrected_histogram(&analysis, cmd.flights.direction(), threshold, bin_size).await?;
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&hist)?);
            } else {
                let widest = hist.bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
                for bin in &hist.bins {
                    let bar = "#".repeat(bin.count * 50 / widest);
                    println!("{:>6} .. {:<6} {:>6}  {bar}", bin.start, bin.end, bin.count);
                }
                let fit = hist.normal_fit()?;
                println!();
                println!(
                    "Normal fit: mean {:.2} min, std deviation {:.2} min ({} flights)",
                    fit.mean,
                    fit.stdev,
                    hist.total()
                );
            }
        }
        Command::Flights(cmd) => {
            let analysis = build_analysis(config, mode, &cmd.flights)?;
            let mut flights = analysis.flights(cmd.flights.direction()).await?;
            if let Some(limit) = cmd.limit {
                flights.truncate(limit);
            }
            match cmd.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&flights)?),
                OutputFormat::Table => {
                    println!(
                        "{:<17}  {:<17}  {:>6}  {:<24}  Airports",
                        "Scheduled", "Actual", "Delay", "Flights"
                    );
                    for flight in &flights {
                        let codes: Vec<&str> = flight
                            .flight_codes
                            .iter()
                            .map(|c| c.flight_number.as_str())
                            .collect();
                        println!(
                            "{:<17}  {:<17}  {:>6}  {:<24}  {}",
                            flight.estimated_time.format("%Y-%m-%d %H:%M"),
                            flight.actual_time.format("%Y-%m-%d %H:%M"),
                            flight.delay_minutes(),
                            codes.join(", "),
                            flight.airports.join(", ")
                        );
                    }
                    println!();
                    println!("{} flights", flights.len());
                }
            }
        }
        Command::Snapshot(cmd) => {
            let cache_dir = cmd.cache_dir.unwrap_or_else(|| config.cache_dir());
            let today = SystemClock::with_offset_hours(config.analysis.timezone_offset_hours)?
                .now()
                .date_naive();
            let written = snapshot(&config.live_source(), &cache_dir, cmd.days, today).await?;
            println!(
                "Wrote {} payloads to {}",
                written.len(),
                cache_dir.display()
            );
        }
        Command::Config(config_cmd) => handle_config(config, config_cmd)?,
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Source]");
                println!("  Mode:               {}", config.source.mode);
                println!("  Cache directory:    {}", config.cache_dir().display());
                println!("  URL template:       {}", config.source.url_template);
                println!(
                    "  Request timeout:    {}s",
                    config.source.request_timeout_secs
                );
                println!();
                println!("[Analysis]");
                println!("  Interval (days):    {}", config.analysis.interval_days);
                println!(
                    "  UTC offset (hours): {}",
                    config.analysis.timezone_offset_hours
                );
                println!("  Replay reference:   {}", config.analysis.replay_reference);
                println!("  Outlier threshold:  {}", config.analysis.outlier_threshold);
                println!("  Bin size (min):     {}", config.analysis.bin_size);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
