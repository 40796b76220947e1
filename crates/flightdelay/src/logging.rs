//! Logging setup for the `fltdelay` binary.
//!
//! Events go to stderr so report tables and JSON on stdout stay clean. The
//! default level is WARN; each `-v` lowers it one step and `RUST_LOG`
//! replaces the whole filter when set.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the pipeline reports while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Warnings, such as an interrupted analysis.
    #[default]
    Normal,
    /// One line per built flight set.
    Verbose,
    /// Per-date fetches and skipped buckets.
    Debug,
    /// Every accepted or rejected flight.
    Trace,
}

impl Verbosity {
    /// Map `-q` and repeated `-v` flags to a verbosity. `quiet` wins.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, 2) => Self::Debug,
            (false, _) => Self::Trace,
        }
    }

    /// The most detailed level emitted.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directive used when `RUST_LOG` is unset. Only this crate's
    /// events pass; reqwest and hyper stay silent.
    #[must_use]
    pub fn default_directive(self) -> String {
        format!("flightdelay={}", self.level().as_str().to_ascii_lowercase())
    }
}

/// Install the global subscriber. Later calls are no-ops.
///
/// ```no_run
/// use flightdelay::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(1, false));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directive()));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init();
}
