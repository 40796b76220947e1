//! `flightdelay` - Delay statistics for Hong Kong International Airport
//!
//! This library turns the airport's past-flight records into a canonical,
//! deduplicated set of [`Flight`]s and computes delay statistics over them.
//!
//! The pipeline runs in four stages:
//!
//! 1. [`status`] parses free-text status strings such as `At gate 13:05 (15/11/2023)`
//!    into actual timestamps.
//! 2. [`normalize`] validates a raw record group and accepts it when its actual
//!    time falls inside the analysis window.
//! 3. [`builder`] fetches one day at a time from a [`source::RecordSource`] and
//!    deduplicates the accepted flights.
//! 4. [`stats`] computes delays, summary statistics and outlier-corrected
//!    histograms.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod builder;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod flight;
pub mod logging;
pub mod normalize;
pub mod record;
pub mod source;
pub mod stats;
pub mod status;

pub use analysis::Analysis;
pub use builder::{FlightSet, FlightSetBuilder};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use flight::{Direction, Flight, FlightIdentifier};
pub use logging::init_logging;
pub use source::{RecordSource, SourceMode};
pub use stats::{correct_outliers, Histogram, Summary};
