//! The analysis pipeline: source + clock + look-back interval.
//!
//! [`Analysis`] produces the canonical flight set and its delay series. The
//! free functions below turn that series into the reports the CLI prints.

use tracing::debug;

use crate::builder::FlightSetBuilder;
use crate::clock::Clock;
use crate::config::Config;
use crate::error::Result;
use crate::flight::{Direction, Flight};
use crate::source::{RecordSource, SourceMode};
use crate::stats::{correct_outliers, delays, Distribution, Histogram, Summary};

/// A configured flight analysis.
#[derive(Debug)]
pub struct Analysis {
    source: Box<dyn RecordSource>,
    clock: Box<dyn Clock>,
    interval_days: u32,
}

impl Analysis {
    /// Create an analysis over `interval_days` days up to `clock.now()`.
    #[must_use]
    pub fn new(
        source: Box<dyn RecordSource>,
        clock: Box<dyn Clock>,
        interval_days: u32,
    ) -> Self {
        Self {
            source,
            clock,
            interval_days,
        }
    }

    /// Build the analysis described by `config` for `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured clock is invalid.
    pub fn from_config(config: &Config, mode: SourceMode) -> Result<Self> {
        Ok(Self::new(
            config.record_source(mode),
            config.clock(mode)?,
            config.analysis.interval_days,
        ))
    }

    /// Override the look-back interval.
    #[must_use]
    pub fn with_interval_days(mut self, interval_days: u32) -> Self {
        self.interval_days = interval_days;
        self
    }

    /// The look-back interval in days.
    #[must_use]
    pub fn interval_days(&self) -> u32 {
        self.interval_days
    }

    /// The record source in use.
    #[must_use]
    pub fn source(&self) -> &dyn RecordSource {
        self.source.as_ref()
    }

    /// The deduplicated flights, ordered by actual time.
    ///
    /// # Errors
    ///
    /// Returns the first fetch or normalization error.
    pub async fn flights(&self, direction: Direction) -> Result<Vec<Flight>> {
        let reference_time = self.clock.now();
        debug!(%reference_time, interval_days = self.interval_days, "Starting analysis");

        FlightSetBuilder::new(self.source.as_ref())
            .build(direction, self.interval_days, reference_time)
            .await
    }

    /// Delay minutes of every flight, in actual-time order.
    ///
    /// # Errors
    ///
    /// Returns the first fetch or normalization error.
    pub async fn delays(&self, direction: Direction) -> Result<Vec<i64>> {
        Ok(delays(&self.flights(direction).await?))
    }
}

/// Summary statistics of the delays.
///
/// # Errors
///
/// Returns pipeline errors, or [`crate::Error::InsufficientData`] with fewer
/// than two flights.
pub async fn summarize(analysis: &Analysis, direction: Direction) -> Result<Summary> {
    Summary::from_delays(&analysis.delays(direction).await?)
}

/// Per-minute delay distribution with a normal fit.
///
/// # Errors
///
/// Returns pipeline errors, or [`crate::Error::InsufficientData`] with fewer
/// than two flights.
pub async fn distribution(analysis: &Analysis, direction: Direction) -> Result<Distribution> {
    Distribution::from_delays(&analysis.delays(direction).await?)
}

/// Histogram of the delays after dropping outliers beyond `threshold`
/// standard deviations.
///
/// # Errors
///
/// Returns pipeline errors, [`crate::Error::InsufficientData`] with fewer
/// than two flights, or a validation error for a zero `bin_size`.
pub async fn corrected_histogram(
    analysis: &Analysis,
    direction: Direction,
    threshold: f64,
    bin_size: u32,
) -> Result<Histogram> {
    let raw = analysis.delays(direction).await?;
    let kept = correct_outliers(&raw, threshold)?;
    debug!(
        dropped = raw.len() - kept.len(),
        threshold, "Removed outliers"
    );
    Histogram::from_delays(&kept, bin_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tests::{bucket, date, group, reference, MemorySource};
    use crate::clock::FixedClock;

    fn analysis(source: MemorySource, days: u32) -> Analysis {
        Analysis::new(Box::new(source), Box::new(FixedClock(reference())), days)
    }

    fn arrivals() -> MemorySource {
        let mut source = MemorySource::default();
        source.add(
            date(14),
            crate::flight::Direction::Arrival,
            bucket(
                14,
                vec![
                    group("08:00", "At gate 08:05", "BKK", "CX 700"),
                    group("09:00", "At gate 09:10", "SIN", "CX 710"),
                    group("10:00", "At gate 09:50", "TPE", "CX 465"),
                    group("11:00", "At gate 11:20", "NRT", "CX 505"),
                ],
            ),
        );
        source
    }

    #[tokio::test]
    async fn test_delays_follow_actual_time() {
        let analysis = analysis(arrivals(), 1);
        let delays = analysis.delays(Direction::Arrival).await.unwrap();
        assert_eq!(delays, vec![5, 10, -10, 20]);
    }

    #[tokio::test]
    async fn test_summarize() {
        let summary = summarize(&analysis(arrivals(), 1), Direction::Arrival)
            .await
            .unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.min, -10);
        assert_eq!(summary.max, 20);
        assert!((summary.mean - 6.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_summarize_without_flights() {
        let err = summarize(&analysis(MemorySource::default(), 1), Direction::Arrival)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::InsufficientData { found: 0, .. }));
    }

    #[tokio::test]
    async fn test_distribution() {
        let dist = distribution(&analysis(arrivals(), 1), Direction::Arrival)
            .await
            .unwrap();
        assert_eq!(dist.points.len(), 31);
    }

    #[tokio::test]
    async fn test_corrected_histogram() {
        let hist = corrected_histogram(&analysis(arrivals(), 1), Direction::Arrival, 10.0, 10)
            .await
            .unwrap();
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.bins[0].start, -10);
    }

    #[test]
    fn test_with_interval_days() {
        let analysis = analysis(MemorySource::default(), 1).with_interval_days(30);
        assert_eq!(analysis.interval_days(), 30);
        assert_eq!(analysis.source().name(), "memory");
    }

    #[test]
    fn test_from_config() {
        let config = Config::default();
        let analysis = Analysis::from_config(&config, SourceMode::Replay).unwrap();
        assert!(analysis.source().is_replay());
        assert_eq!(analysis.interval_days(), 90);
    }
}
