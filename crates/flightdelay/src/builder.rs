//! Building the deduplicated, time-ordered flight set for an analysis.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::flight::{Direction, Flight, FlightKey};
use crate::normalize::{normalize, Window};
use crate::source::RecordSource;

/// Flights deduplicated by [`FlightKey`], remembering insertion order.
#[derive(Debug, Default)]
pub struct FlightSet {
    seen: HashSet<FlightKey>,
    flights: Vec<Flight>,
}

impl FlightSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a flight. Returns `false` if its key was already present, in
    /// which case the earlier flight is kept.
    pub fn insert(&mut self, flight: Flight) -> bool {
        if self.seen.insert(flight.key()) {
            self.flights.push(flight);
            true
        } else {
            false
        }
    }

    /// Number of distinct flights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    /// Check if no flight has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Consume the set, ordered by actual time. Ties keep insertion order.
    #[must_use]
    pub fn into_sorted(mut self) -> Vec<Flight> {
        self.flights.sort_by_key(|f| f.actual_time);
        self.flights
    }
}

/// Drives a [`RecordSource`] over an analysis window.
#[derive(Debug)]
pub struct FlightSetBuilder<'a> {
    source: &'a dyn RecordSource,
}

impl<'a> FlightSetBuilder<'a> {
    /// Create a builder reading from `source`.
    #[must_use]
    pub fn new(source: &'a dyn RecordSource) -> Self {
        Self { source }
    }

    /// Collect every flight whose actual time falls in the `interval_days`
    /// days up to `reference_time`, sorted by actual time.
    ///
    /// Dates are fetched one at a time, oldest first. Departures read from a
    /// replay source skip the window check entirely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] if the window cannot be
    /// represented. Any fetch or normalization error aborts the build; no
    /// partial result is returned.
    pub async fn build(
        &self,
        direction: Direction,
        interval_days: u32,
        reference_time: DateTime<FixedOffset>,
    ) -> Result<Vec<Flight>> {
        let window = Window::ending_at(reference_time, interval_days)?;
        let bypass_window = direction == Direction::Departure && self.source.is_replay();

        debug!(
            source = self.source.name(),
            %direction,
            lower = %window.lower,
            upper = %window.upper,
            bypass_window,
            "Building flight set"
        );

        let mut set = FlightSet::new();
        let mut duplicates = 0usize;

        for date in window.dates() {
            let buckets = self
                .source
                .fetch_buckets(date, direction)
                .await
                .map_err(|e| Error::fetch(date, e))?;
            debug!(%date, buckets = buckets.len(), "Fetched buckets");

            let wanted = date.format("%Y-%m-%d").to_string();
            for bucket in buckets {
                // Carryover from adjacent days is picked up by their own query
                if bucket.date != wanted {
                    debug!("Skipping bucket dated {} in query for {wanted}", bucket.date);
                    continue;
                }

                for group in &bucket.list {
                    if let Some(flight) = normalize(group, direction, date, &window, bypass_window)? {
                        trace!(
                            flight = %flight.key().flight_numbers,
                            actual = %flight.actual_time,
                            "Accepted flight"
                        );
                        if !set.insert(flight) {
                            duplicates += 1;
                        }
                    }
                }
            }
        }

        info!(
            %direction,
            flights = set.len(),
            duplicates,
            "Built flight set"
        );

        Ok(set.into_sorted())
    }
}
