//! Canonical flight records.
//!
//! A [`Flight`] is the value produced by the normalization pipeline: one
//! arrival or departure with full timestamps. Deduplication goes through
//! the explicit [`FlightKey`] rather than whole-object equality.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// UTC offset of Hong Kong time in seconds.
pub const HKT_OFFSET_SECS: i32 = 8 * 60 * 60;

/// The fixed UTC+8 offset every flight timestamp is tagged with.
///
/// # Panics
///
/// Never: [`HKT_OFFSET_SECS`] is well inside the ±24h range `FixedOffset`
/// accepts.
#[must_use]
pub fn hkt() -> FixedOffset {
    static OFFSET: OnceLock<FixedOffset> = OnceLock::new();
    *OFFSET.get_or_init(|| FixedOffset::east_opt(HKT_OFFSET_SECS).expect("UTC+8 is a valid offset"))
}

/// Combine a wall-clock date and time in Hong Kong into a timestamp.
#[must_use]
pub fn at_hkt(date: NaiveDate, time: NaiveTime) -> DateTime<FixedOffset> {
    let offset = hkt();
    DateTime::from_naive_utc_and_offset(date.and_time(time) - offset, offset)
}

/// Whether a flight arrives at or departs from the airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Inbound flight.
    Arrival,
    /// Outbound flight.
    Departure,
}

impl Direction {
    /// Returns `true` for arrivals.
    #[must_use]
    pub fn is_arrival(self) -> bool {
        matches!(self, Self::Arrival)
    }

    /// Directory name used by the replay cache.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arrival => "arrival",
            Self::Departure => "departure",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flight number and the airline operating under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightIdentifier {
    /// Flight number, e.g. `CX 251`.
    pub flight_number: String,
    /// ICAO airline code, e.g. `CPA`.
    pub airline: String,
}

impl FlightIdentifier {
    /// Create a new identifier.
    #[must_use]
    pub fn new(flight_number: impl Into<String>, airline: impl Into<String>) -> Self {
        Self {
            flight_number: flight_number.into(),
            airline: airline.into(),
        }
    }
}

/// One arrival or departure event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    /// `true` for arrivals, `false` for departures.
    pub is_arrival: bool,

    /// Scheduled time, on the query date.
    pub estimated_time: DateTime<FixedOffset>,

    /// Observed gate or departure time.
    pub actual_time: DateTime<FixedOffset>,

    /// Origins for arrivals, destinations for departures.
    pub airports: Vec<String>,

    /// Codeshare flight numbers sharing this movement.
    pub flight_codes: Vec<FlightIdentifier>,
}

impl Flight {
    /// The key this flight is deduplicated under.
    #[must_use]
    pub fn key(&self) -> FlightKey {
        FlightKey {
            is_arrival: self.is_arrival,
            estimated_time: self.estimated_time,
            actual_time: self.actual_time,
            airports: self.airports.join("-"),
            flight_numbers: self
                .flight_codes
                .iter()
                .map(|code| code.flight_number.as_str())
                .collect::<Vec<_>>()
                .join(";"),
        }
    }

    /// The direction of this flight.
    #[must_use]
    pub fn direction(&self) -> Direction {
        if self.is_arrival {
            Direction::Arrival
        } else {
            Direction::Departure
        }
    }

    /// Delay in whole minutes, rounded towards negative infinity.
    #[must_use]
    pub fn delay_minutes(&self) -> i64 {
        (self.actual_time - self.estimated_time)
            .num_seconds()
            .div_euclid(60)
    }
}

/// Composite deduplication key of a [`Flight`].
///
/// Airline codes are not part of the key: two records that differ only in
/// airline collapse into one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlightKey {
    /// Arrival flag.
    pub is_arrival: bool,
    /// Scheduled time.
    pub estimated_time: DateTime<FixedOffset>,
    /// Observed time.
    pub actual_time: DateTime<FixedOffset>,
    /// Airports joined with `-`.
    pub airports: String,
    /// Flight numbers joined with `;`.
    pub flight_numbers: String,
}
