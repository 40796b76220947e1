//! Status text parsing.
//!
//! The flight information API reports what happened to a flight as free
//! text. Only two shapes matter here:
//!
//! - arrivals: `At gate HH:MM` or `At gate HH:MM (DD/MM/YYYY)`
//! - departures: `Dep HH:MM` or `Dep HH:MM (DD/MM/YYYY)`
//!
//! The parenthesized date appears when the actual time falls on a different
//! day than the scheduled one. Everything else (`Cancelled`, `Est at 10:20`,
//! an empty string, ...) is not an event yet.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use regex::Regex;

use crate::error::{Error, Result};
use crate::flight::{at_hkt, Direction};

/// Marker tokens that open a relevant arrival status.
const ARRIVAL_MARKER: [&str; 2] = ["At", "gate"];

/// Marker token that opens a relevant departure status.
const DEPARTURE_MARKER: [&str; 1] = ["Dep"];

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid time pattern"))
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\((\d{1,2})/(\d{1,2})/(\d{4})\)$").expect("valid date pattern")
    })
}

/// What a status string says about a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// The flight has not arrived or departed, or the status is not understood.
    Irrelevant,

    /// Actual time on the query date.
    SameDay(NaiveTime),

    /// Actual time on an explicitly given date.
    CrossMidnight {
        /// Time of day.
        time: NaiveTime,
        /// The date from the parenthesized token.
        date: NaiveDate,
    },
}

impl StatusOutcome {
    /// Resolve the outcome into a timestamp relative to `query_date`.
    #[must_use]
    pub fn actual_time(self, query_date: NaiveDate) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Irrelevant => None,
            Self::SameDay(time) => Some(at_hkt(query_date, time)),
            Self::CrossMidnight { time, date } => Some(at_hkt(date, time)),
        }
    }
}

/// Classify a status string.
///
/// Unexpected token counts after a matching marker are treated as
/// [`StatusOutcome::Irrelevant`].
///
/// # Errors
///
/// Returns [`Error::MalformedStatus`] if the time token is not `HH:MM` or the
/// date token is not a valid `(DD/MM/YYYY)`.
pub fn classify(status: &str, direction: Direction) -> Result<StatusOutcome> {
    let tokens: Vec<&str> = status.split_whitespace().collect();

    let marker: &[&str] = match direction {
        Direction::Arrival => &ARRIVAL_MARKER,
        Direction::Departure => &DEPARTURE_MARKER,
    };

    // The time token sits right after the marker
    let time_index = marker.len();
    if tokens.len() <= time_index || tokens[..time_index] != *marker {
        return Ok(StatusOutcome::Irrelevant);
    }

    match tokens.len() - time_index {
        1 => Ok(StatusOutcome::SameDay(parse_time(status, tokens[time_index])?)),
        2 => Ok(StatusOutcome::CrossMidnight {
            time: parse_time(status, tokens[time_index])?,
            date: parse_date(status, tokens[time_index + 1])?,
        }),
        _ => Ok(StatusOutcome::Irrelevant),
    }
}

/// Parse a status string into the actual time of the flight, if any.
///
/// # Errors
///
/// Returns [`Error::MalformedStatus`] on an unparsable time or date token.
pub fn parse_status(
    status: &str,
    direction: Direction,
    query_date: NaiveDate,
) -> Result<Option<DateTime<FixedOffset>>> {
    Ok(classify(status, direction)?.actual_time(query_date))
}

fn parse_time(status: &str, token: &str) -> Result<NaiveTime> {
    let caps = time_pattern()
        .captures(token)
        .ok_or_else(|| Error::malformed_status(status, format!("bad time token '{token}'")))?;

    let hour: u32 = caps[1]
        .parse()
        .map_err(|_| Error::malformed_status(status, "bad hour"))?;
    let minute: u32 = caps[2]
        .parse()
        .map_err(|_| Error::malformed_status(status, "bad minute"))?;

    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| Error::malformed_status(status, format!("time out of range '{token}'")))
}

fn parse_date(status: &str, token: &str) -> Result<NaiveDate> {
    let caps = date_pattern()
        .captures(token)
        .ok_or_else(|| Error::malformed_status(status, format!("bad date token '{token}'")))?;

    // Day comes first, then month, then year
    let day: u32 = caps[1]
        .parse()
        .map_err(|_| Error::malformed_status(status, "bad day"))?;
    let month: u32 = caps[2]
        .parse()
        .map_err(|_| Error::malformed_status(status, "bad month"))?;
    let year: i32 = caps[3]
        .parse()
        .map_err(|_| Error::malformed_status(status, "bad year"))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::malformed_status(status, format!("no such date '{token}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rfc3339(status: &str, direction: Direction, query: NaiveDate) -> Option<String> {
        parse_status(status, direction, query)
            .unwrap()
            .map(|t| t.to_rfc3339())
    }

    #[test]
    fn test_arrival_same_day() {
        assert_eq!(
            rfc3339("At gate 09:15", Direction::Arrival, date(2023, 11, 1)),
            Some("2023-11-01T09:15:00+08:00".to_string())
        );
    }

    #[test]
    fn test_arrival_cross_midnight() {
        assert_eq!(
            rfc3339(
                "At gate 00:05 (02/11/2023)",
                Direction::Arrival,
                date(2023, 11, 1)
            ),
            Some("2023-11-02T00:05:00+08:00".to_string())
        );
    }

    #[test]
    fn test_departure_same_day() {
        assert_eq!(
            rfc3339("Dep 14:30", Direction::Departure, date(2023, 11, 14)),
            Some("2023-11-14T14:30:00+08:00".to_string())
        );
    }

    #[test]
    fn test_departure_cross_midnight() {
        assert_eq!(
            rfc3339(
                "Dep 23:50 (15/11/2023)",
                Direction::Departure,
                date(2023, 11, 14)
            ),
            Some("2023-11-15T23:50:00+08:00".to_string())
        );
    }

    #[test]
    fn test_day_month_order() {
        // 03/12 is the 3rd of December, not the 12th of March
        let outcome = classify("At gate 00:10 (03/12/2023)", Direction::Arrival).unwrap();
        assert_eq!(
            outcome,
            StatusOutcome::CrossMidnight {
                time: NaiveTime::from_hms_opt(0, 10, 0).unwrap(),
                date: date(2023, 12, 3),
            }
        );
    }

    #[test]
    fn test_irrelevant_statuses() {
        let query = date(2023, 11, 1);
        for status in ["Cancelled", "", "   ", "Est at 10:20", "Delayed", "At", "Dep"] {
            assert_eq!(rfc3339(status, Direction::Arrival, query), None, "{status}");
            assert_eq!(rfc3339(status, Direction::Departure, query), None, "{status}");
        }
    }

    #[test]
    fn test_marker_is_direction_specific() {
        let query = date(2023, 11, 1);
        assert_eq!(rfc3339("Dep 14:30", Direction::Arrival, query), None);
        assert_eq!(rfc3339("At gate 09:15", Direction::Departure, query), None);
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        let query = date(2023, 11, 1);
        assert_eq!(rfc3339("at gate 09:15", Direction::Arrival, query), None);
        assert_eq!(rfc3339("DEP 14:30", Direction::Departure, query), None);
    }

    #[test]
    fn test_unexpected_token_count_is_irrelevant() {
        let query = date(2023, 11, 1);
        assert_eq!(
            rfc3339(
                "At gate 09:15 (02/11/2023) extra",
                Direction::Arrival,
                query
            ),
            None
        );
        assert_eq!(
            rfc3339("Dep 14:30 (15/11/2023) T1", Direction::Departure, query),
            None
        );
    }

    #[test]
    fn test_extra_whitespace_is_tolerated() {
        assert_eq!(
            rfc3339("  At   gate  09:15 ", Direction::Arrival, date(2023, 11, 1)),
            Some("2023-11-01T09:15:00+08:00".to_string())
        );
    }

    #[test]
    fn test_non_numeric_date_is_fatal() {
        let err = classify("At gate 00:05 (xx/11/2023)", Direction::Arrival).unwrap_err();
        assert!(matches!(err, Error::MalformedStatus { .. }));

        let err = classify("Dep 00:05 15/11/2023", Direction::Departure).unwrap_err();
        assert!(matches!(err, Error::MalformedStatus { .. }));
    }

    #[test]
    fn test_impossible_date_is_fatal() {
        let err = classify("Dep 00:05 (31/02/2023)", Direction::Departure).unwrap_err();
        assert!(err.to_string().contains("no such date"));
    }

    #[test]
    fn test_bad_time_is_fatal() {
        let err = classify("At gate 9h15", Direction::Arrival).unwrap_err();
        assert!(matches!(err, Error::MalformedStatus { .. }));

        let err = classify("Dep 25:10", Direction::Departure).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_single_digit_hour() {
        assert_eq!(
            rfc3339("Dep 7:05", Direction::Departure, date(2023, 11, 1)),
            Some("2023-11-01T07:05:00+08:00".to_string())
        );
    }
}
