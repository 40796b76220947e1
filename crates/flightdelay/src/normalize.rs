//! Turning raw flight groups into canonical [`Flight`] records.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use tracing::trace;

use crate::error::{Error, Result};
use crate::flight::{at_hkt, Direction, Flight, FlightIdentifier};
use crate::record::RawGroup;
use crate::status::parse_status;

/// Inclusive time window a flight's actual time must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Earliest accepted actual time.
    pub lower: DateTime<FixedOffset>,
    /// Latest accepted actual time.
    pub upper: DateTime<FixedOffset>,
}

impl Window {
    /// The window ending at `upper` and reaching back `days` days.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] if the lower bound falls outside
    /// the representable date range.
    pub fn ending_at(upper: DateTime<FixedOffset>, days: u32) -> Result<Self> {
        let lower = chrono::Duration::try_days(i64::from(days))
            .and_then(|span| upper.checked_sub_signed(span))
            .ok_or_else(|| Error::ConfigValidation {
                message: format!("look-back of {days} days from {upper} is out of range"),
            })?;
        Ok(Self { lower, upper })
    }

    /// Check whether `t` lies within the window, bounds included.
    #[must_use]
    pub fn contains(&self, t: DateTime<FixedOffset>) -> bool {
        self.lower <= t && t <= self.upper
    }

    /// Every calendar date the window touches, in its own offset.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.lower.date_naive();
        let last = self.upper.date_naive();
        first.iter_days().take_while(move |d| *d <= last)
    }
}

/// Normalize one group of a bucket already matched to `query_date`.
///
/// Returns `Ok(None)` when the status carries no event yet or the actual time
/// falls outside `window` (unless `bypass_window` is set).
///
/// # Errors
///
/// Returns [`Error::MalformedRecord`] if the scheduled time, airports or
/// flight numbers are missing or unusable, and propagates
/// [`Error::MalformedStatus`] from the status parser.
pub fn normalize(
    group: &RawGroup,
    direction: Direction,
    query_date: NaiveDate,
    window: &Window,
    bypass_window: bool,
) -> Result<Option<Flight>> {
    let estimated_time = at_hkt(query_date, scheduled_time(group, query_date)?);

    let Some(actual_time) = parse_status(&group.status, direction, query_date)? else {
        return Ok(None);
    };

    if !bypass_window && !window.contains(actual_time) {
        trace!(
            status = %group.status,
            %actual_time,
            "Actual time outside window"
        );
        return Ok(None);
    }

    let airports = match direction {
        Direction::Arrival => group.origin.as_ref(),
        Direction::Departure => group.destination.as_ref(),
    };
    let airports = match airports {
        Some(list) if !list.is_empty() => list.clone(),
        _ => {
            let field = match direction {
                Direction::Arrival => "origin",
                Direction::Departure => "destination",
            };
            return Err(Error::malformed_record(
                query_date,
                format!("missing {field} for status '{}'", group.status),
            ));
        }
    };

    if group.flight.is_empty() {
        return Err(Error::malformed_record(
            query_date,
            format!("no flight numbers for status '{}'", group.status),
        ));
    }

    let flight_codes = group
        .flight
        .iter()
        .map(|code| FlightIdentifier::new(code.no.clone(), code.airline.clone()))
        .collect();

    Ok(Some(Flight {
        is_arrival: direction.is_arrival(),
        estimated_time,
        actual_time,
        airports,
        flight_codes,
    }))
}

fn scheduled_time(group: &RawGroup, query_date: NaiveDate) -> Result<NaiveTime> {
    let raw = group
        .time
        .as_deref()
        .ok_or_else(|| Error::malformed_record(query_date, "missing scheduled time"))?;

    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| {
        Error::malformed_record(query_date, format!("bad scheduled time '{raw}': {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::hkt;
    use crate::record::RawFlightCode;
    use chrono::TimeZone;

    fn query() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, 14).unwrap()
    }

    fn window() -> Window {
        Window::ending_at(hkt().with_ymd_and_hms(2023, 11, 14, 23, 59, 59).unwrap(), 1).unwrap()
    }

    fn arrival(time: &str, status: &str) -> RawGroup {
        RawGroup {
            time: Some(time.to_string()),
            status: status.to_string(),
            origin: Some(vec!["TPE".to_string()]),
            destination: None,
            flight: vec![
                RawFlightCode {
                    no: "CX 465".to_string(),
                    airline: "CPA".to_string(),
                },
                RawFlightCode {
                    no: "JL 7063".to_string(),
                    airline: "JAL".to_string(),
                },
            ],
        }
    }

    fn departure(time: &str, status: &str) -> RawGroup {
        RawGroup {
            origin: None,
            destination: Some(vec!["NRT".to_string(), "HNL".to_string()]),
            ..arrival(time, status)
        }
    }

    #[test]
    fn test_window_contains_bounds() {
        let w = window();
        assert!(w.contains(w.lower));
        assert!(w.contains(w.upper));
        assert!(!w.contains(w.upper + chrono::Duration::seconds(1)));
        assert!(!w.contains(w.lower - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_window_dates() {
        let dates: Vec<_> = window().dates().collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2023, 11, 13).unwrap(),
                NaiveDate::from_ymd_opt(2023, 11, 14).unwrap(),
            ]
        );

        let upper = hkt().with_ymd_and_hms(2023, 11, 14, 12, 0, 0).unwrap();
        assert_eq!(Window::ending_at(upper, 90).unwrap().dates().count(), 91);
        assert_eq!(Window::ending_at(upper, 0).unwrap().dates().count(), 1);
    }

    #[test]
    fn test_window_out_of_range_is_error() {
        let upper = hkt().with_ymd_and_hms(2023, 11, 14, 12, 0, 0).unwrap();
        let err = Window::ending_at(upper, 200_000_000).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
        assert!(err.to_string().contains("200000000 days"));

        let err = Window::ending_at(upper, u32::MAX).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_normalize_arrival() {
        let flight = normalize(
            &arrival("09:00", "At gate 09:15"),
            Direction::Arrival,
            query(),
            &window(),
            false,
        )
        .unwrap()
        .unwrap();

        assert!(flight.is_arrival);
        assert_eq!(flight.estimated_time.to_rfc3339(), "2023-11-14T09:00:00+08:00");
        assert_eq!(flight.actual_time.to_rfc3339(), "2023-11-14T09:15:00+08:00");
        assert_eq!(flight.airports, vec!["TPE"]);
        assert_eq!(
            flight.flight_codes,
            vec![
                FlightIdentifier::new("CX 465", "CPA"),
                FlightIdentifier::new("JL 7063", "JAL"),
            ]
        );
    }

    #[test]
    fn test_normalize_departure_uses_destination() {
        let flight = normalize(
            &departure("14:00", "Dep 14:30"),
            Direction::Departure,
            query(),
            &window(),
            false,
        )
        .unwrap()
        .unwrap();

        assert!(!flight.is_arrival);
        assert_eq!(flight.airports, vec!["NRT", "HNL"]);
    }

    #[test]
    fn test_irrelevant_status_yields_nothing() {
        let result = normalize(
            &arrival("09:00", "Cancelled"),
            Direction::Arrival,
            query(),
            &window(),
            false,
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_out_of_window_is_dropped() {
        // Lands after the upper bound
        let group = arrival("23:50", "At gate 00:10 (15/11/2023)");
        let result = normalize(&group, Direction::Arrival, query(), &window(), false).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_bypass_window_keeps_out_of_window() {
        let group = departure("23:50", "Dep 00:10 (15/11/2023)");
        let flight = normalize(&group, Direction::Departure, query(), &window(), true)
            .unwrap()
            .unwrap();
        assert_eq!(flight.actual_time.to_rfc3339(), "2023-11-15T00:10:00+08:00");
        assert_eq!(flight.estimated_time.to_rfc3339(), "2023-11-14T23:50:00+08:00");
    }

    #[test]
    fn test_missing_airports_is_fatal() {
        let mut group = arrival("09:00", "At gate 09:15");
        group.origin = None;
        let err = normalize(&group, Direction::Arrival, query(), &window(), false).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { .. }));
        assert!(err.to_string().contains("origin"));

        // An arrival record does not satisfy a departure lookup
        let group = arrival("09:00", "Dep 09:15");
        let err = normalize(&group, Direction::Departure, query(), &window(), false).unwrap_err();
        assert!(err.to_string().contains("destination"));
    }

    #[test]
    fn test_empty_flight_codes_is_fatal() {
        let mut group = arrival("09:00", "At gate 09:15");
        group.flight.clear();
        let err = normalize(&group, Direction::Arrival, query(), &window(), false).unwrap_err();
        assert!(err.to_string().contains("no flight numbers"));
    }

    #[test]
    fn test_missing_scheduled_time_is_fatal() {
        let mut group = arrival("09:00", "Cancelled");
        group.time = None;
        let err = normalize(&group, Direction::Arrival, query(), &window(), false).unwrap_err();
        assert!(err.to_string().contains("missing scheduled time"));

        let group = arrival("9am", "Cancelled");
        let err = normalize(&group, Direction::Arrival, query(), &window(), false).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { .. }));
    }

    #[test]
    fn test_malformed_status_propagates() {
        let group = arrival("09:00", "At gate 00:05 (aa/bb/cccc)");
        let err = normalize(&group, Direction::Arrival, query(), &window(), false).unwrap_err();
        assert!(matches!(err, Error::MalformedStatus { .. }));
    }

    #[test]
    fn test_irrelevant_record_without_airports_is_ignored() {
        let mut group = arrival("09:00", "Cancelled");
        group.origin = None;
        group.flight.clear();
        let result = normalize(&group, Direction::Arrival, query(), &window(), false).unwrap();
        assert!(result.is_none());
    }
}
