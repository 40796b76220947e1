//! Reference time for an analysis.
//!
//! The upper bound of every analysis window comes from a [`Clock`]. Live
//! analyses use the wall clock at a configured UTC offset; replay analyses
//! use a fixed instant matching the cached data set.

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::{Error, Result};

/// Source of the "current" time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current time.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Create a clock reporting time at `offset_hours` from UTC.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is out of range.
    pub fn with_offset_hours(offset_hours: i32) -> Result<Self> {
        let offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| Error::ConfigValidation {
                message: format!("timezone offset out of range: {offset_hours}"),
            })?;
        Ok(Self { offset })
    }

    /// The offset this clock reports in.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// A clock that never moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// Parse an RFC 3339 timestamp into a fixed clock.
    ///
    /// # Errors
    ///
    /// Returns an error if `rfc3339` is not a valid timestamp.
    pub fn parse(rfc3339: &str) -> Result<Self> {
        DateTime::parse_from_rfc3339(rfc3339)
            .map(Self)
            .map_err(|e| Error::ConfigValidation {
                message: format!("invalid replay reference '{rfc3339}': {e}"),
            })
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_parse() {
        let clock = FixedClock::parse("2023-11-14T23:59:59+08:00").unwrap();
        assert_eq!(clock.now().to_rfc3339(), "2023-11-14T23:59:59+08:00");
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_fixed_clock_parse_invalid() {
        let err = FixedClock::parse("yesterday").unwrap_err();
        assert!(err.to_string().contains("invalid replay reference"));
    }

    #[test]
    fn test_system_clock_offset() {
        let clock = SystemClock::with_offset_hours(8).unwrap();
        assert_eq!(clock.now().offset().local_minus_utc(), 8 * 3600);
        assert_eq!(clock.offset().local_minus_utc(), 8 * 3600);

        let clock = SystemClock::with_offset_hours(-5).unwrap();
        assert_eq!(clock.now().offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_system_clock_out_of_range() {
        assert!(SystemClock::with_offset_hours(30).is_err());
        assert!(SystemClock::with_offset_hours(i32::MAX).is_err());
    }

    #[test]
    fn test_system_clock_tracks_utc() {
        let clock = SystemClock::with_offset_hours(8).unwrap();
        let before = Utc::now();
        let now = clock.now();
        let after = Utc::now();
        assert!(before <= now && now <= after);
    }
}
