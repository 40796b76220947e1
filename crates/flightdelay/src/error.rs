//! Error types for flightdelay.
//!
//! This module defines all error types used throughout the flightdelay crate.
//! Parse and record errors abort the current build: they mean the upstream
//! payload format has drifted.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for flightdelay operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Pipeline Errors ===
    /// A status string carried a date or time token that could not be parsed.
    #[error("malformed status '{status}': {reason}")]
    MalformedStatus {
        /// The full status text as received.
        status: String,
        /// Description of what went wrong.
        reason: String,
    },

    /// A flight group record is missing a required field.
    #[error("malformed record on {date}: {reason}")]
    MalformedRecord {
        /// The query date of the bucket holding the record.
        date: NaiveDate,
        /// Description of what went wrong.
        reason: String,
    },

    /// Not enough values to compute a statistic.
    #[error("insufficient data: need at least {needed} values, found {found}")]
    InsufficientData {
        /// Minimum number of values required.
        needed: usize,
        /// Number of values supplied.
        found: usize,
    },

    // === Fetch Errors ===
    /// Fetching the buckets for a date failed.
    #[error("failed to fetch flights for {date}: {source}")]
    Fetch {
        /// The date being fetched.
        date: NaiveDate,
        /// The underlying error.
        #[source]
        source: Box<Error>,
    },

    /// The live API answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    HttpStatus {
        /// The requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The analysis was cancelled before it finished.
    #[error("operation cancelled")]
    Cancelled,

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read a cached payload.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// Path of the file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for flightdelay operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a malformed status error.
    #[must_use]
    pub fn malformed_status(status: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedStatus {
            status: status.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed record error.
    #[must_use]
    pub fn malformed_record(date: NaiveDate, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            date,
            reason: reason.into(),
        }
    }

    /// Wrap an error raised while fetching `date`.
    #[must_use]
    pub fn fetch(date: NaiveDate, source: Self) -> Self {
        Self::Fetch {
            date,
            source: Box::new(source),
        }
    }

    /// Check if this error means the upstream payload format has changed.
    #[must_use]
    pub fn is_format_drift(&self) -> bool {
        matches!(
            self,
            Self::MalformedStatus { .. } | Self::MalformedRecord { .. }
        )
    }

    /// Check if this error came from the record source.
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, 14).unwrap()
    }

    #[test]
    fn test_malformed_status_display() {
        let err = Error::malformed_status("At gate 00:05 (xx/11/2023)", "bad day");
        let msg = err.to_string();
        assert!(msg.contains("At gate 00:05 (xx/11/2023)"));
        assert!(msg.contains("bad day"));
    }

    #[test]
    fn test_malformed_record_display() {
        let err = Error::malformed_record(date(), "missing origin");
        assert_eq!(
            err.to_string(),
            "malformed record on 2023-11-14: missing origin"
        );
    }

    #[test]
    fn test_insufficient_data_display() {
        let err = Error::InsufficientData {
            needed: 2,
            found: 1,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 2 values, found 1"
        );
    }

    #[test]
    fn test_fetch_wraps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::fetch(date(), io_err.into());
        let msg = err.to_string();
        assert!(msg.contains("2023-11-14"));
        assert!(msg.contains("no such file"));
        assert!(err.is_fetch_failure());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_is_format_drift() {
        assert!(Error::malformed_status("Dep", "x").is_format_drift());
        assert!(Error::malformed_record(date(), "x").is_format_drift());
        assert!(!Error::Cancelled.is_format_drift());
    }

    #[test]
    fn test_http_status_display() {
        let err = Error::HttpStatus {
            url: "https://example.com".to_string(),
            status: 503,
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "invalid bin size".to_string(),
        };
        assert!(err.to_string().contains("invalid bin size"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }

    #[test]
    fn test_cancelled_display() {
        assert_eq!(Error::Cancelled.to_string(), "operation cancelled");
    }
}
