//! Raw payload shapes returned by the flight information API.
//!
//! These mirror the JSON exactly as served (and as stored in the replay
//! cache). Fields the pipeline does not use are ignored on deserialization.

use serde::{Deserialize, Serialize};

/// All flight groups the API lists under one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBucket {
    /// ISO date (`YYYY-MM-DD`) the groups are listed under.
    pub date: String,

    /// Flight groups for that date.
    #[serde(default)]
    pub list: Vec<RawGroup>,
}

/// One physical movement with its codeshare flight numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGroup {
    /// Scheduled time as `HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Free-text status, e.g. `At gate 09:15` or `Dep 23:50 (15/11/2023)`.
    #[serde(default)]
    pub status: String,

    /// Origin airports (arrivals only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Vec<String>>,

    /// Destination airports (departures only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Vec<String>>,

    /// Flight numbers sharing this movement.
    #[serde(default)]
    pub flight: Vec<RawFlightCode>,
}

/// A flight number as it appears in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFlightCode {
    /// Flight number.
    pub no: String,
    /// Airline code.
    pub airline: String,
}

/// Parse a payload body into buckets.
///
/// A blank body is treated as "no data".
///
/// # Errors
///
/// Returns an error if the body is not a JSON array of buckets.
pub fn parse_buckets(body: &str) -> crate::Result<Vec<DailyBucket>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(body)?)
}
