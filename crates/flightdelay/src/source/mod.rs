//! Raw record sources.
//!
//! A [`RecordSource`] hands out the daily buckets the flight information API
//! publishes for a date and direction. Two interchangeable backends exist:
//!
//! - [`CacheSource`] replays payloads saved on disk, one file per date and
//!   direction.
//! - [`LiveSource`] queries the airport's public REST endpoint.
//!
//! [`snapshot`] copies live payloads into the cache layout.

mod cache;
mod live;
pub mod snapshot;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::flight::Direction;
use crate::record::DailyBucket;

pub use cache::CacheSource;
pub use live::{LiveSource, DEFAULT_URL_TEMPLATE};
pub use snapshot::{snapshot, PayloadFetcher};

/// Which backend to read flight records from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Saved payloads on disk, analysed against a fixed reference time.
    #[default]
    Replay,
    /// The live API, analysed against the current time.
    Live,
}

impl std::fmt::Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Replay => write!(f, "replay"),
            Self::Live => write!(f, "live"),
        }
    }
}

/// Supplier of raw daily buckets.
///
/// Implementations may return buckets for dates other than the one asked
/// for; callers filter. "No data" is an empty vector, never an error.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync + std::fmt::Debug {
    /// The name of this source (for logging).
    fn name(&self) -> &'static str;

    /// Whether this source replays canned historical data.
    fn is_replay(&self) -> bool;

    /// Fetch the buckets published for `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying file or HTTP request fails, or the
    /// payload is not valid JSON.
    async fn fetch_buckets(
        &self,
        date: NaiveDate,
        direction: Direction,
    ) -> Result<Vec<DailyBucket>>;
}
