//! Populating the replay cache from the live API.

use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use tracing::info;

use super::cache::payload_path;
use super::LiveSource;
use crate::error::{Error, Result};
use crate::flight::Direction;

/// Supplier of raw payload bodies for a date and direction.
#[async_trait::async_trait]
pub trait PayloadFetcher: Send + Sync {
    /// Fetch the body published for `date`, unparsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be retrieved.
    async fn fetch_payload(&self, date: NaiveDate, direction: Direction) -> Result<String>;
}

#[async_trait::async_trait]
impl PayloadFetcher for LiveSource {
    async fn fetch_payload(&self, date: NaiveDate, direction: Direction) -> Result<String> {
        self.fetch_raw(date, direction).await
    }
}

/// Download both directions for the `days` days before `today` into
/// `cache_dir`, one pretty-printed file per date and direction.
///
/// Dates are fetched one after another, newest first. Returns the written
/// paths.
///
/// # Errors
///
/// Returns an error on the first failed request, invalid payload or write.
pub async fn snapshot(
    fetcher: &dyn PayloadFetcher,
    cache_dir: &Path,
    days: u32,
    today: NaiveDate,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let dates = (1..=days).filter_map(|i| today.checked_sub_days(Days::new(u64::from(i))));
    for date in dates {
        for direction in [Direction::Arrival, Direction::Departure] {
            let body = fetcher
                .fetch_payload(date, direction)
                .await
                .map_err(|e| Error::fetch(date, e))?;
            let payload: serde_json::Value = if body.trim().is_empty() {
                serde_json::Value::Array(Vec::new())
            } else {
                serde_json::from_str(&body)?
            };

            let path = payload_path(cache_dir, date, direction);
            write_payload(&path, &payload).await?;
            written.push(path);
        }
        info!("Saved flights for {date}");
    }

    Ok(written)
}

async fn write_payload(path: &Path, payload: &serde_json::Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(path, serde_json::to_string_pretty(payload)?).await?;
    Ok(())
}
