//! Live source querying the airport's flight information API.

use std::time::Duration;

use chrono::NaiveDate;
use tracing::debug;

use super::RecordSource;
use crate::error::{Error, Result};
use crate::flight::Direction;
use crate::record::{parse_buckets, DailyBucket};

/// Default endpoint for past flights.
pub const DEFAULT_URL_TEMPLATE: &str = "https://www.hongkongairport.com/flightinfo-rest/rest/flights/past?date={date}&lang=en&cargo=false&arrival={arrival}";

/// Queries the live API with one GET per date and direction.
///
/// The underlying connection pool is released when the source is dropped.
#[derive(Debug, Clone)]
pub struct LiveSource {
    client: reqwest::Client,
    url_template: String,
    timeout: Duration,
}

impl LiveSource {
    /// Create a source for `url_template`, which must contain `{date}` and
    /// `{arrival}` placeholders.
    #[must_use]
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url_template: url_template.into(),
            timeout,
        }
    }

    /// The URL queried for a date and direction.
    #[must_use]
    pub fn url_for(&self, date: NaiveDate, direction: Direction) -> String {
        self.url_template
            .replace("{date}", &date.format("%Y-%m-%d").to_string())
            .replace("{arrival}", if direction.is_arrival() { "true" } else { "false" })
    }

    /// Fetch the raw response body for a date and direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with a
    /// non-success status.
    pub async fn fetch_raw(&self, date: NaiveDate, direction: Direction) -> Result<String> {
        let url = self.url_for(date, direction);
        debug!("GET {url}");

        let response = self.client.get(&url).timeout(self.timeout).send().await?;

        if !response.status().is_success() {
            return Err(Error::HttpStatus {
                url,
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait::async_trait]
impl RecordSource for LiveSource {
    fn name(&self) -> &'static str {
        "live"
    }

    fn is_replay(&self) -> bool {
        false
    }

    async fn fetch_buckets(
        &self,
        date: NaiveDate,
        direction: Direction,
    ) -> Result<Vec<DailyBucket>> {
        let body = self.fetch_raw(date, direction).await?;
        parse_buckets(&body)
    }
}
