//! Replay source backed by saved payload files.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use super::RecordSource;
use crate::error::{Error, Result};
use crate::flight::Direction;
use crate::record::{parse_buckets, DailyBucket};

/// Reads `<root>/<arrival|departure>/<YYYY-MM-DD>.json`.
#[derive(Debug, Clone)]
pub struct CacheSource {
    root: PathBuf,
}

impl CacheSource {
    /// Create a source reading from `root`.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The cache directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the payload file for a date and direction.
    #[must_use]
    pub fn path_for(&self, date: NaiveDate, direction: Direction) -> PathBuf {
        payload_path(&self.root, date, direction)
    }
}

/// Layout shared by the cache reader and the snapshot writer.
pub(crate) fn payload_path(root: &Path, date: NaiveDate, direction: Direction) -> PathBuf {
    root.join(direction.as_str())
        .join(format!("{}.json", date.format("%Y-%m-%d")))
}

#[async_trait::async_trait]
impl RecordSource for CacheSource {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn is_replay(&self) -> bool {
        true
    }

    async fn fetch_buckets(
        &self,
        date: NaiveDate,
        direction: Direction,
    ) -> Result<Vec<DailyBucket>> {
        let path = self.path_for(date, direction);
        debug!("Reading cached payload {}", path.display());

        // The file handle lives only for this read
        let body = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| Error::FileRead { path, source })?;

        parse_buckets(&body)
    }
}
