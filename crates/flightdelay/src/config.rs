//! Configuration management for flightdelay.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, FixedClock, SystemClock};
use crate::error::{Error, Result};
use crate::source::{CacheSource, LiveSource, RecordSource, SourceMode};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "flightdelay";

/// Default cache directory name under the data directory.
const CACHE_DIR_NAME: &str = "cache";

/// Longest accepted look-back, in days.
pub const MAX_INTERVAL_DAYS: u32 = 3660;

/// Reference time matching the bundled replay data set.
pub const DEFAULT_REPLAY_REFERENCE: &str = "2023-11-14T23:59:59+08:00";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLIGHTDELAY_`)
/// 2. TOML config file at `~/.config/flightdelay/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Record source configuration.
    pub source: SourceConfig,
    /// Analysis configuration.
    pub analysis: AnalysisConfig,
}

/// Where flight records come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Replay saved payloads or query the live API.
    pub mode: SourceMode,
    /// Directory holding saved payloads.
    /// Defaults to `~/.local/share/flightdelay/cache`
    pub cache_dir: Option<PathBuf>,
    /// Live API URL with `{date}` and `{arrival}` placeholders.
    pub url_template: String,
    /// Timeout for a single live request, in seconds.
    pub request_timeout_secs: u64,
}

/// How flights are selected and summarised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of days to look back from the reference time.
    pub interval_days: u32,
    /// UTC offset in hours used for the current time in live mode.
    pub timezone_offset_hours: i32,
    /// Fixed reference time (RFC 3339) used in replay mode.
    pub replay_reference: String,
    /// Standard deviations kept by outlier correction.
    pub outlier_threshold: f64,
    /// Histogram bin width in minutes.
    pub bin_size: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::Replay,
            cache_dir: None, // Will be resolved to default at runtime
            url_template: crate::source::DEFAULT_URL_TEMPLATE.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            interval_days: 90,
            timezone_offset_hours: 8,
            replay_reference: DEFAULT_REPLAY_REFERENCE.to_string(),
            outlier_threshold: 10.0,
            bin_size: 10,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FLIGHTDELAY_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let offset = self.analysis.timezone_offset_hours;
        if !(-12..=14).contains(&offset) {
            return Err(Error::ConfigValidation {
                message: format!("timezone_offset_hours ({offset}) must be between -12 and 14"),
            });
        }

        let days = self.analysis.interval_days;
        if days > MAX_INTERVAL_DAYS {
            return Err(Error::ConfigValidation {
                message: format!("interval_days ({days}) must be at most {MAX_INTERVAL_DAYS}"),
            });
        }

        if self.source.request_timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "request_timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.analysis.bin_size == 0 {
            return Err(Error::ConfigValidation {
                message: "bin_size must be greater than 0".to_string(),
            });
        }

        let threshold = self.analysis.outlier_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(Error::ConfigValidation {
                message: format!("outlier_threshold ({threshold}) must be a positive number"),
            });
        }

        for placeholder in ["{date}", "{arrival}"] {
            if !self.source.url_template.contains(placeholder) {
                return Err(Error::ConfigValidation {
                    message: format!("url_template is missing the {placeholder} placeholder"),
                });
            }
        }

        FixedClock::parse(&self.analysis.replay_reference)?;

        Ok(())
    }

    /// Get the cache directory, resolving defaults if not set.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.source
            .cache_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(CACHE_DIR_NAME))
    }

    /// Get the live request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.request_timeout_secs)
    }

    /// Build the live source described by this configuration.
    #[must_use]
    pub fn live_source(&self) -> LiveSource {
        LiveSource::new(self.source.url_template.clone(), self.request_timeout())
    }

    /// Build the record source for `mode`.
    #[must_use]
    pub fn record_source(&self, mode: SourceMode) -> Box<dyn RecordSource> {
        match mode {
            SourceMode::Replay => Box::new(CacheSource::new(self.cache_dir())),
            SourceMode::Live => Box::new(self.live_source()),
        }
    }

    /// Build the clock for `mode`: the fixed replay reference, or the wall
    /// clock at the configured offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the replay reference or offset is invalid.
    pub fn clock(&self, mode: SourceMode) -> Result<Box<dyn Clock>> {
        Ok(match mode {
            SourceMode::Replay => Box::new(FixedClock::parse(&self.analysis.replay_reference)?),
            SourceMode::Live => Box::new(SystemClock::with_offset_hours(
                self.analysis.timezone_offset_hours,
            )?),
        })
    }
}
