//! Delay statistics.
//!
//! Everything here works on a series of integer delay minutes derived from
//! a flight set with [`delays`]. None of it knows how the flights were
//! fetched or normalized.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::flight::Flight;

/// Minimum series length for a standard deviation.
const MIN_SAMPLES: usize = 2;

/// Delay in minutes of each flight, in order.
#[must_use]
pub fn delays(flights: &[Flight]) -> Vec<i64> {
    flights.iter().map(Flight::delay_minutes).collect()
}

fn require_samples(values: &[i64]) -> Result<()> {
    if values.len() < MIN_SAMPLES {
        return Err(Error::InsufficientData {
            needed: MIN_SAMPLES,
            found: values.len(),
        });
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[i64]) -> f64 {
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

/// Sum of squared deviations from `mn`.
#[allow(clippy::cast_precision_loss)]
fn squared_deviations(values: &[i64], mn: f64) -> f64 {
    values.iter().map(|&v| (v as f64 - mn).powi(2)).sum()
}

#[allow(clippy::cast_precision_loss)]
fn population_stdev(values: &[i64], mn: f64) -> f64 {
    (squared_deviations(values, mn) / values.len() as f64).sqrt()
}

#[allow(clippy::cast_precision_loss)]
fn sample_stdev(values: &[i64], mn: f64) -> f64 {
    (squared_deviations(values, mn) / (values.len() - 1) as f64).sqrt()
}

/// Drop values further than `threshold` population standard deviations from
/// the mean. The bounds are widened outward to whole minutes. Order is kept.
///
/// # Errors
///
/// Returns [`Error::ConfigValidation`] unless `threshold` is a positive
/// finite number, and [`Error::InsufficientData`] for fewer than two values.
#[allow(clippy::cast_precision_loss)]
pub fn correct_outliers(values: &[i64], threshold: f64) -> Result<Vec<i64>> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(Error::ConfigValidation {
            message: format!("outlier threshold ({threshold}) must be a positive number"),
        });
    }
    require_samples(values)?;

    let mn = mean(values);
    let sd = population_stdev(values, mn);
    let lower = (mn - threshold * sd).floor();
    let upper = (mn + threshold * sd).ceil();

    Ok(values
        .iter()
        .copied()
        .filter(|&v| lower <= v as f64 && v as f64 <= upper)
        .collect())
}

/// Summary statistics of a delay series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Number of values.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (mean of the two middle values for even lengths).
    pub median: f64,
    /// Most frequent value; the first one seen wins a tie.
    pub mode: i64,
    /// Sample standard deviation.
    pub stdev: f64,
    /// Smallest value.
    pub min: i64,
    /// Largest value.
    pub max: i64,
}

impl Summary {
    /// Compute the summary of `values`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientData`] for fewer than two values.
    pub fn from_delays(values: &[i64]) -> Result<Self> {
        require_samples(values)?;

        let mn = mean(values);
        let mut sorted = values.to_vec();
        sorted.sort_unstable();

        let mid = sorted.len() / 2;
        #[allow(clippy::cast_precision_loss)]
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
        } else {
            sorted[mid] as f64
        };

        Ok(Self {
            count: values.len(),
            mean: mn,
            median,
            mode: mode(values),
            stdev: sample_stdev(values, mn),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }
}

fn mode(values: &[i64]) -> i64 {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    let best = counts.values().copied().max().unwrap_or(0);
    values
        .iter()
        .copied()
        .find(|v| counts.get(v) == Some(&best))
        .unwrap_or_default()
}

/// Normal distribution fitted to a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalFit {
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub stdev: f64,
}

impl NormalFit {
    /// Fit a normal distribution to `values`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientData`] for fewer than two values.
    pub fn from_samples(values: &[i64]) -> Result<Self> {
        require_samples(values)?;
        let mn = mean(values);
        Ok(Self {
            mean: mn,
            stdev: sample_stdev(values, mn),
        })
    }

    /// Probability density at `x`. A zero-width fit puts all mass on the mean.
    #[must_use]
    pub fn pdf(&self, x: f64) -> f64 {
        if self.stdev == 0.0 {
            return if (x - self.mean).abs() < f64::EPSILON {
                1.0
            } else {
                0.0
            };
        }
        let z = (x - self.mean) / self.stdev;
        (-0.5 * z * z).exp() / (self.stdev * (2.0 * std::f64::consts::PI).sqrt())
    }
}

/// Observed and expected count for one delay minute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionPoint {
    /// Delay in minutes.
    pub minute: i64,
    /// Number of flights with exactly this delay.
    pub count: usize,
    /// Count predicted by the normal fit.
    pub expected: f64,
}

/// Per-minute frequency of a delay series with a fitted normal curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    /// One point for every minute from the minimum to the maximum delay.
    pub points: Vec<DistributionPoint>,
}

impl Distribution {
    /// Build the distribution of `values`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientData`] for fewer than two values.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_delays(values: &[i64]) -> Result<Self> {
        let fit = NormalFit::from_samples(values)?;

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for &v in values {
            *counts.entry(v).or_insert(0) += 1;
        }

        let min = values.iter().copied().min().unwrap_or_default();
        let max = values.iter().copied().max().unwrap_or_default();
        let n = values.len() as f64;

        let points = (min..=max)
            .map(|minute| DistributionPoint {
                minute,
                count: counts.get(&minute).copied().unwrap_or(0),
                expected: n * fit.pdf(minute as f64),
            })
            .collect();

        Ok(Self { points })
    }
}

/// One histogram bin covering `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    /// First minute in the bin.
    pub start: i64,
    /// First minute past the bin.
    pub end: i64,
    /// Number of values in the bin.
    pub count: usize,
}

impl Bin {
    /// Midpoint of the bin.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) as f64 / 2.0
    }
}

/// Fixed-width histogram starting at the smallest value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Bin width in minutes.
    pub bin_size: u32,
    /// Bins in ascending order; the last one contains the largest value.
    pub bins: Vec<Bin>,
}

impl Histogram {
    /// Bin `values` into buckets `bin_size` minutes wide.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientData`] for an empty series and
    /// [`Error::ConfigValidation`] for a zero bin size.
    pub fn from_delays(values: &[i64], bin_size: u32) -> Result<Self> {
        if bin_size == 0 {
            return Err(Error::ConfigValidation {
                message: "bin_size must be greater than 0".to_string(),
            });
        }
        let (Some(min), Some(max)) = (values.iter().min(), values.iter().max()) else {
            return Err(Error::InsufficientData {
                needed: 1,
                found: 0,
            });
        };

        let width = i64::from(bin_size);
        let bin_count = usize::try_from((max - min) / width + 1).unwrap_or(0);

        let mut bins: Vec<Bin> = (0..bin_count)
            .map(|i| {
                let start = min + width * i64::try_from(i).unwrap_or(0);
                Bin {
                    start,
                    end: start + width,
                    count: 0,
                }
            })
            .collect();

        for &v in values {
            if let Ok(index) = usize::try_from((v - min) / width) {
                bins[index].count += 1;
            }
        }

        Ok(Self { bin_size, bins })
    }

    /// Total number of values binned.
    #[must_use]
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Sum of `f(midpoint)` over every binned value.
    #[allow(clippy::cast_precision_loss)]
    fn weighted_sum(&self, f: impl Fn(f64) -> f64) -> f64 {
        self.bins
            .iter()
            .map(|b| b.count as f64 * f(b.midpoint()))
            .sum()
    }

    /// Normal curve fitted to the binned data, each value standing at its
    /// bin's midpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientData`] if fewer than two values were binned.
    pub fn normal_fit(&self) -> Result<NormalFit> {
        let total = self.total();
        if total < MIN_SAMPLES {
            return Err(Error::InsufficientData {
                needed: MIN_SAMPLES,
                found: total,
            });
        }

        #[allow(clippy::cast_precision_loss)]
        let n = total as f64;
        let mean = self.weighted_sum(|x| x) / n;
        let variance = self.weighted_sum(|x| (x - mean).powi(2)) / (n - 1.0);

        Ok(NormalFit {
            mean,
            stdev: variance.sqrt(),
        })
    }
}
