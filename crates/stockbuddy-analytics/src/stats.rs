//! Descriptive statistics.
//!
//! Dispersion is always the sample estimate (`ddof = 1`), matching what
//! spreadsheet and dataframe tools report as "std".

use crate::error::{AnalyticsError, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    ArrayView1::from(values).mean()
}

/// Sample variance with `n - 1` in the denominator.
///
/// Requires at least two observations.
pub fn sample_variance(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            required: 2,
            actual: values.len(),
        });
    }
    Ok(ArrayView1::from(values).var(1.0))
}

/// Sample standard deviation.
pub fn sample_std(values: &[f64]) -> Result<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Quantile of an ascending slice using linear interpolation between ranks.
///
/// `q` is clamped to `[0, 1]`. Returns NaN for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let weight = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * weight
        }
    }
}

/// Quantile of an unsorted slice. NaN entries are ignored.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, q)
}

/// Count, mean, dispersion and quartiles of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of observations
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation
    pub std: f64,
    /// Minimum
    pub min: f64,
    /// 25th percentile
    pub q25: f64,
    /// Median
    pub median: f64,
    /// 75th percentile
    pub q75: f64,
    /// Maximum
    pub max: f64,
}

impl Summary {
    /// Describe a sample of at least two finite observations.
    pub fn describe(values: &[f64]) -> Result<Self> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AnalyticsError::DegenerateInput(
                "sample contains non-finite values".to_string(),
            ));
        }
        let std = sample_std(values)?;
        let mean = mean(values).unwrap_or_default();

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();

        Ok(Self {
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted[n - 1],
        })
    }
}
