//! Log returns and drift estimation.
//!
//! For closes `p_0 .. p_n` the log return series is
//! `r_t = ln(p_t / p_{t-1})` for `t = 1..n`. The drift of a geometric
//! Brownian motion fitted to those returns is
//!
//! ```text
//! drift = mean(r) - var(r) / 2
//! ```
//!
//! with `var` the sample variance.

use crate::error::{AnalyticsError, Result};
use crate::stats::{mean, sample_variance};
use serde::{Deserialize, Serialize};

/// Daily log returns of a close series.
///
/// Every close must be finite and strictly positive.
pub fn log_returns(closes: &[f64]) -> Result<Vec<f64>> {
    if let Some(index) = closes.iter().position(|p| !p.is_finite() || *p <= 0.0) {
        return Err(AnalyticsError::DegenerateInput(format!(
            "close at index {index} is {}; prices must be positive",
            closes[index]
        )));
    }
    Ok(closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
}

/// Moments of a log return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftEstimate {
    /// Mean daily log return
    pub mean: f64,
    /// Sample variance of daily log returns
    pub variance: f64,
    /// Sample standard deviation of daily log returns
    pub stdev: f64,
    /// `mean - variance / 2`
    pub drift: f64,
}

impl DriftEstimate {
    /// Estimate from a log return series of at least two observations.
    pub fn from_log_returns(returns: &[f64]) -> Result<Self> {
        let variance = sample_variance(returns)?;
        let mean = mean(returns).unwrap_or_default();
        Ok(Self {
            mean,
            variance,
            stdev: variance.sqrt(),
            drift: mean - 0.5 * variance,
        })
    }

    /// Estimate straight from closes. Needs at least three closes.
    pub fn from_closes(closes: &[f64]) -> Result<Self> {
        if closes.len() < 3 {
            return Err(AnalyticsError::InsufficientData {
                required: 3,
                actual: closes.len(),
            });
        }
        Self::from_log_returns(&log_returns(closes)?)
    }
}
