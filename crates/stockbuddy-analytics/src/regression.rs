//! Linear trend regression of closing price on calendar day offset.
//!
//! The day offset of a sample is the number of calendar days since the first
//! date in the series, so weekends and holidays leave gaps in `x`. Samples are
//! shuffled with a seeded generator and split into train and test sets; an
//! ordinary least squares line is fitted on the training set:
//!
//! ```text
//! slope     = Σ (x - x̄)(y - ȳ) / Σ (x - x̄)²
//! intercept = ȳ - slope · x̄
//! ```
//!
//! and evaluated on the held-out offsets.

use crate::error::{AnalyticsError, Result};
use chrono::NaiveDate;
use ndarray::Array1;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use stockbuddy_data::PriceSeries;

/// How samples are divided between fitting and evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Share of samples held out for evaluation, in `(0, 1)`
    pub test_fraction: f64,
    /// Seed for the shuffle
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 0,
        }
    }
}

impl SplitConfig {
    /// Reject fractions outside `(0, 1)`.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(AnalyticsError::InvalidParameter(format!(
                "test fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }

    /// Number of held-out samples out of `n`.
    pub fn test_len(&self, n: usize) -> usize {
        (self.test_fraction * n as f64).round() as usize
    }
}

/// Sample indices for each side of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    /// Indices used to fit
    pub train: Vec<usize>,
    /// Held-out indices, in shuffled order
    pub test: Vec<usize>,
}

/// Shuffle `0..n` and hold out the first `round(test_fraction · n)` indices.
pub fn train_test_split(n: usize, config: &SplitConfig) -> Result<TrainTestSplit> {
    config.validate()?;
    let n_test = config.test_len(n);
    if n_test < 1 || n - n_test.min(n) < 2 {
        // Smallest n that leaves one test and two training samples.
        let required = (1..)
            .find(|&m| {
                let t = config.test_len(m);
                t >= 1 && m >= t + 2
            })
            .unwrap_or(3);
        return Err(AnalyticsError::InsufficientData {
            required,
            actual: n,
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(n_test);

    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}

/// Fitted line `y = intercept + slope · x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Change in price per calendar day
    pub slope: f64,
    /// Price at offset zero
    pub intercept: f64,
}

impl LinearFit {
    /// Ordinary least squares with one regressor.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(AnalyticsError::InvalidParameter(format!(
                "{} regressors but {} targets",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(AnalyticsError::InsufficientData {
                required: 2,
                actual: x.len(),
            });
        }

        let x = Array1::from(x.to_vec());
        let y = Array1::from(y.to_vec());
        let n = x.len() as f64;
        let x_mean = x.sum() / n;
        let y_mean = y.sum() / n;
        let dx = &x - x_mean;
        let dy = &y - y_mean;
        let sxx = dx.dot(&dx);
        if sxx == 0.0 {
            return Err(AnalyticsError::DegenerateInput(
                "all training offsets are identical".to_string(),
            ));
        }

        let slope = dx.dot(&dy) / sxx;
        Ok(Self {
            slope,
            intercept: y_mean - slope * x_mean,
        })
    }

    /// Fitted value at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Held-out evaluation of a trend fit.
///
/// All vectors are aligned and ordered by the shuffle, not by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Ticker symbol
    pub symbol: String,
    /// Dates of the held-out samples
    pub dates: Vec<NaiveDate>,
    /// Day offsets of the held-out samples
    pub day_offsets: Vec<f64>,
    /// Observed closes
    pub actual: Vec<f64>,
    /// Fitted closes
    pub predicted: Vec<f64>,
    /// Line fitted on the training samples
    pub fit: LinearFit,
    /// Number of training samples
    pub train_len: usize,
}

impl RegressionResult {
    /// Number of held-out samples.
    pub fn len(&self) -> usize {
        self.actual.len()
    }

    /// True when nothing was held out.
    pub fn is_empty(&self) -> bool {
        self.actual.is_empty()
    }

    /// Root mean squared error on the held-out samples.
    pub fn rmse(&self) -> f64 {
        let sse: f64 = self
            .actual
            .iter()
            .zip(&self.predicted)
            .map(|(a, p)| (a - p).powi(2))
            .sum();
        (sse / self.len() as f64).sqrt()
    }

    /// Coefficient of determination on the held-out samples.
    ///
    /// NaN when the held-out closes are all equal.
    pub fn r_squared(&self) -> f64 {
        let n = self.len() as f64;
        let mean = self.actual.iter().sum::<f64>() / n;
        let sst: f64 = self.actual.iter().map(|a| (a - mean).powi(2)).sum();
        let sse: f64 = self
            .actual
            .iter()
            .zip(&self.predicted)
            .map(|(a, p)| (a - p).powi(2))
            .sum();
        if sst == 0.0 { f64::NAN } else { 1.0 - sse / sst }
    }
}

/// Fit close against day offset and predict the held-out samples.
pub fn fit_trend(series: &PriceSeries, config: &SplitConfig) -> Result<RegressionResult> {
    let dates = series.dates();
    let closes = series.closes();
    let split = train_test_split(closes.len(), config)?;

    let origin = dates[0];
    let offsets: Vec<f64> = dates
        .iter()
        .map(|d| (*d - origin).num_days() as f64)
        .collect();

    let train_x: Vec<f64> = split.train.iter().map(|&i| offsets[i]).collect();
    let train_y: Vec<f64> = split.train.iter().map(|&i| closes[i]).collect();
    let fit = LinearFit::fit(&train_x, &train_y)?;

    let day_offsets: Vec<f64> = split.test.iter().map(|&i| offsets[i]).collect();
    let predicted = day_offsets.iter().map(|&x| fit.predict(x)).collect();

    tracing::debug!(
        symbol = series.symbol(),
        train = split.train.len(),
        test = split.test.len(),
        slope = fit.slope,
        "fitted trend regression"
    );

    Ok(RegressionResult {
        symbol: series.symbol().to_string(),
        dates: split.test.iter().map(|&i| dates[i]).collect(),
        day_offsets,
        actual: split.test.iter().map(|&i| closes[i]).collect(),
        predicted,
        fit,
        train_len: split.train.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Days;
    use rstest::rstest;

    fn daily_series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..closes.len())
            .map(|i| start + Days::new(i as u64))
            .collect();
        PriceSeries::from_closes("TEST", &dates, closes).unwrap()
    }

    #[rstest]
    #[case(10, 2)]
    #[case(100, 20)]
    #[case(252, 50)]
    #[case(253, 51)]
    fn test_split_sizes(#[case] n: usize, #[case] n_test: usize) {
        let split = train_test_split(n, &SplitConfig::default()).unwrap();
        assert_eq!(split.test.len(), n_test);
        assert_eq!(split.train.len(), n - n_test);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_deterministic() {
        let config = SplitConfig::default();
        let a = train_test_split(50, &config).unwrap();
        let b = train_test_split(50, &config).unwrap();
        assert_eq!(a, b);

        let other = train_test_split(50, &SplitConfig { seed: 7, ..config }).unwrap();
        assert_ne!(a.test, other.test);
    }

    #[test]
    fn test_split_too_small() {
        // round(0.2 * 2) = 0 held out
        assert!(matches!(
            train_test_split(2, &SplitConfig::default()),
            Err(AnalyticsError::InsufficientData { actual: 2, .. })
        ));
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(-0.5)]
    #[case(f64::NAN)]
    fn test_invalid_fraction(#[case] test_fraction: f64) {
        let config = SplitConfig {
            test_fraction,
            seed: 0,
        };
        assert!(matches!(
            train_test_split(100, &config),
            Err(AnalyticsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_exact_line_is_recovered() {
        let closes: Vec<f64> = (0..30).map(|i| 50.0 + 2.0 * i as f64).collect();
        let result = fit_trend(&daily_series(&closes), &SplitConfig::default()).unwrap();

        assert_eq!(result.len(), 6);
        assert_eq!(result.train_len, 24);
        assert_relative_eq!(result.fit.slope, 2.0, epsilon = 1e-9);
        assert_relative_eq!(result.fit.intercept, 50.0, epsilon = 1e-9);
        for (a, p) in result.actual.iter().zip(&result.predicted) {
            assert_relative_eq!(a, p, epsilon = 1e-9);
        }
        assert_relative_eq!(result.rmse(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_offsets_use_calendar_days() {
        let dates = [
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
        ];
        let closes: Vec<f64> = dates
            .iter()
            .map(|d| 10.0 + (*d - dates[0]).num_days() as f64)
            .collect();
        let series = PriceSeries::from_closes("GAP", &dates, &closes).unwrap();
        let result = fit_trend(&series, &SplitConfig::default()).unwrap();

        assert_eq!(result.len(), 1);
        assert_relative_eq!(result.fit.slope, 1.0, epsilon = 1e-9);
        let offset = result.day_offsets[0];
        assert_relative_eq!(result.actual[0], 10.0 + offset, epsilon = 1e-9);
    }

    #[test]
    fn test_fit_rejects_constant_offsets() {
        assert!(matches!(
            LinearFit::fit(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]),
            Err(AnalyticsError::DegenerateInput(_))
        ));
    }
}
