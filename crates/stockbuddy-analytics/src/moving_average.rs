//! Short and long trailing moving averages of closing prices.
//!
//! Both averages use `min_periods = 1`, so the first `window - 1` values are
//! averages over however many closes exist so far rather than nulls. At index
//! `i` each column holds the mean of the trailing `min(window, i + 1)` closes.

use crate::error::{AnalyticsError, Result};
use chrono::{NaiveDate, TimeDelta};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use stockbuddy_data::PriceSeries;

/// Window lengths, in observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovingAverageConfig {
    /// Short window (default 20)
    pub short_window: usize,
    /// Long window (default 50)
    pub long_window: usize,
}

impl Default for MovingAverageConfig {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
        }
    }
}

impl MovingAverageConfig {
    /// Reject zero windows.
    pub fn validate(&self) -> Result<()> {
        if self.short_window == 0 || self.long_window == 0 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "moving average windows must be at least 1, got {} and {}",
                self.short_window, self.long_window
            )));
        }
        Ok(())
    }
}

/// Closes with their short and long moving averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageFrame {
    /// Ticker symbol
    pub symbol: String,
    /// Windows used
    pub config: MovingAverageConfig,
    /// Trading dates
    pub dates: Vec<NaiveDate>,
    /// Closing prices
    pub close: Vec<f64>,
    /// Short moving average
    pub short: Vec<f64>,
    /// Long moving average
    pub long: Vec<f64>,
}

impl MovingAverageFrame {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.close.len()
    }

    /// True for an empty frame.
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Last row as `(date, close, short, long)`.
    pub fn last(&self) -> Option<(NaiveDate, f64, f64, f64)> {
        let i = self.len().checked_sub(1)?;
        Some((self.dates[i], self.close[i], self.short[i], self.long[i]))
    }

    /// Convert to a Polars DataFrame with columns date, close, short_ma, long_ma.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let df = DataFrame::new(vec![
            Series::new("date".into(), epoch_days(&self.dates)?)
                .cast(&DataType::Date)?
                .into(),
            Series::new("close".into(), self.close.clone()).into(),
            Series::new("short_ma".into(), self.short.clone()).into(),
            Series::new("long_ma".into(), self.long.clone()).into(),
        ])?;
        Ok(df)
    }
}

/// Compute both moving averages over the series' closes.
pub fn moving_averages(
    series: &PriceSeries,
    config: &MovingAverageConfig,
) -> Result<MovingAverageFrame> {
    config.validate()?;
    if series.is_empty() {
        return Err(AnalyticsError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    let close = series.closes();
    let df = DataFrame::new(vec![Series::new("close".into(), close.clone()).into()])?;

    let result = df
        .lazy()
        .with_columns([
            col("close")
                .rolling_mean(RollingOptionsFixedWindow {
                    window_size: config.short_window,
                    min_periods: 1,
                    ..Default::default()
                })
                .alias("short_ma"),
            col("close")
                .rolling_mean(RollingOptionsFixedWindow {
                    window_size: config.long_window,
                    min_periods: 1,
                    ..Default::default()
                })
                .alias("long_ma"),
        ])
        .collect()?;

    let short = f64_column(&result, "short_ma")?;
    let long = f64_column(&result, "long_ma")?;

    tracing::debug!(
        symbol = series.symbol(),
        rows = close.len(),
        short_window = config.short_window,
        long_window = config.long_window,
        "computed moving averages"
    );

    Ok(MovingAverageFrame {
        symbol: series.symbol().to_string(),
        config: *config,
        dates: series.dates(),
        close,
        short,
        long,
    })
}

/// Read a non-null Float64 column into a vector.
pub(crate) fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    df.column(name)?
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| {
                AnalyticsError::DegenerateInput(format!("null in column {name} at row {i}"))
            })
        })
        .collect()
}

/// Days since 1970-01-01 for each date.
pub(crate) fn epoch_days(dates: &[NaiveDate]) -> Result<Vec<i32>> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .ok_or_else(|| AnalyticsError::InvalidParameter("invalid epoch".to_string()))?;
    Ok(dates
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect())
}

/// Inverse of [`epoch_days`]; days before 1970 are negative.
pub(crate) fn date_from_epoch_day(day: i32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|epoch| epoch.checked_add_signed(TimeDelta::days(i64::from(day))))
        .ok_or_else(|| AnalyticsError::InvalidParameter(format!("day {day} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Days;
    use rstest::rstest;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..closes.len())
            .map(|i| start + Days::new(i as u64))
            .collect();
        PriceSeries::from_closes("TEST", &dates, closes).unwrap()
    }

    fn trailing_mean(values: &[f64], i: usize, window: usize) -> f64 {
        let start = (i + 1).saturating_sub(window);
        let slice = &values[start..=i];
        slice.iter().sum::<f64>() / slice.len() as f64
    }

    #[test]
    fn test_first_row_equals_close() {
        let frame = moving_averages(&series(&[10.0, 12.0, 11.0]), &MovingAverageConfig::default())
            .unwrap();
        assert_relative_eq!(frame.short[0], 10.0);
        assert_relative_eq!(frame.long[0], 10.0);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(2, 3)]
    #[case(3, 7)]
    #[case(20, 50)]
    fn test_trailing_means(#[case] short_window: usize, #[case] long_window: usize) {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let config = MovingAverageConfig {
            short_window,
            long_window,
        };
        let frame = moving_averages(&series(&closes), &config).unwrap();

        assert_eq!(frame.len(), closes.len());
        for i in 0..closes.len() {
            assert_relative_eq!(frame.short[i], trailing_mean(&closes, i, short_window), epsilon = 1e-9);
            assert_relative_eq!(frame.long[i], trailing_mean(&closes, i, long_window), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let closes = [5.0, 7.0, 6.0, 9.0];
        let config = MovingAverageConfig {
            short_window: 1,
            long_window: 1,
        };
        let frame = moving_averages(&series(&closes), &config).unwrap();
        assert_eq!(frame.short, closes.to_vec());
        assert_eq!(frame.long, closes.to_vec());
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = MovingAverageConfig {
            short_window: 0,
            long_window: 50,
        };
        assert!(matches!(
            moving_averages(&series(&[1.0]), &config),
            Err(AnalyticsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_empty_series_rejected() {
        let empty = PriceSeries::new("NONE", Vec::new()).unwrap();
        assert!(matches!(
            moving_averages(&empty, &MovingAverageConfig::default()),
            Err(AnalyticsError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_epoch_days_before_1970() {
        let dates = [
            NaiveDate::from_ymd_opt(1962, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(1969, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
        ];
        let days = epoch_days(&dates).unwrap();
        assert_eq!(days[1..], [-1, 0]);
        assert!(days[0] < -2_900);
        for (day, date) in days.iter().zip(&dates) {
            assert_eq!(date_from_epoch_day(*day).unwrap(), *date);
        }
    }

    #[test]
    fn test_to_dataframe() {
        let frame = moving_averages(&series(&[1.0, 2.0, 3.0]), &MovingAverageConfig::default())
            .unwrap();
        let df = frame.to_dataframe().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 4);
        assert_eq!(frame.last().unwrap().3, 2.0);
    }
}
