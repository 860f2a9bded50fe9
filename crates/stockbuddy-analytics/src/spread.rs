//! Z-scored price spread between two tickers.
//!
//! ```text
//! s_t = a_t - b_t
//! z_t = (s_t - mean(s)) / std(s)
//! ```
//!
//! with `std` the sample standard deviation. Before differencing, the two
//! close series are aligned according to a [`SpreadAlignment`].

use crate::error::{AnalyticsError, Result};
use crate::moving_average::{date_from_epoch_day, epoch_days, f64_column};
use crate::stats::{Summary, mean, sample_std};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stockbuddy_data::PriceSeries;

/// How two close series are matched up before differencing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpreadAlignment {
    /// Require identical dates; fail otherwise
    #[default]
    Strict,
    /// Keep only dates present in both series
    CommonDates,
}

impl SpreadAlignment {
    /// Token used on the command line and in settings.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::CommonDates => "common-dates",
        }
    }
}

impl fmt::Display for SpreadAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpreadAlignment {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "common-dates" | "common_dates" | "common" => Ok(Self::CommonDates),
            other => Err(AnalyticsError::InvalidParameter(format!(
                "unknown alignment '{other}', expected strict or common-dates"
            ))),
        }
    }
}

/// Two close series on a shared calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    /// Shared dates
    pub dates: Vec<NaiveDate>,
    /// Closes of the first ticker
    pub left: Vec<f64>,
    /// Closes of the second ticker
    pub right: Vec<f64>,
}

/// Match two series up by date.
pub fn align_pair(
    left: &PriceSeries,
    right: &PriceSeries,
    alignment: SpreadAlignment,
) -> Result<AlignedPair> {
    match alignment {
        SpreadAlignment::Strict => align_strict(left, right),
        SpreadAlignment::CommonDates => align_common_dates(left, right),
    }
}

fn align_strict(left: &PriceSeries, right: &PriceSeries) -> Result<AlignedPair> {
    let dates = left.dates();
    let right_dates = right.dates();
    let first_mismatch = if dates.len() == right_dates.len() {
        dates.iter().zip(&right_dates).position(|(a, b)| a != b)
    } else {
        None
    };

    if dates.len() != right_dates.len() || first_mismatch.is_some() {
        return Err(AnalyticsError::MisalignedSeries {
            left: left.symbol().to_string(),
            right: right.symbol().to_string(),
            left_len: dates.len(),
            right_len: right_dates.len(),
            first_mismatch,
        });
    }

    Ok(AlignedPair {
        dates,
        left: left.closes(),
        right: right.closes(),
    })
}

fn align_common_dates(left: &PriceSeries, right: &PriceSeries) -> Result<AlignedPair> {
    let frame = |series: &PriceSeries, name: &str| -> Result<LazyFrame> {
        Ok(DataFrame::new(vec![
            Series::new("day".into(), epoch_days(&series.dates())?).into(),
            Series::new(name.into(), series.closes()).into(),
        ])?
        .lazy())
    };

    let joined = frame(left, "left")?
        .join(
            frame(right, "right")?,
            [col("day")],
            [col("day")],
            JoinArgs::new(JoinType::Inner),
        )
        .sort(["day"], Default::default())
        .collect()?;

    let dates = joined
        .column("day")?
        .i32()?
        .into_iter()
        .flatten()
        .map(date_from_epoch_day)
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        left = left.symbol(),
        right = right.symbol(),
        left_len = left.len(),
        right_len = right.len(),
        common = dates.len(),
        "aligned pair on common dates"
    );

    Ok(AlignedPair {
        dates,
        left: f64_column(&joined, "left")?,
        right: f64_column(&joined, "right")?,
    })
}

/// Sample-standardize a sequence.
pub fn zscore(values: &[f64]) -> Result<Vec<f64>> {
    let std = sample_std(values)
        .map_err(|_| AnalyticsError::DegenerateInput("need at least two points".to_string()))?;
    if !(std.is_finite() && std > 0.0) {
        return Err(AnalyticsError::DegenerateInput(
            "series has zero variance".to_string(),
        ));
    }
    let mean = mean(values).unwrap_or_default();
    Ok(values.iter().map(|v| (v - mean) / std).collect())
}

/// Standardized difference of two close series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSpread {
    /// First ticker
    pub left: String,
    /// Second ticker
    pub right: String,
    /// Dates of the spread
    pub dates: Vec<NaiveDate>,
    /// Raw `left - right` differences
    pub raw: Vec<f64>,
    /// Z-scored spread
    pub values: Vec<f64>,
    /// Mean of the raw spread
    pub raw_mean: f64,
    /// Sample standard deviation of the raw spread
    pub raw_std: f64,
}

impl NormalizedSpread {
    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for an empty spread.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Descriptive statistics of the z-scored spread.
    pub fn summary(&self) -> Result<Summary> {
        Summary::describe(&self.values)
    }

    /// Last z-score, if any.
    pub fn latest(&self) -> Option<(NaiveDate, f64)> {
        Some((*self.dates.last()?, *self.values.last()?))
    }
}

/// Align, difference and standardize two close series.
pub fn normalized_spread(
    left: &PriceSeries,
    right: &PriceSeries,
    alignment: SpreadAlignment,
) -> Result<NormalizedSpread> {
    let pair = align_pair(left, right, alignment)?;
    let raw: Vec<f64> = pair
        .left
        .iter()
        .zip(&pair.right)
        .map(|(a, b)| a - b)
        .collect();

    let values = zscore(&raw)?;
    let raw_mean = mean(&raw).unwrap_or_default();
    let raw_std = sample_std(&raw)?;

    Ok(NormalizedSpread {
        left: left.symbol().to_string(),
        right: right.symbol().to_string(),
        dates: pair.dates,
        raw,
        values,
        raw_mean,
        raw_std,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn series(symbol: &str, days: &[u32], closes: &[f64]) -> PriceSeries {
        let dates: Vec<NaiveDate> = days.iter().map(|&d| day(d)).collect();
        PriceSeries::from_closes(symbol, &dates, closes).unwrap()
    }

    #[test]
    fn test_spread_is_standardized() {
        let a = series("AAA", &[1, 2, 3, 6, 7], &[10.0, 12.0, 11.0, 15.0, 14.0]);
        let b = series("BBB", &[1, 2, 3, 6, 7], &[9.0, 9.5, 10.0, 10.0, 11.0]);
        let spread = normalized_spread(&a, &b, SpreadAlignment::Strict).unwrap();

        assert_eq!(spread.len(), 5);
        assert_eq!(spread.raw, vec![1.0, 2.5, 1.0, 5.0, 3.0]);
        let summary = spread.summary().unwrap();
        assert_relative_eq!(summary.mean, 0.0, epsilon = 1e-12);
        assert_relative_eq!(summary.std, 1.0, epsilon = 1e-12);
        assert_relative_eq!(spread.raw_mean, 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_strict_rejects_length_mismatch() {
        let a = series("AAPL", &[1, 2, 3], &[1.0, 2.0, 3.0]);
        let b = series("MSFT", &[1, 2], &[1.0, 2.0]);
        let err = normalized_spread(&a, &b, SpreadAlignment::Strict).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::MisalignedSeries {
                left_len: 3,
                right_len: 2,
                first_mismatch: None,
                ..
            }
        ));
    }

    #[test]
    fn test_strict_rejects_date_mismatch() {
        let a = series("AAPL", &[1, 2, 3], &[1.0, 2.0, 3.0]);
        let b = series("MSFT", &[1, 3, 4], &[1.0, 2.0, 4.0]);
        let err = normalized_spread(&a, &b, SpreadAlignment::Strict).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::MisalignedSeries {
                first_mismatch: Some(1),
                ..
            }
        ));
    }

    #[test]
    fn test_common_dates_inner_join() {
        let a = series("AAPL", &[1, 2, 3, 6], &[10.0, 11.0, 12.0, 13.0]);
        let b = series("MSFT", &[2, 3, 4, 6], &[5.0, 7.0, 6.0, 6.0]);
        let pair = align_pair(&a, &b, SpreadAlignment::CommonDates).unwrap();

        assert_eq!(pair.dates, vec![day(2), day(3), day(6)]);
        assert_eq!(pair.left, vec![11.0, 12.0, 13.0]);
        assert_eq!(pair.right, vec![5.0, 7.0, 6.0]);

        let spread = normalized_spread(&a, &b, SpreadAlignment::CommonDates).unwrap();
        assert_eq!(spread.raw, vec![6.0, 5.0, 7.0]);
    }

    #[test]
    fn test_common_dates_keep_pre_1970_calendar() {
        let ibm_days: Vec<NaiveDate> = (1..=4)
            .map(|d| NaiveDate::from_ymd_opt(1965, 3, d).unwrap())
            .collect();
        let ge_days: Vec<NaiveDate> = (2..=5)
            .map(|d| NaiveDate::from_ymd_opt(1965, 3, d).unwrap())
            .collect();
        let a = PriceSeries::from_closes("IBM", &ibm_days, &[4.0, 4.1, 4.3, 4.2]).unwrap();
        let b = PriceSeries::from_closes("GE", &ge_days, &[1.0, 1.5, 1.1, 1.3]).unwrap();

        let spread = normalized_spread(&a, &b, SpreadAlignment::CommonDates).unwrap();
        assert_eq!(spread.dates, ibm_days[1..].to_vec());
        assert_eq!(spread.len(), 3);
        let (latest, _) = spread.latest().unwrap();
        assert_eq!(latest, NaiveDate::from_ymd_opt(1965, 3, 4).unwrap());
    }

    #[test]
    fn test_constant_spread_is_degenerate() {
        let a = series("AAA", &[1, 2, 3], &[10.0, 11.0, 12.0]);
        let b = series("BBB", &[1, 2, 3], &[5.0, 6.0, 7.0]);
        assert!(matches!(
            normalized_spread(&a, &b, SpreadAlignment::Strict),
            Err(AnalyticsError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_single_point_is_degenerate() {
        assert!(matches!(zscore(&[1.0]), Err(AnalyticsError::DegenerateInput(_))));
    }

    #[rstest]
    #[case("strict", SpreadAlignment::Strict)]
    #[case("common-dates", SpreadAlignment::CommonDates)]
    #[case(" Common_Dates ", SpreadAlignment::CommonDates)]
    fn test_parse_alignment(#[case] input: &str, #[case] expected: SpreadAlignment) {
        assert_eq!(input.parse::<SpreadAlignment>().unwrap(), expected);
        assert_eq!(expected.to_string().parse::<SpreadAlignment>().unwrap(), expected);
    }
}
