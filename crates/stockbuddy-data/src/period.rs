//! Trailing history windows.

use crate::error::{DataError, Result};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trailing window of history requested from the gateway.
///
/// The string form is the token Yahoo Finance accepts as a chart `range`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// One month
    #[serde(rename = "1mo")]
    OneMonth,
    /// Three months
    #[serde(rename = "3mo")]
    ThreeMonths,
    /// Six months
    #[serde(rename = "6mo")]
    SixMonths,
    /// One year
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    /// Five years
    #[serde(rename = "5y")]
    FiveYears,
    /// Entire available history
    #[serde(rename = "max")]
    Max,
}

impl Period {
    /// All periods, shortest first.
    pub const ALL: [Self; 6] = [
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::FiveYears,
        Self::Max,
    ];

    /// The wire token for this period.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::FiveYears => "5y",
            Self::Max => "max",
        }
    }

    /// Length of the window in calendar months, `None` for [`Period::Max`].
    pub const fn months(&self) -> Option<u32> {
        match self {
            Self::OneMonth => Some(1),
            Self::ThreeMonths => Some(3),
            Self::SixMonths => Some(6),
            Self::OneYear => Some(12),
            Self::FiveYears => Some(60),
            Self::Max => None,
        }
    }

    /// First date covered by this window when it ends on `end`.
    pub fn start_from(&self, end: NaiveDate) -> Option<NaiveDate> {
        self.months()
            .and_then(|m| end.checked_sub_months(Months::new(m)))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == token)
            .ok_or_else(|| DataError::InvalidPeriod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1mo", Period::OneMonth)]
    #[case("3mo", Period::ThreeMonths)]
    #[case("6mo", Period::SixMonths)]
    #[case("1y", Period::OneYear)]
    #[case("5Y", Period::FiveYears)]
    #[case(" max ", Period::Max)]
    fn test_parse_period(#[case] token: &str, #[case] expected: Period) {
        assert_eq!(token.parse::<Period>().unwrap(), expected);
    }

    #[test]
    fn test_invalid_period() {
        assert!(matches!(
            "2w".parse::<Period>(),
            Err(DataError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn test_display_matches_token() {
        for period in Period::ALL {
            assert_eq!(period.to_string().parse::<Period>().unwrap(), period);
        }
    }

    #[test]
    fn test_start_from() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(
            Period::OneMonth.start_from(end),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            Period::OneYear.start_from(end),
            NaiveDate::from_ymd_opt(2023, 3, 31)
        );
        assert_eq!(Period::Max.start_from(end), None);
    }
}
