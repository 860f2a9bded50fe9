//! Daily price series.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One daily OHLCV sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date
    pub date: NaiveDate,
    /// Opening price
    pub open: f64,
    /// Session high
    pub high: f64,
    /// Session low
    pub low: f64,
    /// Closing price, adjusted for splits and dividends when fetched from Yahoo
    pub close: f64,
    /// Traded volume
    pub volume: u64,
    /// Split and dividend adjusted close
    pub adjusted_close: f64,
}

impl PriceBar {
    /// A bar where every price equals `close`. Useful for close-only sources.
    pub const fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
            adjusted_close: close,
        }
    }

    /// Value of the requested column.
    pub const fn value(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Close => self.close,
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Volume => self.volume as f64,
        }
    }
}

/// Selectable column of a price series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceField {
    /// Closing price, adjusted for splits and dividends when fetched from Yahoo
    #[default]
    Close,
    /// Opening price
    Open,
    /// Session high
    High,
    /// Session low
    Low,
    /// Volume
    Volume,
}

impl PriceField {
    /// All fields in display order.
    pub const ALL: [Self; 5] = [
        Self::Close,
        Self::Open,
        Self::High,
        Self::Low,
        Self::Volume,
    ];

    /// Display name of the field.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Close => "Close",
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Volume => "Volume",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceField {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DataError::InvalidField(s.to_string()))
    }
}

/// Ordered daily history for one ticker.
///
/// Dates are strictly increasing. Gaps (weekends, holidays) are left as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, rejecting bars whose dates are not strictly increasing.
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self> {
        let symbol = symbol.into();
        if let Some(index) = bars
            .windows(2)
            .position(|pair| pair[1].date <= pair[0].date)
        {
            return Err(DataError::UnorderedSeries {
                symbol,
                index: index + 1,
            });
        }
        Ok(Self { symbol, bars })
    }

    /// Build a close-only series from parallel date and price slices.
    pub fn from_closes(
        symbol: impl Into<String>,
        dates: &[NaiveDate],
        closes: &[f64],
    ) -> Result<Self> {
        let symbol = symbol.into();
        if dates.len() != closes.len() {
            return Err(DataError::Parse(format!(
                "{symbol}: {} dates but {} closes",
                dates.len(),
                closes.len()
            )));
        }
        let bars = dates
            .iter()
            .zip(closes)
            .map(|(&date, &close)| PriceBar::from_close(date, close))
            .collect();
        Self::new(symbol, bars)
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// All bars, oldest first.
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Number of bars.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the series has no bars.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Trading dates, oldest first.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Closing prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.field(PriceField::Close)
    }

    /// Values of one column, oldest first.
    pub fn field(&self, field: PriceField) -> Vec<f64> {
        self.bars.iter().map(|b| b.value(field)).collect()
    }

    /// Most recent close.
    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Earliest date in the series.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    /// Most recent date in the series.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Bars dated on or after `start`.
    pub fn since(&self, start: NaiveDate) -> Self {
        Self {
            symbol: self.symbol.clone(),
            bars: self
                .bars
                .iter()
                .filter(|b| b.date >= start)
                .copied()
                .collect(),
        }
    }

    /// Convert to a Polars DataFrame.
    ///
    /// Columns: date, open, high, low, close, volume, adjusted_close
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
            .ok_or_else(|| DataError::TimeConversion("invalid epoch".to_string()))?;
        let days: Vec<i32> = self
            .bars
            .iter()
            .map(|b| (b.date - epoch).num_days() as i32)
            .collect();

        let df = DataFrame::new(vec![
            Series::new("date".into(), days)
                .cast(&DataType::Date)?
                .into(),
            Series::new("open".into(), self.field(PriceField::Open)).into(),
            Series::new("high".into(), self.field(PriceField::High)).into(),
            Series::new("low".into(), self.field(PriceField::Low)).into(),
            Series::new("close".into(), self.closes()).into(),
            Series::new(
                "volume".into(),
                self.bars.iter().map(|b| b.volume).collect::<Vec<u64>>(),
            )
            .into(),
            Series::new(
                "adjusted_close".into(),
                self.bars
                    .iter()
                    .map(|b| b.adjusted_close)
                    .collect::<Vec<f64>>(),
            )
            .into(),
        ])?;

        Ok(df)
    }
}
