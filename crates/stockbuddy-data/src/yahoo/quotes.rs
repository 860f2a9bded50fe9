//! Quote data fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use crate::fundamentals::Dividend;
use crate::gateway::normalize_symbol;
use crate::period::Period;
use crate::series::{PriceBar, PriceSeries};
use chrono::{DateTime, NaiveDate};
use std::time::Duration;
use tokio::time::sleep;
use yahoo_finance_api as yahoo;

/// Daily bars.
const DAILY_INTERVAL: &str = "1d";

/// Yahoo Finance quote provider with rate limiting.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a new Yahoo Finance quote provider with default rate limiting (250ms).
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_millis(250))
    }

    /// Create a new Yahoo Finance quote provider with custom rate limiting.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            rate_limit_delay,
        })
    }

    /// Fetch daily OHLCV history for a single symbol over a trailing period.
    ///
    /// # Arguments
    /// * `symbol` - The ticker symbol (e.g., "AAPL")
    /// * `period` - The trailing window to fetch
    pub async fn fetch_history(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        let symbol = normalize_symbol(symbol)?;

        let response = self
            .provider
            .get_quote_range(&symbol, DAILY_INTERVAL, period.as_str())
            .await?;

        let quotes = response.quotes()?;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol,
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        let bars = quotes
            .iter()
            .map(adjusted_bar)
            .collect::<Result<Vec<_>>>()?;

        let series = PriceSeries::new(symbol.clone(), dedupe_by_date(bars))?;
        tracing::debug!(symbol = %symbol, %period, bars = series.len(), "fetched history");

        // Apply rate limiting
        sleep(self.rate_limit_delay).await;

        Ok(series)
    }

    /// Fetch the full dividend history for a symbol, oldest first.
    pub async fn fetch_dividends(&self, symbol: &str) -> Result<Vec<Dividend>> {
        let symbol = normalize_symbol(symbol)?;

        let response = self
            .provider
            .get_quote_range(&symbol, DAILY_INTERVAL, Period::Max.as_str())
            .await?;

        let mut dividends = response
            .dividends()?
            .iter()
            .map(|d| {
                Ok(Dividend {
                    date: timestamp_to_date(d.date as i64)?,
                    amount: d.amount,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        dividends.sort_by_key(|d| d.date);
        tracing::debug!(symbol = %symbol, count = dividends.len(), "fetched dividends");

        sleep(self.rate_limit_delay).await;

        Ok(dividends)
    }
}

/// Convert a Unix timestamp in seconds to its UTC calendar date.
pub(crate) fn timestamp_to_date(timestamp: i64) -> Result<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| DataError::TimeConversion(format!("invalid timestamp {timestamp}")))
}

/// Convert a chart quote to a bar with prices adjusted for splits and
/// dividends. Open, high, low and close are scaled by `adjclose / close`.
fn adjusted_bar(quote: &yahoo::Quote) -> Result<PriceBar> {
    let factor = if quote.close > 0.0 && quote.adjclose > 0.0 {
        quote.adjclose / quote.close
    } else {
        1.0
    };
    Ok(PriceBar {
        date: timestamp_to_date(quote.timestamp)?,
        open: quote.open * factor,
        high: quote.high * factor,
        low: quote.low * factor,
        close: quote.close * factor,
        volume: quote.volume,
        adjusted_close: quote.adjclose,
    })
}

/// Yahoo occasionally repeats the live session as a second bar for the same
/// day. Keep the last bar per date.
fn dedupe_by_date(bars: Vec<PriceBar>) -> Vec<PriceBar> {
    let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_timestamp_to_date() {
        // 2024-01-02 14:30:00 UTC
        let date = timestamp_to_date(1_704_205_800).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_adjusted_bar_scales_prices() {
        let quote = yahoo::Quote {
            timestamp: 1_704_205_800,
            open: 100.0,
            high: 110.0,
            low: 90.0,
            volume: 1_000,
            close: 104.0,
            adjclose: 102.96,
        };
        let bar = adjusted_bar(&quote).unwrap();
        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_relative_eq!(bar.close, 102.96, epsilon = 1e-9);
        assert_relative_eq!(bar.open, 99.0, epsilon = 1e-9);
        assert_relative_eq!(bar.high, 108.9, epsilon = 1e-9);
        assert_relative_eq!(bar.low, 89.1, epsilon = 1e-9);
        assert_eq!(bar.volume, 1_000);
    }

    #[test]
    fn test_adjusted_bar_without_adjclose_keeps_raw_prices() {
        let quote = yahoo::Quote {
            timestamp: 1_704_205_800,
            open: 10.0,
            high: 12.0,
            low: 9.0,
            volume: 5,
            close: 11.0,
            adjclose: 0.0,
        };
        let bar = adjusted_bar(&quote).unwrap();
        assert_eq!(bar.close, 11.0);
        assert_eq!(bar.open, 10.0);
    }

    #[test]
    fn test_dedupe_keeps_last_bar_per_day() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let next = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let bars = vec![
            PriceBar::from_close(day, 1.0),
            PriceBar::from_close(next, 2.0),
            PriceBar::from_close(next, 2.5),
        ];
        let deduped = dedupe_by_date(bars);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[1].close, 2.5);
    }

    #[tokio::test]
    #[ignore = "requires network access to Yahoo Finance"]
    async fn test_fetch_history() {
        let provider = YahooQuoteProvider::new().unwrap();
        let series = provider.fetch_history("AAPL", Period::OneMonth).await.unwrap();
        assert!(!series.is_empty());
        assert_eq!(series.symbol(), "AAPL");
    }

    #[tokio::test]
    async fn test_invalid_symbol() {
        let provider = YahooQuoteProvider::new().unwrap();
        let result = provider.fetch_history("", Period::OneYear).await;
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
    }
}
