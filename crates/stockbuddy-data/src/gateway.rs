//! The market data gateway abstraction.
//!
//! Analytics and dashboard code only ever talk to a [`MarketDataGateway`].
//! [`crate::yahoo::YahooGateway`] is the live implementation;
//! [`InMemoryGateway`] serves fixed data and is what tests and offline demos
//! run against.

use crate::error::{DataError, Result};
use crate::fundamentals::Fundamentals;
use crate::period::Period;
use crate::series::PriceSeries;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of price history and fundamentals, keyed by ticker symbol.
///
/// Implementations never cache: each call goes back to the source.
pub trait MarketDataGateway {
    /// Daily price history covering the trailing `period`.
    fn history(
        &self,
        symbol: &str,
        period: Period,
    ) -> impl Future<Output = Result<PriceSeries>> + Send;

    /// Dividends, statements, key metrics and news for `symbol`.
    fn fundamentals(&self, symbol: &str) -> impl Future<Output = Result<Fundamentals>> + Send;
}

/// Trim and upper-case a user supplied ticker, rejecting empty input.
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
    }
    Ok(symbol.to_ascii_uppercase())
}

/// Gateway backed by preloaded data.
///
/// `history` returns the stored series trimmed to the requested period,
/// measured back from the series' last date.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    series: HashMap<String, PriceSeries>,
    fundamentals: HashMap<String, Fundamentals>,
    history_calls: AtomicUsize,
    fundamentals_calls: AtomicUsize,
}

impl InMemoryGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a price series under its own symbol.
    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.series
            .insert(series.symbol().to_ascii_uppercase(), series);
        self
    }

    /// Register fundamentals under their own symbol.
    pub fn with_fundamentals(mut self, fundamentals: Fundamentals) -> Self {
        self.fundamentals
            .insert(fundamentals.symbol.to_ascii_uppercase(), fundamentals);
        self
    }

    /// Number of `history` calls served so far.
    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::Relaxed)
    }

    /// Number of `fundamentals` calls served so far.
    pub fn fundamentals_calls(&self) -> usize {
        self.fundamentals_calls.load(Ordering::Relaxed)
    }
}

impl MarketDataGateway for InMemoryGateway {
    async fn history(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        self.history_calls.fetch_add(1, Ordering::Relaxed);
        let symbol = normalize_symbol(symbol)?;
        let series = self
            .series
            .get(&symbol)
            .ok_or_else(|| DataError::MissingData {
                symbol: symbol.clone(),
                reason: "No price history available".to_string(),
            })?;

        let trimmed = match series.last_date().and_then(|end| period.start_from(end)) {
            Some(start) => series.since(start),
            None => series.clone(),
        };
        tracing::debug!(symbol = %symbol, %period, bars = trimmed.len(), "served history");
        Ok(trimmed)
    }

    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        self.fundamentals_calls.fetch_add(1, Ordering::Relaxed);
        let symbol = normalize_symbol(symbol)?;
        self.fundamentals
            .get(&symbol)
            .cloned()
            .ok_or_else(|| DataError::MissingData {
                symbol,
                reason: "No fundamentals available".to_string(),
            })
    }
}
