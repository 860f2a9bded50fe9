//! Ticker-level analyses.
//!
//! Each function fetches what it needs through the gateway and then runs the
//! matching pure routine. Nothing is shared between calls: two analyses of the
//! same ticker fetch its history twice.

use crate::error::{AnalyticsError, Result};
use crate::monte_carlo::{PricePaths, SimulationConfig, simulate_paths};
use crate::moving_average::{MovingAverageConfig, MovingAverageFrame, moving_averages};
use crate::regression::{RegressionResult, SplitConfig, fit_trend};
use crate::spread::{NormalizedSpread, SpreadAlignment, normalized_spread};
use rand::Rng;
use stockbuddy_data::{MarketDataGateway, Period, PriceSeries};

/// History window used by single-ticker analyses.
pub const ANALYSIS_PERIOD: Period = Period::FiveYears;

/// History window used by pair analysis.
pub const PAIR_PERIOD: Period = Period::OneYear;

/// Fetch the five-year daily history of `symbol`.
pub async fn fetch_stock_data<G: MarketDataGateway>(
    gateway: &G,
    symbol: &str,
) -> Result<PriceSeries> {
    fetch(gateway, symbol, ANALYSIS_PERIOD, "fetch history").await
}

/// Fit a linear trend to five years of closes and evaluate it on held-out days.
pub async fn trend_regression<G: MarketDataGateway>(
    gateway: &G,
    symbol: &str,
    split: &SplitConfig,
) -> Result<RegressionResult> {
    let series = fetch(gateway, symbol, ANALYSIS_PERIOD, "trend regression").await?;
    fit_trend(&series, split)
}

/// Short and long moving averages over five years of closes.
pub async fn ticker_moving_averages<G: MarketDataGateway>(
    gateway: &G,
    symbol: &str,
    config: &MovingAverageConfig,
) -> Result<MovingAverageFrame> {
    let series = fetch(gateway, symbol, ANALYSIS_PERIOD, "moving averages").await?;
    moving_averages(&series, config)
}

/// Simulate future prices calibrated on five years of closes.
pub async fn ticker_monte_carlo<G, R>(
    gateway: &G,
    symbol: &str,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<PricePaths>
where
    G: MarketDataGateway,
    R: Rng + ?Sized,
{
    config.validate()?;
    let series = fetch(gateway, symbol, ANALYSIS_PERIOD, "monte carlo simulation").await?;
    simulate_paths(series.symbol(), &series.closes(), config, rng)
}

/// Fetch the close histories of two tickers over the same period.
///
/// Both requests are in flight at once; the first failure wins.
pub async fn fetch_pair_data<G: MarketDataGateway>(
    gateway: &G,
    left: &str,
    right: &str,
    period: Period,
) -> Result<(PriceSeries, PriceSeries)> {
    tokio::try_join!(
        fetch(gateway, left, period, "pair fetch"),
        fetch(gateway, right, period, "pair fetch"),
    )
}

/// Normalized spread of two tickers over `period`.
pub async fn pair_spread<G: MarketDataGateway>(
    gateway: &G,
    left: &str,
    right: &str,
    period: Period,
    alignment: SpreadAlignment,
) -> Result<NormalizedSpread> {
    let (a, b) = fetch_pair_data(gateway, left, right, period).await?;
    normalized_spread(&a, &b, alignment)
}

async fn fetch<G: MarketDataGateway>(
    gateway: &G,
    symbol: &str,
    period: Period,
    operation: &'static str,
) -> Result<PriceSeries> {
    let series = gateway
        .history(symbol, period)
        .await
        .map_err(AnalyticsError::upstream(operation, symbol))?;
    tracing::debug!(symbol = series.symbol(), %period, bars = series.len(), operation, "fetched history");
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use stockbuddy_data::InMemoryGateway;

    fn ramp(symbol: &str, n: usize, slope: f64) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..n).map(|i| start + Days::new(i as u64)).collect();
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + slope * i as f64).collect();
        PriceSeries::from_closes(symbol, &dates, &closes).unwrap()
    }

    fn gateway() -> InMemoryGateway {
        InMemoryGateway::new()
            .with_series(ramp("AAPL", 100, 0.5))
            .with_series(ramp("MSFT", 100, 0.3))
    }

    #[tokio::test]
    async fn test_each_analysis_refetches() {
        let gateway = gateway();
        trend_regression(&gateway, "aapl", &SplitConfig::default())
            .await
            .unwrap();
        ticker_moving_averages(&gateway, "AAPL", &MovingAverageConfig::default())
            .await
            .unwrap();
        assert_eq!(gateway.history_calls(), 2);
    }

    #[tokio::test]
    async fn test_monte_carlo_seeded() {
        let gateway = gateway();
        let config = SimulationConfig {
            days: 10,
            simulations: 20,
        };
        let a = ticker_monte_carlo(&gateway, "AAPL", &config, &mut StdRng::seed_from_u64(5))
            .await
            .unwrap();
        let b = ticker_monte_carlo(&gateway, "AAPL", &config, &mut StdRng::seed_from_u64(5))
            .await
            .unwrap();
        assert_eq!(a.paths(), b.paths());
        assert_eq!(a.seed_price(), 100.0 + 0.5 * 99.0);
    }

    #[tokio::test]
    async fn test_invalid_config_skips_fetch() {
        let gateway = gateway();
        let config = SimulationConfig {
            days: 0,
            simulations: 20,
        };
        let err = ticker_monte_carlo(&gateway, "AAPL", &config, &mut StdRng::seed_from_u64(0))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidParameter(_)));
        assert_eq!(gateway.history_calls(), 0);
    }

    #[tokio::test]
    async fn test_pair_spread_fetches_both() {
        let gateway = gateway();
        let spread = pair_spread(&gateway, "AAPL", "MSFT", PAIR_PERIOD, SpreadAlignment::Strict)
            .await
            .unwrap();
        assert_eq!(spread.len(), 100);
        assert_eq!(gateway.history_calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_ticker_carries_context() {
        let gateway = gateway();
        let err = pair_spread(&gateway, "AAPL", "NOPE", PAIR_PERIOD, SpreadAlignment::Strict)
            .await
            .unwrap_err();
        match err {
            AnalyticsError::Upstream {
                operation, symbol, ..
            } => {
                assert_eq!(operation, "pair fetch");
                assert_eq!(symbol, "NOPE");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
