//! Builds the dashboard views for a ticker.
//!
//! Every view goes back to the gateway for its own data. A view that fails is
//! recorded as [`Section::Failed`] and the remaining views still build.

use crate::error::{DashboardError, Result};
use crate::validator::validate_stock_data;
use crate::views::{
    AnalyticsView, ArbitrageView, DashboardReport, FinancialsView, HistoricalView, OverviewView,
    Section,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use stockbuddy_analytics::{
    MovingAverageConfig, SimulationConfig, SplitConfig, SpreadAlignment, pair_spread,
    ticker_monte_carlo, ticker_moving_averages, trend_regression,
};
use stockbuddy_data::{MarketDataGateway, Period, PriceField, normalize_symbol};

/// Shortest Monte Carlo horizon the dashboard accepts.
pub const MIN_HORIZON_DAYS: usize = 10;

/// Longest Monte Carlo horizon the dashboard accepts.
pub const MAX_HORIZON_DAYS: usize = 365;

/// Dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Period of the Historical Data view
    pub history_period: Period,
    /// Column of the Historical Data view
    pub field: PriceField,
    /// Include the full data table in the Historical Data view
    pub show_table: bool,
    /// Regression train/test split
    pub split: SplitConfig,
    /// Moving average windows
    pub moving_averages: MovingAverageConfig,
    /// Monte Carlo horizon and ensemble size
    pub simulation: SimulationConfig,
    /// Seed for the Monte Carlo generator
    pub simulation_seed: u64,
    /// First ticker of the pair
    pub pair_left: String,
    /// Second ticker of the pair
    pub pair_right: String,
    /// Period of the pair histories
    pub pair_period: Period,
    /// How the pair is aligned
    pub alignment: SpreadAlignment,
    /// Headlines shown in the overview
    pub news_count: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            history_period: Period::OneYear,
            field: PriceField::Close,
            show_table: false,
            split: SplitConfig::default(),
            moving_averages: MovingAverageConfig::default(),
            simulation: SimulationConfig::default(),
            simulation_seed: 0,
            pair_left: "AAPL".to_string(),
            pair_right: "MSFT".to_string(),
            pair_period: Period::OneYear,
            alignment: SpreadAlignment::Strict,
            news_count: 5,
        }
    }
}

impl DashboardConfig {
    /// Check every setting, before any data is fetched.
    pub fn validate(&self) -> Result<()> {
        let days = self.simulation.days;
        if !(MIN_HORIZON_DAYS..=MAX_HORIZON_DAYS).contains(&days) {
            return Err(DashboardError::InvalidConfig(format!(
                "forecast horizon must be between {MIN_HORIZON_DAYS} and {MAX_HORIZON_DAYS} days, got {days}"
            )));
        }
        self.simulation.validate()?;
        self.moving_averages.validate()?;
        self.split.validate()?;
        normalize_symbol(&self.pair_left)?;
        normalize_symbol(&self.pair_right)?;
        Ok(())
    }
}

/// Dashboard over a market data gateway.
#[derive(Debug)]
pub struct Dashboard<G> {
    gateway: G,
    config: DashboardConfig,
}

impl<G: MarketDataGateway> Dashboard<G> {
    /// Create a dashboard, rejecting invalid settings.
    pub fn new(gateway: G, config: DashboardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { gateway, config })
    }

    /// Underlying gateway.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Active settings.
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Advisory messages for missing fundamentals.
    pub async fn warnings(&self, symbol: &str) -> Result<Vec<String>> {
        Ok(validate_stock_data(&self.gateway, symbol).await?)
    }

    /// Overview tab.
    pub async fn overview(&self, symbol: &str) -> Result<OverviewView> {
        let fundamentals = self.gateway.fundamentals(symbol).await?;
        Ok(OverviewView::from_fundamentals(&fundamentals, self.config.news_count))
    }

    /// Financials tab.
    pub async fn financials(&self, symbol: &str) -> Result<FinancialsView> {
        let fundamentals = self.gateway.fundamentals(symbol).await?;
        Ok(FinancialsView::from_fundamentals(&fundamentals))
    }

    /// Historical Data tab with the configured period and column.
    pub async fn history(&self, symbol: &str) -> Result<HistoricalView> {
        self.history_with(symbol, self.config.history_period, self.config.field)
            .await
    }

    /// Historical Data tab with an explicit period and column.
    pub async fn history_with(
        &self,
        symbol: &str,
        period: Period,
        field: PriceField,
    ) -> Result<HistoricalView> {
        let series = self.gateway.history(symbol, period).await?;
        Ok(HistoricalView::from_series(
            &series,
            period,
            field,
            self.config.show_table,
        ))
    }

    /// Advanced Analytics tab.
    ///
    /// The Monte Carlo generator is seeded from the settings, so repeated
    /// calls produce the same forecast.
    pub async fn analytics(&self, symbol: &str) -> Result<AnalyticsView> {
        let symbol = normalize_symbol(symbol)?;
        let config = &self.config;

        let regression = trend_regression(&self.gateway, &symbol, &config.split).await;
        let moving_averages =
            ticker_moving_averages(&self.gateway, &symbol, &config.moving_averages).await;
        let mut rng = StdRng::seed_from_u64(config.simulation_seed);
        let monte_carlo =
            ticker_monte_carlo(&self.gateway, &symbol, &config.simulation, &mut rng).await;

        Ok(AnalyticsView {
            symbol,
            regression: Section::from_result("regression", regression),
            moving_averages: Section::from_result("moving averages", moving_averages),
            monte_carlo: Section::from_result("monte carlo", monte_carlo),
        })
    }

    /// Arbitrage tab for the configured pair.
    pub async fn arbitrage(&self) -> Result<ArbitrageView> {
        self.arbitrage_for(&self.config.pair_left, &self.config.pair_right)
            .await
    }

    /// Arbitrage tab for an explicit pair.
    pub async fn arbitrage_for(&self, left: &str, right: &str) -> Result<ArbitrageView> {
        let period = self.config.pair_period;
        let alignment = self.config.alignment;
        let spread = pair_spread(&self.gateway, left, right, period, alignment).await?;
        let summary = spread.summary()?;
        Ok(ArbitrageView {
            period,
            alignment,
            spread,
            summary,
        })
    }

    /// Every view for `symbol`, validation first.
    pub async fn build(&self, symbol: &str) -> DashboardReport {
        let display_symbol = symbol.trim().to_ascii_uppercase();
        tracing::info!(symbol = %display_symbol, "building dashboard");

        let warnings = match self.warnings(symbol).await {
            Ok(warnings) => warnings,
            Err(e) => {
                tracing::warn!(symbol = %display_symbol, error = %e, "validation failed");
                vec![format!("Could not validate {display_symbol}: {e}")]
            }
        };

        let analytics = match self.analytics(symbol).await {
            Ok(view) => view,
            Err(e) => {
                tracing::warn!(symbol = %display_symbol, error = %e, "analytics failed");
                let error = e.to_string();
                AnalyticsView {
                    symbol: display_symbol.clone(),
                    regression: Section::Failed {
                        error: error.clone(),
                    },
                    moving_averages: Section::Failed {
                        error: error.clone(),
                    },
                    monte_carlo: Section::Failed { error },
                }
            }
        };

        DashboardReport {
            symbol: display_symbol,
            warnings,
            overview: Section::from_result("overview", self.overview(symbol).await),
            financials: Section::from_result("financials", self.financials(symbol).await),
            history: Section::from_result("history", self.history(symbol).await),
            analytics,
            arbitrage: Section::from_result("arbitrage", self.arbitrage().await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};
    use rstest::rstest;
    use stockbuddy_data::{
        BalanceSheet, Dividend, Fundamentals, InMemoryGateway, IncomeStatement, PriceSeries,
    };

    fn series(symbol: &str, n: usize, slope: f64) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..n).map(|i| start + Days::new(i as u64)).collect();
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + slope * i as f64 + (i as f64).sin())
            .collect();
        PriceSeries::from_closes(symbol, &dates, &closes).unwrap()
    }

    fn gateway() -> InMemoryGateway {
        let mut fundamentals = Fundamentals::empty("AAPL");
        fundamentals.dividends = vec![Dividend {
            date: NaiveDate::from_ymd_opt(2024, 2, 9).unwrap(),
            amount: 0.24,
        }];
        fundamentals.financials = vec![IncomeStatement::default()];
        fundamentals.balance_sheet = vec![BalanceSheet::default()];

        InMemoryGateway::new()
            .with_series(series("AAPL", 200, 0.4))
            .with_series(series("MSFT", 200, 0.2))
            .with_fundamentals(fundamentals)
    }

    #[rstest]
    #[case(9)]
    #[case(366)]
    fn test_horizon_bounds(#[case] days: usize) {
        let config = DashboardConfig {
            simulation: SimulationConfig {
                days,
                simulations: 10,
            },
            ..DashboardConfig::default()
        };
        assert!(matches!(
            Dashboard::new(InMemoryGateway::new(), config),
            Err(DashboardError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_full_build() {
        let config = DashboardConfig {
            simulation: SimulationConfig {
                days: 10,
                simulations: 25,
            },
            ..DashboardConfig::default()
        };
        let dashboard = Dashboard::new(gateway(), config).unwrap();
        let report = dashboard.build("aapl").await;

        assert_eq!(report.symbol, "AAPL");
        assert!(report.warnings.is_empty());
        assert!(report.overview.ready().is_some());
        assert!(report.financials.ready().is_some());
        assert_eq!(report.history.ready().unwrap().values.len(), 200);
        assert!(report.analytics.regression.ready().is_some());
        assert!(report.analytics.moving_averages.ready().is_some());
        assert_eq!(report.analytics.monte_carlo.ready().unwrap().days(), 10);
        assert_eq!(report.arbitrage.ready().unwrap().spread.len(), 200);
    }

    #[tokio::test]
    async fn test_failed_view_does_not_abort_others() {
        // No fundamentals for MSFT: overview, financials and validation fail.
        let dashboard = Dashboard::new(gateway(), DashboardConfig::default()).unwrap();
        let report = dashboard.build("MSFT").await;

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("Could not validate MSFT"));
        assert!(report.overview.error().is_some());
        assert!(report.financials.error().is_some());
        assert!(report.history.ready().is_some());
        assert!(report.analytics.moving_averages.ready().is_some());
    }

    #[tokio::test]
    async fn test_analytics_is_reproducible() {
        let dashboard = Dashboard::new(gateway(), DashboardConfig::default()).unwrap();
        let a = dashboard.analytics("AAPL").await.unwrap();
        let b = dashboard.analytics("AAPL").await.unwrap();
        assert_eq!(a.monte_carlo, b.monte_carlo);
        assert_eq!(a.regression, b.regression);
    }

    #[tokio::test]
    async fn test_history_with_field() {
        let dashboard = Dashboard::new(gateway(), DashboardConfig::default()).unwrap();
        let view = dashboard
            .history_with("AAPL", Period::OneMonth, PriceField::Volume)
            .await
            .unwrap();
        assert_eq!(view.field, PriceField::Volume);
        assert!(view.values.iter().all(|v| *v == 0.0));
        assert!(view.values.len() < 35);
    }
}
