//! Live [`MarketDataGateway`] over Yahoo Finance.

use super::fundamentals::YahooFundamentalsProvider;
use super::quotes::YahooQuoteProvider;
use super::session::{DEFAULT_USER_AGENT, YahooSession};
use crate::error::Result;
use crate::fundamentals::Fundamentals;
use crate::gateway::{MarketDataGateway, normalize_symbol};
use crate::period::Period;
use crate::retry::RetryPolicy;
use crate::series::PriceSeries;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for [`YahooGateway`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Retry policy around every request
    pub retry: RetryPolicy,
    /// Pause after each successful request
    pub rate_limit_delay: Duration,
    /// User agent sent to Yahoo
    pub user_agent: String,
    /// Number of news headlines to fetch with fundamentals
    pub news_count: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            rate_limit_delay: Duration::from_millis(250),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            news_count: 5,
        }
    }
}

/// Yahoo Finance backed gateway.
#[derive(Debug)]
pub struct YahooGateway {
    quotes: YahooQuoteProvider,
    fundamentals: YahooFundamentalsProvider,
    config: GatewayConfig,
}

impl YahooGateway {
    /// Create a gateway with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(GatewayConfig::default())
    }

    /// Create a gateway with custom settings.
    pub fn with_config(config: GatewayConfig) -> Result<Self> {
        let session = YahooSession::new(&config.user_agent)?;
        Ok(Self {
            quotes: YahooQuoteProvider::with_rate_limit(config.rate_limit_delay)?,
            fundamentals: YahooFundamentalsProvider::new(session, config.rate_limit_delay),
            config,
        })
    }

    /// Active settings.
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl MarketDataGateway for YahooGateway {
    async fn history(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        let symbol = normalize_symbol(symbol)?;
        let label = format!("history {symbol} {period}");
        self.config
            .retry
            .run(&label, || self.quotes.fetch_history(&symbol, period))
            .await
    }

    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        let symbol = normalize_symbol(symbol)?;
        let retry = self.config.retry;

        let summary = retry
            .run(&format!("quoteSummary {symbol}"), || {
                self.fundamentals.fetch_summary(&symbol)
            })
            .await?;

        let dividends = retry
            .run(&format!("dividends {symbol}"), || {
                self.quotes.fetch_dividends(&symbol)
            })
            .await?;

        // Headlines are decoration; a failed search leaves the list empty.
        let news = match retry
            .run(&format!("news {symbol}"), || {
                self.fundamentals.fetch_news(&symbol, self.config.news_count)
            })
            .await
        {
            Ok(news) => news,
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "failed to fetch news");
                Vec::new()
            }
        };

        Ok(Fundamentals {
            symbol,
            dividends,
            financials: summary.financials,
            quarterly_financials: summary.quarterly_financials,
            balance_sheet: summary.balance_sheet,
            info: summary.info,
            news,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.news_count, 5);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[tokio::test]
    async fn test_rejects_empty_symbol_without_network() {
        let gateway = YahooGateway::new().unwrap();
        let err = gateway.history("  ", Period::OneYear).await.unwrap_err();
        assert!(matches!(err, DataError::InvalidSymbol(_)));
    }

    #[tokio::test]
    #[ignore = "requires network access to Yahoo Finance"]
    async fn test_live_fundamentals() {
        let gateway = YahooGateway::new().unwrap();
        let fundamentals = gateway.fundamentals("MSFT").await.unwrap();
        assert_eq!(fundamentals.symbol, "MSFT");
        assert!(!fundamentals.dividends.is_empty());
    }
}
