//! View models for the five dashboard tabs.
//!
//! Views hold typed data only. Number formatting and layout belong to the
//! renderer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stockbuddy_analytics::{
    MovingAverageFrame, NormalizedSpread, PricePaths, RegressionResult, SpreadAlignment, Summary,
};
use stockbuddy_data::{CompanyInfo, Fundamentals, IncomeStatement, NewsArticle, Period, PriceField, PriceSeries};

/// How a metric value should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    /// Whole-dollar amount, e.g. market cap
    Currency(f64),
    /// Plain number shown with two decimals
    Number(f64),
    /// Fraction shown as a percentage
    Percent(f64),
    /// Not reported by the source
    Missing,
}

impl MetricValue {
    fn currency(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Currency)
    }

    fn number(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Number)
    }

    fn percent(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Percent)
    }
}

/// A labelled metric card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Display label
    pub label: String,
    /// Value
    pub value: MetricValue,
}

impl Metric {
    fn new(label: &str, value: MetricValue) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

/// Outcome of building one section of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
    /// Built successfully
    Ready {
        /// Section content
        data: T,
    },
    /// Failed to build
    Failed {
        /// Error description
        error: String,
    },
}

impl<T> Section<T> {
    /// Wrap a fallible build, logging failures under `name`.
    pub fn from_result<E: std::fmt::Display>(name: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Ready { data },
            Err(e) => {
                tracing::warn!(section = name, error = %e, "section failed");
                Self::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Content, if the section built.
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready { data } => Some(data),
            Self::Failed { .. } => None,
        }
    }

    /// Error text, if the section failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Ready { .. } => None,
            Self::Failed { error } => Some(error),
        }
    }
}

/// Company description, headline metrics and news.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewView {
    /// Ticker symbol
    pub symbol: String,
    /// Long business summary
    pub description: Option<String>,
    /// Market Cap, P/E Ratio, Dividend Yield, 52 Week High
    pub metrics: Vec<Metric>,
    /// Most recent headlines
    pub news: Vec<NewsArticle>,
}

impl OverviewView {
    /// Build from fundamentals, keeping at most `news_count` headlines.
    pub fn from_fundamentals(fundamentals: &Fundamentals, news_count: usize) -> Self {
        let info = &fundamentals.info;
        Self {
            symbol: fundamentals.symbol.clone(),
            description: info.long_business_summary.clone(),
            metrics: vec![
                Metric::new("Market Cap", MetricValue::currency(info.market_cap)),
                Metric::new("P/E Ratio", MetricValue::number(info.forward_pe)),
                Metric::new("Dividend Yield", MetricValue::percent(info.dividend_yield)),
                Metric::new("52 Week High", MetricValue::number(info.fifty_two_week_high)),
            ],
            news: fundamentals.news.iter().take(news_count).cloned().collect(),
        }
    }
}

/// Revenue and net income for one fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Fiscal period end
    pub end_date: Option<NaiveDate>,
    /// Total revenue
    pub revenue: Option<f64>,
    /// Net income
    pub net_income: Option<f64>,
}

/// Key ratios, income statements and the revenue trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialsView {
    /// Ticker symbol
    pub symbol: String,
    /// Seven key ratios
    pub ratios: Vec<Metric>,
    /// Annual income statements, most recent first
    pub annual: Vec<IncomeStatement>,
    /// Quarterly income statements, most recent first
    pub quarterly: Vec<IncomeStatement>,
    /// Revenue and net income, oldest first
    pub trend: Vec<TrendPoint>,
}

impl FinancialsView {
    /// Build from fundamentals.
    pub fn from_fundamentals(fundamentals: &Fundamentals) -> Self {
        let mut trend: Vec<TrendPoint> = fundamentals
            .financials
            .iter()
            .map(|s| TrendPoint {
                end_date: s.end_date,
                revenue: s.total_revenue,
                net_income: s.net_income,
            })
            .collect();
        trend.sort_by_key(|p| p.end_date);

        Self {
            symbol: fundamentals.symbol.clone(),
            ratios: key_ratios(&fundamentals.info),
            annual: fundamentals.financials.clone(),
            quarterly: fundamentals.quarterly_financials.clone(),
            trend,
        }
    }

    /// Ratios split into a left and right column; the left gets the smaller half.
    pub fn ratio_columns(&self) -> (&[Metric], &[Metric]) {
        self.ratios.split_at(self.ratios.len() / 2)
    }
}

fn key_ratios(info: &CompanyInfo) -> Vec<Metric> {
    vec![
        Metric::new("Profit Margin", MetricValue::number(info.profit_margins)),
        Metric::new("Return on Assets (ROA)", MetricValue::number(info.return_on_assets)),
        Metric::new("Return on Equity (ROE)", MetricValue::number(info.return_on_equity)),
        Metric::new("Price to Earnings (P/E)", MetricValue::number(info.forward_pe)),
        Metric::new("Price to Book (P/B)", MetricValue::number(info.price_to_book)),
        Metric::new("Debt to Equity", MetricValue::number(info.debt_to_equity)),
        Metric::new("Current Ratio", MetricValue::number(info.current_ratio)),
    ]
}

/// One price column over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalView {
    /// Ticker symbol
    pub symbol: String,
    /// Period shown
    pub period: Period,
    /// Column shown
    pub field: PriceField,
    /// Trading dates
    pub dates: Vec<NaiveDate>,
    /// Column values
    pub values: Vec<f64>,
    /// Whether the full data table was requested
    pub show_table: bool,
}

impl HistoricalView {
    /// Select `field` from a fetched series.
    pub fn from_series(series: &PriceSeries, period: Period, field: PriceField, show_table: bool) -> Self {
        Self {
            symbol: series.symbol().to_string(),
            period,
            field,
            dates: series.dates(),
            values: series.field(field),
            show_table,
        }
    }
}

/// Regression, moving averages and the Monte Carlo forecast.
///
/// Each part fetches independently, so each can fail on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsView {
    /// Ticker symbol
    pub symbol: String,
    /// Held-out actual vs predicted closes
    pub regression: Section<RegressionResult>,
    /// Close with short and long moving averages
    pub moving_averages: Section<MovingAverageFrame>,
    /// Simulated price paths
    pub monte_carlo: Section<PricePaths>,
}

/// Normalized spread of a ticker pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageView {
    /// Period both histories cover
    pub period: Period,
    /// Alignment applied before differencing
    pub alignment: SpreadAlignment,
    /// Z-scored spread
    pub spread: NormalizedSpread,
    /// Descriptive statistics of the spread
    pub summary: Summary,
}

/// All five views for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Ticker symbol
    pub symbol: String,
    /// Validation messages shown above the views
    pub warnings: Vec<String>,
    /// Overview tab
    pub overview: Section<OverviewView>,
    /// Financials tab
    pub financials: Section<FinancialsView>,
    /// Historical Data tab
    pub history: Section<HistoricalView>,
    /// Advanced Analytics tab
    pub analytics: AnalyticsView,
    /// Arbitrage tab
    pub arbitrage: Section<ArbitrageView>,
}
