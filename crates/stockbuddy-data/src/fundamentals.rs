//! Company fundamentals: dividends, statements, key metrics and news.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dividend payment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    /// Ex-dividend date
    pub date: NaiveDate,
    /// Amount paid per share
    pub amount: f64,
}

/// One income statement (annual or quarterly).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    /// Fiscal period end
    pub end_date: Option<NaiveDate>,
    /// Total revenue
    pub total_revenue: Option<f64>,
    /// Cost of revenue
    pub cost_of_revenue: Option<f64>,
    /// Gross profit
    pub gross_profit: Option<f64>,
    /// Operating income
    pub operating_income: Option<f64>,
    /// Net income
    pub net_income: Option<f64>,
}

/// One balance sheet snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// Fiscal period end
    pub end_date: Option<NaiveDate>,
    /// Total assets
    pub total_assets: Option<f64>,
    /// Total liabilities
    pub total_liabilities: Option<f64>,
    /// Total stockholder equity
    pub total_stockholder_equity: Option<f64>,
    /// Cash and equivalents
    pub cash: Option<f64>,
    /// Long-term debt
    pub long_term_debt: Option<f64>,
}

/// Descriptive company data and headline ratios.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Long business summary
    pub long_business_summary: Option<String>,
    /// Market capitalization
    pub market_cap: Option<f64>,
    /// Forward P/E ratio
    pub forward_pe: Option<f64>,
    /// Dividend yield as a fraction
    pub dividend_yield: Option<f64>,
    /// 52-week high
    pub fifty_two_week_high: Option<f64>,
    /// Profit margin
    pub profit_margins: Option<f64>,
    /// Return on assets
    pub return_on_assets: Option<f64>,
    /// Return on equity
    pub return_on_equity: Option<f64>,
    /// Price to book ratio
    pub price_to_book: Option<f64>,
    /// Debt to equity ratio
    pub debt_to_equity: Option<f64>,
    /// Current ratio
    pub current_ratio: Option<f64>,
}

/// A news headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// Headline
    pub title: String,
    /// Article URL
    pub link: String,
    /// Publisher name
    pub publisher: Option<String>,
}

/// Everything the gateway knows about a company beyond its price history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    /// Stock symbol
    pub symbol: String,
    /// Dividend history, oldest first
    pub dividends: Vec<Dividend>,
    /// Annual income statements, most recent first
    pub financials: Vec<IncomeStatement>,
    /// Quarterly income statements, most recent first
    pub quarterly_financials: Vec<IncomeStatement>,
    /// Annual balance sheets, most recent first
    pub balance_sheet: Vec<BalanceSheet>,
    /// Company description and key metrics
    pub info: CompanyInfo,
    /// Recent headlines
    pub news: Vec<NewsArticle>,
}

impl Fundamentals {
    /// Fundamentals with nothing populated.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }
}
