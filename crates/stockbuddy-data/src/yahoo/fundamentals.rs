//! Fundamental data fetching from Yahoo Finance.
//!
//! Company info and statements come from the `quoteSummary` endpoint; news
//! headlines come from the public search endpoint.

use super::quotes::timestamp_to_date;
use super::session::YahooSession;
use crate::error::{DataError, Result};
use crate::fundamentals::{BalanceSheet, CompanyInfo, IncomeStatement, NewsArticle};
use crate::gateway::normalize_symbol;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;

const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";
const SUMMARY_MODULES: &str = "assetProfile,summaryDetail,financialData,defaultKeyStatistics,\
incomeStatementHistory,incomeStatementHistoryQuarterly,balanceSheetHistory";

/// Company info and statements parsed from one `quoteSummary` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteSummary {
    /// Description and key ratios
    pub info: CompanyInfo,
    /// Annual income statements, most recent first
    pub financials: Vec<IncomeStatement>,
    /// Quarterly income statements, most recent first
    pub quarterly_financials: Vec<IncomeStatement>,
    /// Annual balance sheets, most recent first
    pub balance_sheet: Vec<BalanceSheet>,
}

/// Yahoo Finance fundamentals provider.
#[derive(Debug)]
pub struct YahooFundamentalsProvider {
    session: YahooSession,
    rate_limit_delay: Duration,
}

impl YahooFundamentalsProvider {
    /// Create a new provider with custom rate limiting.
    pub const fn new(session: YahooSession, rate_limit_delay: Duration) -> Self {
        Self {
            session,
            rate_limit_delay,
        }
    }

    /// Fetch company info and financial statements for a single symbol.
    pub async fn fetch_summary(&self, symbol: &str) -> Result<QuoteSummary> {
        let symbol = normalize_symbol(symbol)?;
        let url = format!(
            "{QUOTE_SUMMARY_URL}/{}?modules={SUMMARY_MODULES}",
            urlencoding::encode(&symbol)
        );

        let response: SummaryEnvelope = self.session.get_json("quoteSummary", &url).await?;
        let summary = parse_summary(&symbol, response)?;
        tracing::debug!(
            symbol = %symbol,
            annual = summary.financials.len(),
            quarterly = summary.quarterly_financials.len(),
            balance_sheets = summary.balance_sheet.len(),
            "fetched quote summary"
        );

        // Apply rate limiting
        sleep(self.rate_limit_delay).await;

        Ok(summary)
    }

    /// Fetch up to `count` recent headlines for a symbol.
    pub async fn fetch_news(&self, symbol: &str, count: usize) -> Result<Vec<NewsArticle>> {
        let symbol = normalize_symbol(symbol)?;
        let url = format!(
            "{SEARCH_URL}?q={}&quotesCount=0&newsCount={count}",
            urlencoding::encode(&symbol)
        );

        let response: SearchEnvelope = self.session.get_public_json("search", &url).await?;
        let news: Vec<NewsArticle> = response
            .news
            .into_iter()
            .take(count)
            .map(|item| NewsArticle {
                title: item.title,
                link: item.link,
                publisher: item.publisher,
            })
            .collect();

        sleep(self.rate_limit_delay).await;

        Ok(news)
    }
}

/// Turn a decoded `quoteSummary` envelope into statements and ratios.
fn parse_summary(symbol: &str, envelope: SummaryEnvelope) -> Result<QuoteSummary> {
    if let Some(error) = envelope.quote_summary.error {
        return Err(DataError::MissingData {
            symbol: symbol.to_string(),
            reason: error.description.unwrap_or_else(|| "quoteSummary error".to_string()),
        });
    }

    let result = envelope
        .quote_summary
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| DataError::MissingData {
            symbol: symbol.to_string(),
            reason: "Empty quoteSummary result".to_string(),
        })?;

    let detail = result.summary_detail.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();

    let info = CompanyInfo {
        long_business_summary: result.asset_profile.and_then(|p| p.long_business_summary),
        market_cap: raw(&detail.market_cap),
        forward_pe: raw(&detail.forward_pe).or_else(|| raw(&stats.forward_pe)),
        dividend_yield: raw(&detail.dividend_yield),
        fifty_two_week_high: raw(&detail.fifty_two_week_high),
        profit_margins: raw(&financial.profit_margins).or_else(|| raw(&stats.profit_margins)),
        return_on_assets: raw(&financial.return_on_assets),
        return_on_equity: raw(&financial.return_on_equity),
        price_to_book: raw(&stats.price_to_book),
        debt_to_equity: raw(&financial.debt_to_equity),
        current_ratio: raw(&financial.current_ratio),
    };

    let financials = result
        .income_statement_history
        .map(|h| h.income_statement_history)
        .unwrap_or_default()
        .into_iter()
        .map(RawIncomeStatement::into_statement)
        .collect::<Result<Vec<_>>>()?;

    let quarterly_financials = result
        .income_statement_history_quarterly
        .map(|h| h.income_statement_history)
        .unwrap_or_default()
        .into_iter()
        .map(RawIncomeStatement::into_statement)
        .collect::<Result<Vec<_>>>()?;

    let balance_sheet = result
        .balance_sheet_history
        .map(|h| h.balance_sheet_statements)
        .unwrap_or_default()
        .into_iter()
        .map(RawBalanceSheet::into_sheet)
        .collect::<Result<Vec<_>>>()?;

    Ok(QuoteSummary {
        info,
        financials,
        quarterly_financials,
        balance_sheet,
    })
}

/// Parse a raw `quoteSummary` JSON body.
pub fn parse_summary_json(symbol: &str, body: &str) -> Result<QuoteSummary> {
    parse_summary(symbol, serde_json::from_str(body)?)
}

fn raw(value: &Option<RawValue>) -> Option<f64> {
    value
        .as_ref()
        .and_then(|v| v.raw)
        .filter(|v| v.is_finite())
}

fn raw_date(value: &Option<RawValue>) -> Result<Option<chrono::NaiveDate>> {
    raw(value)
        .map(|ts| timestamp_to_date(ts as i64))
        .transpose()
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryData,
}

#[derive(Debug, Deserialize)]
struct SummaryData {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    #[serde(default)]
    asset_profile: Option<AssetProfile>,
    #[serde(default)]
    summary_detail: Option<SummaryDetail>,
    #[serde(default)]
    financial_data: Option<FinancialData>,
    #[serde(default)]
    default_key_statistics: Option<KeyStatistics>,
    #[serde(default)]
    income_statement_history: Option<IncomeStatementHistory>,
    #[serde(default)]
    income_statement_history_quarterly: Option<IncomeStatementHistory>,
    #[serde(default)]
    balance_sheet_history: Option<BalanceSheetHistory>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetProfile {
    #[serde(default)]
    long_business_summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(default)]
    market_cap: Option<RawValue>,
    #[serde(default, rename = "forwardPE")]
    forward_pe: Option<RawValue>,
    #[serde(default)]
    dividend_yield: Option<RawValue>,
    #[serde(default)]
    fifty_two_week_high: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    #[serde(default)]
    profit_margins: Option<RawValue>,
    #[serde(default)]
    return_on_assets: Option<RawValue>,
    #[serde(default)]
    return_on_equity: Option<RawValue>,
    #[serde(default)]
    debt_to_equity: Option<RawValue>,
    #[serde(default)]
    current_ratio: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    #[serde(default, rename = "forwardPE")]
    forward_pe: Option<RawValue>,
    #[serde(default)]
    price_to_book: Option<RawValue>,
    #[serde(default)]
    profit_margins: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatementHistory {
    #[serde(default)]
    income_statement_history: Vec<RawIncomeStatement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSheetHistory {
    #[serde(default)]
    balance_sheet_statements: Vec<RawBalanceSheet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIncomeStatement {
    #[serde(default)]
    end_date: Option<RawValue>,
    #[serde(default)]
    total_revenue: Option<RawValue>,
    #[serde(default)]
    cost_of_revenue: Option<RawValue>,
    #[serde(default)]
    gross_profit: Option<RawValue>,
    #[serde(default)]
    operating_income: Option<RawValue>,
    #[serde(default)]
    net_income: Option<RawValue>,
}

impl RawIncomeStatement {
    fn into_statement(self) -> Result<IncomeStatement> {
        Ok(IncomeStatement {
            end_date: raw_date(&self.end_date)?,
            total_revenue: raw(&self.total_revenue),
            cost_of_revenue: raw(&self.cost_of_revenue),
            gross_profit: raw(&self.gross_profit),
            operating_income: raw(&self.operating_income),
            net_income: raw(&self.net_income),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBalanceSheet {
    #[serde(default)]
    end_date: Option<RawValue>,
    #[serde(default)]
    total_assets: Option<RawValue>,
    #[serde(default)]
    total_liab: Option<RawValue>,
    #[serde(default)]
    total_stockholder_equity: Option<RawValue>,
    #[serde(default)]
    cash: Option<RawValue>,
    #[serde(default)]
    long_term_debt: Option<RawValue>,
}

impl RawBalanceSheet {
    fn into_sheet(self) -> Result<BalanceSheet> {
        Ok(BalanceSheet {
            end_date: raw_date(&self.end_date)?,
            total_assets: raw(&self.total_assets),
            total_liabilities: raw(&self.total_liab),
            total_stockholder_equity: raw(&self.total_stockholder_equity),
            cash: raw(&self.cash),
            long_term_debt: raw(&self.long_term_debt),
        })
    }
}

/// Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}`.
#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    news: Vec<SearchNewsItem>,
}

#[derive(Debug, Deserialize)]
struct SearchNewsItem {
    title: String,
    link: String,
    #[serde(default)]
    publisher: Option<String>,
}
