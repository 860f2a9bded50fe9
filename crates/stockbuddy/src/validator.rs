//! Advisory completeness checks on fundamentals.
//!
//! Checks run in a fixed order (dividends, income statements, balance sheet)
//! and each gap yields one human-readable message. An empty list means every
//! check passed. Messages never block a view.

use stockbuddy_data::{Fundamentals, MarketDataGateway, normalize_symbol};

/// Messages for every missing fundamentals section, in check order.
pub fn validate_fundamentals(fundamentals: &Fundamentals) -> Vec<String> {
    let ticker = &fundamentals.symbol;
    let checks = [
        (fundamentals.dividends.is_empty(), "dividend"),
        (fundamentals.financials.is_empty(), "financial"),
        (fundamentals.balance_sheet.is_empty(), "balance sheet"),
    ];

    checks
        .into_iter()
        .filter(|(missing, _)| *missing)
        .map(|(_, section)| format!("No {section} data available for {ticker}."))
        .collect()
}

/// Fetch fundamentals for `symbol` and validate them.
pub async fn validate_stock_data<G: MarketDataGateway>(
    gateway: &G,
    symbol: &str,
) -> stockbuddy_data::Result<Vec<String>> {
    let symbol = normalize_symbol(symbol)?;
    let mut fundamentals = gateway.fundamentals(&symbol).await?;
    fundamentals.symbol = symbol;

    let messages = validate_fundamentals(&fundamentals);
    tracing::debug!(symbol = %fundamentals.symbol, gaps = messages.len(), "validated fundamentals");
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stockbuddy_data::{BalanceSheet, DataError, Dividend, InMemoryGateway, IncomeStatement};

    fn complete(symbol: &str) -> Fundamentals {
        Fundamentals {
            dividends: vec![Dividend {
                date: NaiveDate::from_ymd_opt(2024, 2, 9).unwrap(),
                amount: 0.24,
            }],
            financials: vec![IncomeStatement {
                total_revenue: Some(383_285_000_000.0),
                ..IncomeStatement::default()
            }],
            balance_sheet: vec![BalanceSheet {
                total_assets: Some(352_583_000_000.0),
                ..BalanceSheet::default()
            }],
            ..Fundamentals::empty(symbol)
        }
    }

    #[test]
    fn test_complete_fundamentals_pass() {
        assert!(validate_fundamentals(&complete("AAPL")).is_empty());
    }

    #[test]
    fn test_all_missing_in_order() {
        let messages = validate_fundamentals(&Fundamentals::empty("XYZ"));
        assert_eq!(
            messages,
            vec![
                "No dividend data available for XYZ.",
                "No financial data available for XYZ.",
                "No balance sheet data available for XYZ.",
            ]
        );
    }

    #[test]
    fn test_only_dividends_missing() {
        let fundamentals = Fundamentals {
            dividends: Vec::new(),
            ..complete("TSLA")
        };
        assert_eq!(
            validate_fundamentals(&fundamentals),
            vec!["No dividend data available for TSLA."]
        );
    }

    #[tokio::test]
    async fn test_fetching_wrapper_uppercases() {
        let gateway = InMemoryGateway::new().with_fundamentals(Fundamentals {
            dividends: Vec::new(),
            ..complete("AMZN")
        });
        let messages = validate_stock_data(&gateway, " amzn ").await.unwrap();
        assert_eq!(messages, vec!["No dividend data available for AMZN."]);
        assert_eq!(gateway.fundamentals_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetching_wrapper_propagates_gateway_errors() {
        let gateway = InMemoryGateway::new();
        let err = validate_stock_data(&gateway, "NOPE").await.unwrap_err();
        assert!(matches!(err, DataError::MissingData { .. }));
    }
}
