//! Error types for analytics.

use stockbuddy_data::DataError;
use thiserror::Error;

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Errors raised by analytics routines.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The gateway failed while fetching input data
    #[error("{operation} failed for {symbol}: {source}")]
    Upstream {
        /// Analytics operation that requested the data
        operation: &'static str,
        /// Ticker that was being fetched
        symbol: String,
        /// Underlying gateway error
        #[source]
        source: DataError,
    },

    /// A parameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Too few samples to compute the result
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Input is present but cannot produce a finite result
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// Two series do not share the same calendar
    #[error(
        "Misaligned series: {left} has {left_len} observations, {right} has {right_len}{}",
        first_mismatch.map(|i| format!(", dates differ at index {i}")).unwrap_or_default()
    )]
    MisalignedSeries {
        /// First ticker
        left: String,
        /// Second ticker
        right: String,
        /// Observations in the first series
        left_len: usize,
        /// Observations in the second series
        right_len: usize,
        /// First index where dates disagree, if lengths match
        first_mismatch: Option<usize>,
    },

    /// Local data conversion failed
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl AnalyticsError {
    /// Attach operation and symbol context to a gateway failure.
    pub fn upstream(operation: &'static str, symbol: &str) -> impl FnOnce(DataError) -> Self {
        let symbol = symbol.to_string();
        move |source| Self::Upstream {
            operation,
            symbol,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_misaligned_message() {
        let err = AnalyticsError::MisalignedSeries {
            left: "AAPL".to_string(),
            right: "MSFT".to_string(),
            left_len: 250,
            right_len: 249,
            first_mismatch: None,
        };
        assert_eq!(
            err.to_string(),
            "Misaligned series: AAPL has 250 observations, MSFT has 249"
        );

        let err = AnalyticsError::MisalignedSeries {
            left: "AAPL".to_string(),
            right: "MSFT".to_string(),
            left_len: 3,
            right_len: 3,
            first_mismatch: Some(1),
        };
        assert!(err.to_string().ends_with("dates differ at index 1"));
    }

    #[test]
    fn test_upstream_context() {
        let err = AnalyticsError::upstream("moving averages", "AAPL")(DataError::InvalidSymbol(
            "AAPL".to_string(),
        ));
        assert!(err.to_string().starts_with("moving averages failed for AAPL"));
    }
}
