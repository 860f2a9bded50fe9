//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Yahoo Finance API error
    #[error("Yahoo Finance API error: {0}")]
    YahooApi(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP error status returned by an endpoint
    #[error("HTTP {status} from {endpoint}")]
    Http {
        /// Status code of the response
        status: u16,
        /// Endpoint that was queried
        endpoint: String,
    },

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Missing data
    #[error("Missing data for {symbol}: {reason}")]
    MissingData {
        /// Symbol that was queried
        symbol: String,
        /// Reason for missing data
        reason: String,
    },

    /// Price bars out of order
    #[error("Price series for {symbol} is not strictly increasing at index {index}")]
    UnorderedSeries {
        /// Symbol of the series
        symbol: String,
        /// Index of the first offending bar
        index: usize,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Time conversion error
    #[error("Time conversion error: {0}")]
    TimeConversion(String),

    /// Rate limit error
    #[error("Rate limit exceeded, please retry after {retry_after_ms}ms")]
    RateLimit {
        /// Milliseconds to wait before retrying
        retry_after_ms: u64,
    },

    /// Invalid symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Unknown period token
    #[error("Invalid period '{0}': expected one of 1mo, 3mo, 6mo, 1y, 5y, max")]
    InvalidPeriod(String),

    /// Unknown price field
    #[error("Invalid price field '{0}': expected one of Close, Open, High, Low, Volume")]
    InvalidField(String),
}

impl DataError {
    /// Whether the failure is worth retrying.
    ///
    /// Network failures, rate limiting and server-side HTTP errors are
    /// transient. Bad symbols, missing data and parse failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(err) => !err.is_decode() && !err.is_builder(),
            Self::Http { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            Self::RateLimit { .. } => true,
            _ => false,
        }
    }
}

/// Backoff hint for Yahoo rate limiting, which carries no `Retry-After`.
const YAHOO_RATE_LIMIT_BACKOFF_MS: u64 = 1_000;

impl From<yahoo_finance_api::YahooError> for DataError {
    fn from(err: yahoo_finance_api::YahooError) -> Self {
        use yahoo_finance_api::YahooError;

        match err {
            YahooError::ConnectionFailed(e) => Self::Network(e),
            YahooError::TooManyRequests(_) => Self::RateLimit {
                retry_after_ms: YAHOO_RATE_LIMIT_BACKOFF_MS,
            },
            YahooError::NoResponse => Self::Http {
                status: 503,
                endpoint: "chart".to_string(),
            },
            YahooError::FetchFailed(message) => match http_status(&message) {
                Some(status) => Self::Http {
                    status,
                    endpoint: "chart".to_string(),
                },
                None => Self::YahooApi(message),
            },
            YahooError::DeserializeFailed(e) => Self::Serialization(e),
            other => Self::YahooApi(other.to_string()),
        }
    }
}

/// Status code from a `"HTTP error: 503 Service Unavailable"` message.
fn http_status(message: &str) -> Option<u16> {
    message
        .strip_prefix("HTTP error: ")?
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}
