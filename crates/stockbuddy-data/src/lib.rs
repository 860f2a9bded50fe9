#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockbuddy/stockbuddy/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod fundamentals;
pub mod gateway;
pub mod period;
pub mod retry;
pub mod series;
pub mod yahoo;

pub use error::{DataError, Result};
pub use fundamentals::{BalanceSheet, CompanyInfo, Dividend, Fundamentals, IncomeStatement, NewsArticle};
pub use gateway::{InMemoryGateway, MarketDataGateway, normalize_symbol};
pub use period::Period;
pub use retry::RetryPolicy;
pub use series::{PriceBar, PriceField, PriceSeries};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
