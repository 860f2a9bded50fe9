#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockbuddy/stockbuddy/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dashboard;
pub mod error;
pub mod validator;
pub mod views;

// Re-export main types from sub-crates
pub use stockbuddy_analytics as analytics;
pub use stockbuddy_data as data;

pub use dashboard::{Dashboard, DashboardConfig, MAX_HORIZON_DAYS, MIN_HORIZON_DAYS};
pub use error::{DashboardError, Result};
pub use validator::{validate_fundamentals, validate_stock_data};
pub use views::{
    AnalyticsView, ArbitrageView, DashboardReport, FinancialsView, HistoricalView, Metric,
    MetricValue, OverviewView, Section, TrendPoint,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
