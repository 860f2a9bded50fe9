#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockbuddy/stockbuddy/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod error;
pub mod monte_carlo;
pub mod moving_average;
pub mod regression;
pub mod returns;
pub mod spread;
pub mod stats;

pub use analysis::{
    ANALYSIS_PERIOD, PAIR_PERIOD, fetch_pair_data, fetch_stock_data, pair_spread,
    ticker_monte_carlo, ticker_moving_averages, trend_regression,
};
pub use error::{AnalyticsError, Result};
pub use monte_carlo::{FinalPriceBands, PricePaths, SimulationConfig, simulate_paths};
pub use moving_average::{MovingAverageConfig, MovingAverageFrame, moving_averages};
pub use regression::{LinearFit, RegressionResult, SplitConfig, fit_trend, train_test_split};
pub use returns::{DriftEstimate, log_returns};
pub use spread::{AlignedPair, NormalizedSpread, SpreadAlignment, align_pair, normalized_spread};
pub use stats::Summary;

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
