//! Error types for the dashboard.

use stockbuddy_analytics::AnalyticsError;
use stockbuddy_data::DataError;
use thiserror::Error;

/// Result type for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Errors raised while building dashboard views.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Gateway error
    #[error(transparent)]
    Data(#[from] DataError),

    /// Analytics error
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// Dashboard settings are out of range
    #[error("Invalid dashboard configuration: {0}")]
    InvalidConfig(String),
}
