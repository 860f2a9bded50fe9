#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockbuddy/stockbuddy/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod format;
pub mod render;
pub mod report;

pub use export::{ExportError, ExportFormat, Exporter};
pub use format::{format_currency, format_metric, format_number, format_percent};
pub use render::{Render, render_warnings};
pub use report::{Report, ReportBuilder, ReportError};

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
