//! JSON report envelope for machine-readable output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Required field was not set on the builder.
    #[error("Missing report field: {0}")]
    MissingField(&'static str),
}

/// A view wrapped with what produced it and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Symbol being analyzed.
    pub symbol: String,

    /// View name, e.g. `overview` or `analytics`.
    pub view: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Crate version that produced the report.
    pub version: String,

    /// View contents.
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report stamped with the current time.
    pub fn new(symbol: String, view: String, contents: serde_json::Value) -> Self {
        Self {
            symbol,
            view,
            timestamp: Utc::now(),
            version: crate::VERSION.to_string(),
            contents,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the pretty JSON form to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    symbol: Option<String>,
    view: Option<String>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the symbol.
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Set the view name.
    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    /// Serialize `value` as the report contents.
    pub fn contents<T: Serialize>(mut self, value: &T) -> Result<Self, ReportError> {
        self.contents = Some(serde_json::to_value(value)?);
        Ok(self)
    }

    /// Build the report.
    pub fn build(self) -> Result<Report, ReportError> {
        Ok(Report::new(
            self.symbol.ok_or(ReportError::MissingField("symbol"))?,
            self.view.ok_or(ReportError::MissingField("view"))?,
            self.contents.unwrap_or(serde_json::Value::Null),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_creation() {
        let report = Report::new(
            "AAPL".to_string(),
            "overview".to_string(),
            serde_json::json!({"test": "data"}),
        );

        assert_eq!(report.symbol, "AAPL");
        assert_eq!(report.view, "overview");
        assert_eq!(report.version, crate::VERSION);
    }

    #[test]
    fn test_report_builder() {
        let report = ReportBuilder::new()
            .symbol("MSFT")
            .view("validate")
            .contents(&vec!["No dividend data available for MSFT."])
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(report.symbol, "MSFT");
        assert_eq!(report.contents[0], "No dividend data available for MSFT.");
        let json = report.to_json().unwrap();
        assert!(json.contains("\"view\": \"validate\""));
    }

    #[test]
    fn test_builder_requires_symbol() {
        assert!(matches!(
            ReportBuilder::new().view("overview").build(),
            Err(ReportError::MissingField("symbol"))
        ));
    }
}
