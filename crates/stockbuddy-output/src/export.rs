//! Export of series and analysis results.
//!
//! Every exportable type writes CSV with one row per observation and JSON as
//! its serde form. The Monte Carlo ensemble is wide in CSV: one row per day,
//! one column per path.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use stockbuddy::analytics::{MovingAverageFrame, NormalizedSpread, PricePaths, RegressionResult};
use stockbuddy::data::PriceSeries;
use stockbuddy::{DashboardReport, HistoricalView};
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer produced invalid UTF-8.
    #[error("Invalid UTF-8 in output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Pick a format from a file extension; `.json` exports pretty JSON.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(format!(
                "cannot infer export format from extension '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::PrettyJson => "pretty-json",
        })
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn csv_records<R: Serialize>(records: impl IntoIterator<Item = R>) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn json<T: Serialize + ?Sized>(value: &T, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

impl Exporter for PriceSeries {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_records(self.bars()),
            _ => json(self, format),
        }
    }
}

/// Date and one price column.
#[derive(Serialize)]
struct ValueRow {
    date: NaiveDate,
    value: f64,
}

impl Exporter for HistoricalView {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(["date", self.field.as_str()])?;
                for (date, value) in self.dates.iter().zip(&self.values) {
                    wtr.write_record([date.to_string(), value.to_string()])?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                Ok(String::from_utf8(bytes)?)
            }
            _ => {
                let rows: Vec<ValueRow> = self
                    .dates
                    .iter()
                    .zip(&self.values)
                    .map(|(&date, &value)| ValueRow { date, value })
                    .collect();
                json(&rows, format)
            }
        }
    }
}

#[derive(Serialize)]
struct MovingAverageRow {
    date: NaiveDate,
    close: f64,
    short_ma: f64,
    long_ma: f64,
}

impl Exporter for MovingAverageFrame {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_records((0..self.len()).map(|i| MovingAverageRow {
                date: self.dates[i],
                close: self.close[i],
                short_ma: self.short[i],
                long_ma: self.long[i],
            })),
            _ => json(self, format),
        }
    }
}

#[derive(Serialize)]
struct SpreadRow {
    date: NaiveDate,
    raw_spread: f64,
    z_score: f64,
}

impl Exporter for NormalizedSpread {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_records((0..self.len()).map(|i| SpreadRow {
                date: self.dates[i],
                raw_spread: self.raw[i],
                z_score: self.values[i],
            })),
            _ => json(self, format),
        }
    }
}

#[derive(Serialize)]
struct RegressionRow {
    date: NaiveDate,
    day_offset: f64,
    actual: f64,
    predicted: f64,
}

impl Exporter for RegressionResult {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => csv_records((0..self.len()).map(|i| RegressionRow {
                date: self.dates[i],
                day_offset: self.day_offsets[i],
                actual: self.actual[i],
                predicted: self.predicted[i],
            })),
            _ => json(self, format),
        }
    }
}

impl Exporter for PricePaths {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let mut header = vec!["day".to_string()];
                header.extend((0..self.simulations()).map(|j| format!("sim_{j}")));
                wtr.write_record(&header)?;
                for (t, row) in self.paths().rows().into_iter().enumerate() {
                    let mut record = vec![t.to_string()];
                    record.extend(row.iter().map(|p| p.to_string()));
                    wtr.write_record(&record)?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                Ok(String::from_utf8(bytes)?)
            }
            _ => json(self, format),
        }
    }
}

impl Exporter for DashboardReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => Err(ExportError::InvalidFormat(
                "a full dashboard report has no tabular form; export it as JSON".to_string(),
            )),
            _ => json(self, format),
        }
    }
}
