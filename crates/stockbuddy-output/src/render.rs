//! Text rendering of dashboard views.
//!
//! Every view renders as an 80-column ASCII block for the terminal and as
//! Markdown for files. A failed section renders its error in place of the
//! content.

use crate::format::{
    NOT_AVAILABLE, format_metric, format_number, format_optional_currency, format_percent,
};
use stockbuddy::analytics::stats::quantile;
use stockbuddy::analytics::{MovingAverageFrame, PricePaths, RegressionResult};
use stockbuddy::data::IncomeStatement;
use stockbuddy::{
    AnalyticsView, ArbitrageView, DashboardReport, FinancialsView, HistoricalView, Metric,
    OverviewView, Section,
};

/// Rows shown from the end of long series.
const TAIL_ROWS: usize = 10;

/// Number of horizon checkpoints in the forecast table.
const FORECAST_CHECKPOINTS: usize = 6;

/// Text renderings of a view.
pub trait Render {
    /// Fixed-width terminal output.
    fn to_ascii_table(&self) -> String;

    /// Markdown output.
    fn to_markdown(&self) -> String;
}

fn heading(output: &mut String, title: &str) {
    output.push_str(&format!("\n{title}\n"));
    output.push_str(&"=".repeat(80));
    output.push('\n');
}

fn subheading(output: &mut String, title: &str) {
    output.push_str(&format!("\n{title}:\n"));
    output.push_str(&"-".repeat(80));
    output.push('\n');
}

fn metric_lines(output: &mut String, metrics: &[Metric]) {
    for metric in metrics {
        output.push_str(&format!(
            "  {:<28} {:>20}\n",
            format!("{}:", metric.label),
            format_metric(&metric.value)
        ));
    }
}

fn tail_start(len: usize) -> usize {
    len.saturating_sub(TAIL_ROWS)
}

impl<T: Render> Render for Section<T> {
    fn to_ascii_table(&self) -> String {
        match self {
            Self::Ready { data } => data.to_ascii_table(),
            Self::Failed { error } => format!("\n  Unavailable: {error}\n"),
        }
    }

    fn to_markdown(&self) -> String {
        match self {
            Self::Ready { data } => data.to_markdown(),
            Self::Failed { error } => format!("> **Unavailable:** {error}\n\n"),
        }
    }
}

impl Render for OverviewView {
    fn to_ascii_table(&self) -> String {
        let mut output = String::new();
        heading(&mut output, &format!("Company Overview: {}", self.symbol));

        subheading(&mut output, "Company Description");
        output.push_str(&format!(
            "{}\n",
            self.description.as_deref().unwrap_or(NOT_AVAILABLE)
        ));

        subheading(&mut output, "Key Metrics");
        metric_lines(&mut output, &self.metrics);

        subheading(&mut output, "Recent News");
        if self.news.is_empty() {
            output.push_str("  No recent news.\n");
        }
        for article in &self.news {
            output.push_str(&format!("  * {}\n    {}\n", article.title, article.link));
        }
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = format!("# Company Overview: {}\n\n", self.symbol);
        output.push_str("## Company Description\n\n");
        output.push_str(self.description.as_deref().unwrap_or(NOT_AVAILABLE));
        output.push_str("\n\n");

        output.push_str("| Metric | Value |\n|--------|-------|\n");
        for metric in &self.metrics {
            output.push_str(&format!(
                "| {} | {} |\n",
                metric.label,
                format_metric(&metric.value)
            ));
        }

        output.push_str("\n## Recent News\n\n");
        for article in &self.news {
            output.push_str(&format!("- [{}]({})\n", article.title, article.link));
        }
        output.push('\n');
        output
    }
}

fn statement_table(output: &mut String, statements: &[IncomeStatement]) {
    if statements.is_empty() {
        output.push_str("  No statements reported.\n");
        return;
    }
    output.push_str(&format!(
        "{:<12} {:>19} {:>19} {:>19} {:>19}\n",
        "Period End", "Total Revenue", "Gross Profit", "Operating Income", "Net Income"
    ));
    for s in statements {
        output.push_str(&format!(
            "{:<12} {:>19} {:>19} {:>19} {:>19}\n",
            s.end_date
                .map_or_else(|| NOT_AVAILABLE.to_string(), |d| d.to_string()),
            format_optional_currency(s.total_revenue),
            format_optional_currency(s.gross_profit),
            format_optional_currency(s.operating_income),
            format_optional_currency(s.net_income),
        ));
    }
}

fn statement_markdown(output: &mut String, statements: &[IncomeStatement]) {
    output.push_str("| Period End | Total Revenue | Gross Profit | Operating Income | Net Income |\n");
    output.push_str("|------------|---------------|--------------|------------------|------------|\n");
    for s in statements {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            s.end_date
                .map_or_else(|| NOT_AVAILABLE.to_string(), |d| d.to_string()),
            format_optional_currency(s.total_revenue),
            format_optional_currency(s.gross_profit),
            format_optional_currency(s.operating_income),
            format_optional_currency(s.net_income),
        ));
    }
    output.push('\n');
}

impl Render for FinancialsView {
    fn to_ascii_table(&self) -> String {
        let mut output = String::new();
        heading(&mut output, &format!("Financials: {}", self.symbol));

        subheading(&mut output, "Key Financial Ratios and Metrics");
        let (left, right) = self.ratio_columns();
        for i in 0..left.len().max(right.len()) {
            let cell = |m: Option<&Metric>| {
                m.map_or_else(String::new, |m| {
                    format!("{:<26} {:>10}", m.label, format_metric(&m.value))
                })
            };
            let line = format!("  {:<38}  {}", cell(left.get(i)), cell(right.get(i)));
            output.push_str(line.trim_end());
            output.push('\n');
        }

        subheading(&mut output, "Annual Financials");
        statement_table(&mut output, &self.annual);

        subheading(&mut output, "Quarterly Financials");
        statement_table(&mut output, &self.quarterly);

        subheading(&mut output, "Financial Health and Trend Analysis");
        output.push_str(&format!(
            "{:<12} {:>22} {:>22}\n",
            "Period End", "Revenue", "Net Income"
        ));
        for point in &self.trend {
            output.push_str(&format!(
                "{:<12} {:>22} {:>22}\n",
                point
                    .end_date
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |d| d.to_string()),
                format_optional_currency(point.revenue),
                format_optional_currency(point.net_income),
            ));
        }
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = format!("# Financials: {}\n\n", self.symbol);
        output.push_str("## Key Financial Ratios and Metrics\n\n");
        output.push_str("| Ratio | Value |\n|-------|-------|\n");
        for metric in &self.ratios {
            output.push_str(&format!(
                "| {} | {} |\n",
                metric.label,
                format_metric(&metric.value)
            ));
        }
        output.push_str("\n## Annual Financials\n\n");
        statement_markdown(&mut output, &self.annual);
        output.push_str("## Quarterly Financials\n\n");
        statement_markdown(&mut output, &self.quarterly);
        output
    }
}

impl Render for HistoricalView {
    fn to_ascii_table(&self) -> String {
        let mut output = String::new();
        heading(
            &mut output,
            &format!("Historical Data: {} ({}, {})", self.symbol, self.field, self.period),
        );

        let (Some(first), Some(last)) = (self.values.first(), self.values.last()) else {
            output.push_str("  No observations in this period.\n");
            return output;
        };
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        output.push_str(&format!("  Observations:   {:>12}\n", self.values.len()));
        output.push_str(&format!("  First:          {:>12}\n", format_number(*first)));
        output.push_str(&format!("  Last:           {:>12}\n", format_number(*last)));
        output.push_str(&format!("  Low:            {:>12}\n", format_number(min)));
        output.push_str(&format!("  High:           {:>12}\n", format_number(max)));
        if *first != 0.0 {
            output.push_str(&format!(
                "  Change:         {:>12}\n",
                format_percent(last / first - 1.0)
            ));
        }

        let start = if self.show_table {
            0
        } else {
            tail_start(self.values.len())
        };
        subheading(
            &mut output,
            if self.show_table {
                "Data Table"
            } else {
                "Most Recent"
            },
        );
        output.push_str(&format!("{:<12} {:>16}\n", "Date", self.field.as_str()));
        for (date, value) in self.dates[start..].iter().zip(&self.values[start..]) {
            output.push_str(&format!("{:<12} {:>16}\n", date, format_number(*value)));
        }
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = format!(
            "# Historical Data: {}\n\n**Column:** {} | **Period:** {}\n\n",
            self.symbol, self.field, self.period
        );
        let start = if self.show_table {
            0
        } else {
            tail_start(self.values.len())
        };
        output.push_str(&format!("| Date | {} |\n|------|------|\n", self.field));
        for (date, value) in self.dates[start..].iter().zip(&self.values[start..]) {
            output.push_str(&format!("| {} | {} |\n", date, format_number(*value)));
        }
        output.push('\n');
        output
    }
}

fn regression_ascii(output: &mut String, result: &RegressionResult) {
    output.push_str(&format!("  Slope (per day):    {:>14.4}\n", result.fit.slope));
    output.push_str(&format!("  Intercept:          {:>14.2}\n", result.fit.intercept));
    output.push_str(&format!("  Training samples:   {:>14}\n", result.train_len));
    output.push_str(&format!("  Held-out samples:   {:>14}\n", result.len()));
    output.push_str(&format!("  RMSE:               {:>14.4}\n", result.rmse()));
    output.push_str(&format!("  R²:                 {:>14.4}\n", result.r_squared()));

    let mut rows: Vec<usize> = (0..result.len()).collect();
    rows.sort_by_key(|&i| result.dates[i]);
    output.push_str(&format!(
        "\n{:<12} {:>12} {:>12} {:>12}\n",
        "Date", "Actual", "Predicted", "Error"
    ));
    for &i in &rows[tail_start(rows.len())..] {
        output.push_str(&format!(
            "{:<12} {:>12.2} {:>12.2} {:>12.2}\n",
            result.dates[i],
            result.actual[i],
            result.predicted[i],
            result.actual[i] - result.predicted[i]
        ));
    }
}

fn moving_average_ascii(output: &mut String, frame: &MovingAverageFrame) {
    output.push_str(&format!(
        "{:<12} {:>12} {:>12} {:>12}\n",
        "Date",
        "Close",
        format!("MA{}", frame.config.short_window),
        format!("MA{}", frame.config.long_window)
    ));
    for i in tail_start(frame.len())..frame.len() {
        output.push_str(&format!(
            "{:<12} {:>12.2} {:>12.2} {:>12.2}\n",
            frame.dates[i], frame.close[i], frame.short[i], frame.long[i]
        ));
    }
    if let Some((_, _, short, long)) = frame.last() {
        let trend = if short > long {
            "above"
        } else if short < long {
            "below"
        } else {
            "level with"
        };
        output.push_str(&format!(
            "\n  Short average is {trend} the long average.\n"
        ));
    }
}

/// Days shown in the forecast table: evenly spaced, always including the last.
fn checkpoints(days: usize) -> Vec<usize> {
    if days <= FORECAST_CHECKPOINTS {
        return (0..days).collect();
    }
    let step = (days - 1) as f64 / (FORECAST_CHECKPOINTS - 1) as f64;
    let mut out: Vec<usize> = (0..FORECAST_CHECKPOINTS)
        .map(|k| (k as f64 * step).round() as usize)
        .collect();
    out.dedup();
    out
}

fn forecast_rows(paths: &PricePaths) -> Vec<(usize, f64, f64, f64, f64)> {
    let mean = paths.mean_path();
    checkpoints(paths.days())
        .into_iter()
        .map(|t| {
            let row = paths.paths().row(t).to_vec();
            (
                t,
                mean[t],
                quantile(&row, 0.05),
                quantile(&row, 0.5),
                quantile(&row, 0.95),
            )
        })
        .collect()
}

fn monte_carlo_ascii(output: &mut String, paths: &PricePaths) {
    let estimate = paths.estimate();
    output.push_str(&format!("  Last close:         {:>14.2}\n", paths.seed_price()));
    output.push_str(&format!("  Daily drift:        {:>14.6}\n", estimate.drift));
    output.push_str(&format!("  Daily volatility:   {:>14.6}\n", estimate.stdev));
    output.push_str(&format!(
        "  Paths:              {:>14}\n  Horizon (days):     {:>14}\n",
        paths.simulations(),
        paths.days()
    ));

    output.push_str(&format!(
        "\n{:<8} {:>12} {:>12} {:>12} {:>12}\n",
        "Day", "Mean", "5%", "Median", "95%"
    ));
    for (t, mean, p5, p50, p95) in forecast_rows(paths) {
        output.push_str(&format!(
            "{:<8} {:>12.2} {:>12.2} {:>12.2} {:>12.2}\n",
            t, mean, p5, p50, p95
        ));
    }
}

impl Render for AnalyticsView {
    fn to_ascii_table(&self) -> String {
        let mut output = String::new();
        heading(&mut output, &format!("Advanced Analytics: {}", self.symbol));

        subheading(&mut output, "Predictive Analysis using Linear Regression");
        match &self.regression {
            Section::Ready { data } => regression_ascii(&mut output, data),
            Section::Failed { error } => output.push_str(&format!("  Unavailable: {error}\n")),
        }

        subheading(&mut output, "Moving Averages");
        match &self.moving_averages {
            Section::Ready { data } => moving_average_ascii(&mut output, data),
            Section::Failed { error } => output.push_str(&format!("  Unavailable: {error}\n")),
        }

        subheading(&mut output, "Monte Carlo Price Forecast");
        match &self.monte_carlo {
            Section::Ready { data } => monte_carlo_ascii(&mut output, data),
            Section::Failed { error } => output.push_str(&format!("  Unavailable: {error}\n")),
        }
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = format!("# Advanced Analytics: {}\n\n", self.symbol);

        output.push_str("## Predictive Analysis using Linear Regression\n\n");
        match &self.regression {
            Section::Ready { data } => output.push_str(&format!(
                "- **Slope:** {:.4} per day\n- **Intercept:** {:.2}\n- **Held-out samples:** {}\n- **RMSE:** {:.4}\n- **R²:** {:.4}\n\n",
                data.fit.slope,
                data.fit.intercept,
                data.len(),
                data.rmse(),
                data.r_squared()
            )),
            Section::Failed { error } => output.push_str(&format!("> **Unavailable:** {error}\n\n")),
        }

        output.push_str("## Moving Averages\n\n");
        match &self.moving_averages {
            Section::Ready { data } => {
                output.push_str("| Date | Close | Short | Long |\n|------|-------|-------|------|\n");
                for i in tail_start(data.len())..data.len() {
                    output.push_str(&format!(
                        "| {} | {:.2} | {:.2} | {:.2} |\n",
                        data.dates[i], data.close[i], data.short[i], data.long[i]
                    ));
                }
                output.push('\n');
            }
            Section::Failed { error } => output.push_str(&format!("> **Unavailable:** {error}\n\n")),
        }

        output.push_str("## Monte Carlo Price Forecast\n\n");
        match &self.monte_carlo {
            Section::Ready { data } => {
                output.push_str("| Day | Mean | 5% | Median | 95% |\n|-----|------|----|--------|-----|\n");
                for (t, mean, p5, p50, p95) in forecast_rows(data) {
                    output.push_str(&format!(
                        "| {t} | {mean:.2} | {p5:.2} | {p50:.2} | {p95:.2} |\n"
                    ));
                }
                output.push('\n');
            }
            Section::Failed { error } => output.push_str(&format!("> **Unavailable:** {error}\n\n")),
        }
        output
    }
}

impl Render for ArbitrageView {
    fn to_ascii_table(&self) -> String {
        let spread = &self.spread;
        let mut output = String::new();
        heading(
            &mut output,
            &format!("Statistical Arbitrage: {} vs {}", spread.left, spread.right),
        );
        output.push_str(&format!(
            "  Period: {}   Alignment: {}   Observations: {}\n",
            self.period,
            self.alignment,
            spread.len()
        ));
        output.push_str(&format!(
            "  Raw spread mean: {:.4}   Raw spread std: {:.4}\n",
            spread.raw_mean, spread.raw_std
        ));
        if let Some((date, z)) = spread.latest() {
            output.push_str(&format!("  Latest z-score ({date}): {z:.4}\n"));
        }

        subheading(
            &mut output,
            &format!("Spread Analysis between {} and {}", spread.left, spread.right),
        );
        let s = &self.summary;
        for (label, value) in [
            ("count", s.count as f64),
            ("mean", s.mean),
            ("std", s.std),
            ("min", s.min),
            ("25%", s.q25),
            ("50%", s.median),
            ("75%", s.q75),
            ("max", s.max),
        ] {
            output.push_str(&format!("  {label:<8} {value:>14.6}\n"));
        }
        output
    }

    fn to_markdown(&self) -> String {
        let spread = &self.spread;
        let s = &self.summary;
        let mut output = format!(
            "# Statistical Arbitrage: {} vs {}\n\n**Period:** {} | **Alignment:** {}\n\n",
            spread.left, spread.right, self.period, self.alignment
        );
        output.push_str("| Statistic | Value |\n|-----------|-------|\n");
        output.push_str(&format!("| count | {} |\n", s.count));
        for (label, value) in [
            ("mean", s.mean),
            ("std", s.std),
            ("min", s.min),
            ("25%", s.q25),
            ("50%", s.median),
            ("75%", s.q75),
            ("max", s.max),
        ] {
            output.push_str(&format!("| {label} | {value:.6} |\n"));
        }
        output.push('\n');
        output
    }
}

/// Validation messages as a banner block.
pub fn render_warnings(warnings: &[String]) -> String {
    warnings
        .iter()
        .map(|w| format!("[!] {w}\n"))
        .collect()
}

impl Render for DashboardReport {
    fn to_ascii_table(&self) -> String {
        let mut output = String::new();
        heading(&mut output, &format!("StockBuddy: {}", self.symbol));
        output.push_str(&render_warnings(&self.warnings));
        output.push_str(&self.overview.to_ascii_table());
        output.push_str(&self.financials.to_ascii_table());
        output.push_str(&self.history.to_ascii_table());
        output.push_str(&self.analytics.to_ascii_table());
        output.push_str(&self.arbitrage.to_ascii_table());
        output.push('\n');
        output.push_str(&"=".repeat(80));
        output.push('\n');
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = format!("# StockBuddy: {}\n\n", self.symbol);
        for warning in &self.warnings {
            output.push_str(&format!("> **Warning:** {warning}\n"));
        }
        if !self.warnings.is_empty() {
            output.push('\n');
        }
        output.push_str(&self.overview.to_markdown());
        output.push_str(&self.financials.to_markdown());
        output.push_str(&self.history.to_markdown());
        output.push_str(&self.analytics.to_markdown());
        output.push_str(&self.arbitrage.to_markdown());
        output
    }
}
