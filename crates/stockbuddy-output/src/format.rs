//! Number formatting for metric cards and tables.

use stockbuddy::MetricValue;

/// Placeholder for values the source did not report.
pub const NOT_AVAILABLE: &str = "N/A";

/// Whole dollars with thousands separators, e.g. `$2,913,359,000,000`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(value.abs().round() as u128))
}

/// Two decimals.
pub fn format_number(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        NOT_AVAILABLE.to_string()
    }
}

/// A fraction as a percentage with two decimals, e.g. `0.0044` as `0.44%`.
pub fn format_percent(fraction: f64) -> String {
    if fraction.is_finite() {
        format!("{:.2}%", fraction * 100.0)
    } else {
        NOT_AVAILABLE.to_string()
    }
}

/// Format a metric card value.
pub fn format_metric(value: &MetricValue) -> String {
    match *value {
        MetricValue::Currency(v) => format_currency(v),
        MetricValue::Number(v) => format_number(v),
        MetricValue::Percent(v) => format_percent(v),
        MetricValue::Missing => NOT_AVAILABLE.to_string(),
    }
}

/// Currency or `N/A`.
pub fn format_optional_currency(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), format_currency)
}

/// Price with two decimals, or `N/A`.
pub fn format_optional_number(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), format_number)
}

fn group_thousands(mut n: u128) -> String {
    let mut groups = Vec::new();
    loop {
        let rest = n / 1000;
        if rest == 0 {
            groups.push((n % 1000).to_string());
            break;
        }
        groups.push(format!("{:03}", n % 1000));
        n = rest;
    }
    groups.reverse();
    groups.join(",")
}
