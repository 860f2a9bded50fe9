//! StockBuddy CLI binary.
//!
//! Renders the dashboard views for a ticker in the terminal, as Markdown, or
//! as JSON, and exports the underlying series to CSV or JSON files.

mod settings;

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use settings::Settings;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use stockbuddy::{Dashboard, MAX_HORIZON_DAYS, MIN_HORIZON_DAYS, Section};
use stockbuddy_analytics::SpreadAlignment;
use stockbuddy_data::yahoo::YahooGateway;
use stockbuddy_data::{Period, PriceField, normalize_symbol};
use stockbuddy_output::{ExportFormat, Exporter, Render, ReportBuilder, render_warnings};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stockbuddy")]
#[command(about = "StockBuddy: stock analysis dashboard", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to ./stockbuddy.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Company description, key metrics and recent news
    Overview {
        /// Stock symbol
        symbol: Option<String>,
    },

    /// Financial ratios and statements
    Financials {
        /// Stock symbol
        symbol: Option<String>,
    },

    /// Historical prices for one column
    History {
        /// Stock symbol
        symbol: Option<String>,

        /// Lookback period (1mo, 3mo, 6mo, 1y, 5y, max)
        #[arg(long, value_parser = parse_period)]
        period: Option<Period>,

        /// Price column (Close, Open, High, Low, Volume)
        #[arg(long, value_parser = parse_field, default_value = "Close")]
        field: PriceField,

        /// Show the data table below the chart summary
        #[arg(long)]
        table: bool,

        /// Export the full series (.csv or .json)
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Trend regression, moving averages and Monte Carlo forecast
    Analytics {
        /// Stock symbol
        symbol: Option<String>,

        /// Forecast horizon in trading days
        #[arg(long, value_parser = parse_horizon)]
        days: Option<usize>,

        /// Number of simulated paths
        #[arg(long)]
        simulations: Option<usize>,

        /// Seed for the simulation generator
        #[arg(long)]
        seed: Option<u64>,

        /// Short moving average window
        #[arg(long)]
        short_window: Option<usize>,

        /// Long moving average window
        #[arg(long)]
        long_window: Option<usize>,

        /// Directory for CSV exports of each result
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// Normalized price spread between two tickers
    Pair {
        /// First ticker
        left: Option<String>,

        /// Second ticker
        right: Option<String>,

        /// Lookback period
        #[arg(long, value_parser = parse_period)]
        period: Option<Period>,

        /// Date alignment (strict or common-dates)
        #[arg(long, value_parser = parse_alignment)]
        alignment: Option<SpreadAlignment>,

        /// Export the spread (.csv or .json)
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Check that fundamentals are available
    Validate {
        /// Stock symbol
        symbol: Option<String>,
    },

    /// Every view for one ticker
    Dashboard {
        /// Stock symbol
        symbol: Option<String>,

        /// Export the full report as JSON
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

fn parse_period(s: &str) -> Result<Period, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_field(s: &str) -> Result<PriceField, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_alignment(s: &str) -> Result<SpreadAlignment, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_horizon(s: &str) -> Result<usize, String> {
    let days: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number of days"))?;
    if (MIN_HORIZON_DAYS..=MAX_HORIZON_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(format!(
            "horizon must be between {MIN_HORIZON_DAYS} and {MAX_HORIZON_DAYS} days"
        ))
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref())?;
    let output = cli.format;

    match cli.command {
        Commands::Overview { symbol } => {
            let symbol = resolve_symbol(symbol, &settings)?;
            let dashboard = build_dashboard(&settings, PriceField::Close, false)?;
            let view = with_spinner(&symbol, "overview", dashboard.overview(&symbol)).await?;
            emit(output, &symbol, "overview", &view)?;
        }
        Commands::Financials { symbol } => {
            let symbol = resolve_symbol(symbol, &settings)?;
            let dashboard = build_dashboard(&settings, PriceField::Close, false)?;
            let view = with_spinner(&symbol, "financials", dashboard.financials(&symbol)).await?;
            emit(output, &symbol, "financials", &view)?;
        }
        Commands::History {
            symbol,
            period,
            field,
            table,
            export,
        } => {
            let symbol = resolve_symbol(symbol, &settings)?;
            if let Some(period) = period {
                settings.dashboard.period = period;
            }
            let dashboard = build_dashboard(&settings, field, table)?;
            let view = with_spinner(&symbol, "history", dashboard.history(&symbol)).await?;
            if let Some(path) = export {
                export_to(&view, &path)?;
            }
            emit(output, &symbol, "history", &view)?;
        }
        Commands::Analytics {
            symbol,
            days,
            simulations,
            seed,
            short_window,
            long_window,
            export_dir,
        } => {
            let symbol = resolve_symbol(symbol, &settings)?;
            let analytics = &mut settings.analytics;
            analytics.horizon_days = days.unwrap_or(analytics.horizon_days);
            analytics.simulations = simulations.unwrap_or(analytics.simulations);
            analytics.seed = seed.unwrap_or(analytics.seed);
            analytics.short_window = short_window.unwrap_or(analytics.short_window);
            analytics.long_window = long_window.unwrap_or(analytics.long_window);

            let dashboard = build_dashboard(&settings, PriceField::Close, false)?;
            let view = with_spinner(&symbol, "analytics", dashboard.analytics(&symbol)).await?;
            if let Some(dir) = export_dir {
                std::fs::create_dir_all(&dir)?;
                let stem = symbol.to_ascii_lowercase();
                export_section(&view.regression, &dir.join(format!("{stem}_regression.csv")))?;
                export_section(
                    &view.moving_averages,
                    &dir.join(format!("{stem}_moving_averages.csv")),
                )?;
                export_section(
                    &view.monte_carlo,
                    &dir.join(format!("{stem}_monte_carlo.csv")),
                )?;
            }
            emit(output, &symbol, "analytics", &view)?;
        }
        Commands::Pair {
            left,
            right,
            period,
            alignment,
            export,
        } => {
            let left = match left {
                Some(left) => normalize_symbol(&left)?,
                None => settings.dashboard.pair_left.clone(),
            };
            let right = match right {
                Some(right) => normalize_symbol(&right)?,
                None => settings.dashboard.pair_right.clone(),
            };
            if let Some(alignment) = alignment {
                settings.analytics.alignment = alignment;
            }
            let mut config = settings.dashboard_config(PriceField::Close, false);
            if let Some(period) = period {
                config.pair_period = period;
            }
            let dashboard = Dashboard::new(YahooGateway::with_config(settings.gateway_config())?, config)?;

            let label = format!("{left}/{right}");
            let view = with_spinner(&label, "pair", dashboard.arbitrage_for(&left, &right)).await?;
            if let Some(path) = export {
                export_to(&view.spread, &path)?;
            }
            emit(output, &label, "pair", &view)?;
        }
        Commands::Validate { symbol } => {
            let symbol = resolve_symbol(symbol, &settings)?;
            let dashboard = build_dashboard(&settings, PriceField::Close, false)?;
            let warnings = with_spinner(&symbol, "validation", dashboard.warnings(&symbol)).await?;
            match output {
                OutputFormat::Json => print_report(&symbol, "validate", &warnings)?,
                _ if warnings.is_empty() => println!("All fundamentals available for {symbol}."),
                _ => print!("{}", render_warnings(&warnings)),
            }
        }
        Commands::Dashboard { symbol, export } => {
            let symbol = resolve_symbol(symbol, &settings)?;
            let dashboard = build_dashboard(&settings, PriceField::Close, false)?;
            let spinner = spinner(&format!("Building dashboard for {symbol}..."))?;
            let report = dashboard.build(&symbol).await;
            spinner.finish_and_clear();
            if let Some(path) = export {
                report.export_to_file(&path, ExportFormat::PrettyJson)?;
                tracing::info!(path = %path.display(), "exported dashboard report");
            }
            emit(output, &symbol, "dashboard", &report)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "stockbuddy=debug,stockbuddy_data=debug,stockbuddy_analytics=debug"
    } else {
        "stockbuddy=warn,stockbuddy_data=warn,stockbuddy_analytics=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_symbol(symbol: Option<String>, settings: &Settings) -> Result<String, Box<dyn std::error::Error>> {
    let symbol = symbol.unwrap_or_else(|| settings.dashboard.ticker.clone());
    Ok(normalize_symbol(&symbol)?)
}

fn build_dashboard(
    settings: &Settings,
    field: PriceField,
    show_table: bool,
) -> Result<Dashboard<YahooGateway>, Box<dyn std::error::Error>> {
    let gateway = YahooGateway::with_config(settings.gateway_config())?;
    Ok(Dashboard::new(gateway, settings.dashboard_config(field, show_table))?)
}

fn spinner(message: &str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    Ok(pb)
}

async fn with_spinner<T, E>(
    symbol: &str,
    what: &str,
    fut: impl Future<Output = Result<T, E>>,
) -> Result<T, Box<dyn std::error::Error>>
where
    E: std::error::Error + 'static,
{
    let pb = spinner(&format!("Loading {what} for {symbol}..."))?;
    let result = fut.await;
    match &result {
        Ok(_) => pb.finish_and_clear(),
        Err(_) => pb.finish_with_message("Failed!"),
    }
    Ok(result?)
}

fn emit<V: Render + Serialize>(
    output: OutputFormat,
    symbol: &str,
    view: &str,
    value: &V,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        OutputFormat::Text => print!("{}", value.to_ascii_table()),
        OutputFormat::Markdown => print!("{}", value.to_markdown()),
        OutputFormat::Json => print_report(symbol, view, value)?,
    }
    Ok(())
}

fn print_report<T: Serialize>(symbol: &str, view: &str, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let report = ReportBuilder::new()
        .symbol(symbol)
        .view(view)
        .contents(value)?
        .build()?;
    println!("{}", report.to_json()?);
    Ok(())
}

fn export_to<E: Exporter>(value: &E, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let format = ExportFormat::from_path(path)?;
    value.export_to_file(path, format)?;
    tracing::info!(path = %path.display(), %format, "exported");
    eprintln!("Exported to {}", path.display());
    Ok(())
}

fn export_section<E: Exporter>(section: &Section<E>, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match section {
        Section::Ready { data } => export_to(data, path),
        Section::Failed { error } => {
            eprintln!("Skipping {}: {error}", path.display());
            Ok(())
        }
    }
}
