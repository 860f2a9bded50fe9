//! Layered settings.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `stockbuddy.toml` in the working directory, or the file given with
//!    `--config` (which must exist)
//! 3. environment variables such as `STOCKBUDDY_ANALYTICS__SHORT_WINDOW=10`
//!
//! Command-line flags are applied on top by the caller.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use stockbuddy::{DashboardConfig, DashboardError};
use stockbuddy_analytics::{MovingAverageConfig, SimulationConfig, SplitConfig, SpreadAlignment};
use stockbuddy_data::yahoo::GatewayConfig;
use stockbuddy_data::{Period, PriceField, RetryPolicy};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "stockbuddy";

/// Prefix of environment overrides.
pub(crate) const ENV_PREFIX: &str = "STOCKBUDDY";

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] DashboardError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AnalyticsSettings {
    pub(crate) short_window: usize,
    pub(crate) long_window: usize,
    pub(crate) horizon_days: usize,
    pub(crate) simulations: usize,
    pub(crate) seed: u64,
    pub(crate) test_fraction: f64,
    pub(crate) split_seed: u64,
    pub(crate) alignment: SpreadAlignment,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        let windows = MovingAverageConfig::default();
        let simulation = SimulationConfig::default();
        let split = SplitConfig::default();
        Self {
            short_window: windows.short_window,
            long_window: windows.long_window,
            horizon_days: simulation.days,
            simulations: simulation.simulations,
            seed: 0,
            test_fraction: split.test_fraction,
            split_seed: split.seed,
            alignment: SpreadAlignment::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct GatewaySettings {
    pub(crate) retry_attempts: u32,
    pub(crate) initial_backoff_ms: u64,
    pub(crate) rate_limit_delay_ms: u64,
    pub(crate) user_agent: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        let gateway = GatewayConfig::default();
        Self {
            retry_attempts: gateway.retry.max_attempts,
            initial_backoff_ms: gateway.retry.initial_delay.as_millis() as u64,
            rate_limit_delay_ms: gateway.rate_limit_delay.as_millis() as u64,
            user_agent: gateway.user_agent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct DashboardSettings {
    pub(crate) ticker: String,
    pub(crate) pair_left: String,
    pub(crate) pair_right: String,
    pub(crate) period: Period,
    pub(crate) news_count: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        let dashboard = DashboardConfig::default();
        Self {
            ticker: "AAPL".to_string(),
            pair_left: dashboard.pair_left,
            pair_right: dashboard.pair_right,
            period: dashboard.history_period,
            news_count: dashboard.news_count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) analytics: AnalyticsSettings,
    pub(crate) gateway: GatewaySettings,
    pub(crate) dashboard: DashboardSettings,
}

impl Settings {
    /// Load defaults, then the config file, then the environment.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Self = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.dashboard_config(PriceField::Close, false).validate()?;
        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }

    /// Gateway settings for the Yahoo client.
    pub(crate) fn gateway_config(&self) -> GatewayConfig {
        let defaults = GatewayConfig::default();
        GatewayConfig {
            retry: RetryPolicy {
                max_attempts: self.gateway.retry_attempts.max(1),
                initial_delay: Duration::from_millis(self.gateway.initial_backoff_ms),
                ..defaults.retry
            },
            rate_limit_delay: Duration::from_millis(self.gateway.rate_limit_delay_ms),
            user_agent: self.gateway.user_agent.clone(),
            news_count: self.dashboard.news_count,
        }
    }

    /// Dashboard settings for the given history column and table toggle.
    pub(crate) fn dashboard_config(&self, field: PriceField, show_table: bool) -> DashboardConfig {
        let analytics = &self.analytics;
        DashboardConfig {
            history_period: self.dashboard.period,
            field,
            show_table,
            split: SplitConfig {
                test_fraction: analytics.test_fraction,
                seed: analytics.split_seed,
            },
            moving_averages: MovingAverageConfig {
                short_window: analytics.short_window,
                long_window: analytics.long_window,
            },
            simulation: SimulationConfig {
                days: analytics.horizon_days,
                simulations: analytics.simulations,
            },
            simulation_seed: analytics.seed,
            pair_left: self.dashboard.pair_left.clone(),
            pair_right: self.dashboard.pair_right.clone(),
            pair_period: Period::OneYear,
            alignment: analytics.alignment,
            news_count: self.dashboard.news_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_library_defaults() {
        let settings = Settings::default();
        let config = settings.dashboard_config(PriceField::Close, false);
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(settings.gateway_config(), GatewayConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!(
            "stockbuddy-settings-{}.toml",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[analytics]\nshort_window = 10\nalignment = \"common-dates\"\n\n[dashboard]\nperiod = \"5y\"\npair_right = \"GOOG\""
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.analytics.short_window, 10);
        assert_eq!(settings.analytics.long_window, 50);
        assert_eq!(settings.analytics.alignment, SpreadAlignment::CommonDates);
        assert_eq!(settings.dashboard.period, Period::FiveYears);
        assert_eq!(settings.dashboard.pair_right, "GOOG");
    }

    #[test]
    fn test_invalid_horizon_fails_at_load() {
        let path = std::env::temp_dir().join(format!(
            "stockbuddy-settings-bad-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[analytics]\nhorizon_days = 400\n").unwrap();
        let result = Settings::load(Some(&path));
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let path = std::env::temp_dir().join("stockbuddy-settings-does-not-exist.toml");
        assert!(matches!(
            Settings::load(Some(&path)),
            Err(SettingsError::Load(_))
        ));
    }
}
