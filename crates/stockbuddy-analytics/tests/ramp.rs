//! End-to-end analyses over a synthetic linear ramp served by the in-memory gateway.

use approx::assert_relative_eq;
use chrono::{Days, NaiveDate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use stockbuddy_analytics::{
    AnalyticsError, MovingAverageConfig, SimulationConfig, SplitConfig, SpreadAlignment,
    pair_spread, ticker_monte_carlo, ticker_moving_averages, trend_regression,
};
use stockbuddy_data::{InMemoryGateway, Period, PriceSeries};

const N: usize = 252;

fn trading_days(n: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(n);
    let mut day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    while dates.len() < n {
        if !matches!(day.format("%a").to_string().as_str(), "Sat" | "Sun") {
            dates.push(day);
        }
        day = day + Days::new(1);
    }
    dates
}

/// 252 closes rising linearly from 100 to 200.
fn ramp(symbol: &str) -> PriceSeries {
    let closes: Vec<f64> = (0..N)
        .map(|i| 100.0 + 100.0 * i as f64 / (N - 1) as f64)
        .collect();
    PriceSeries::from_closes(symbol, &trading_days(N), &closes).unwrap()
}

fn gateway() -> InMemoryGateway {
    InMemoryGateway::new().with_series(ramp("RAMP"))
}

#[tokio::test]
async fn ramp_moving_averages_match_trailing_means() {
    let gateway = gateway();
    let frame = ticker_moving_averages(&gateway, "RAMP", &MovingAverageConfig::default())
        .await
        .unwrap();

    assert_eq!(frame.len(), N);
    assert_relative_eq!(frame.short[0], 100.0);
    assert_relative_eq!(frame.long[0], 100.0);

    let step = 100.0 / 251.0;
    let (_, close, short, long) = frame.last().unwrap();
    assert_relative_eq!(close, 200.0, epsilon = 1e-9);
    // Mean of closes 232..=251 and 202..=251.
    assert_relative_eq!(short, 100.0 + 241.5 * step, epsilon = 1e-9);
    assert_relative_eq!(long, 100.0 + 226.5 * step, epsilon = 1e-9);
    assert!(short > long);
    assert_relative_eq!(short, 196.215_139, epsilon = 1e-5);
    assert_relative_eq!(long, 190.239_044, epsilon = 1e-5);
}

#[tokio::test]
async fn ramp_regression_holds_out_a_fifth() {
    let gateway = gateway();
    let result = trend_regression(&gateway, "RAMP", &SplitConfig::default())
        .await
        .unwrap();

    assert_eq!(result.len(), 50);
    assert_eq!(result.predicted.len(), result.actual.len());
    assert_eq!(result.train_len, 202);
    assert!(result.fit.slope > 0.0);
    // Calendar offsets leave weekend gaps, so the fit is close but not exact.
    assert!(result.r_squared() > 0.99);

    let again = trend_regression(&gateway, "RAMP", &SplitConfig::default())
        .await
        .unwrap();
    assert_eq!(result.dates, again.dates);
}

#[tokio::test]
async fn ramp_monte_carlo_starts_at_last_close() {
    let gateway = gateway();
    let config = SimulationConfig {
        days: 30,
        simulations: 100,
    };
    let paths = ticker_monte_carlo(&gateway, "RAMP", &config, &mut StdRng::seed_from_u64(0))
        .await
        .unwrap();

    assert_eq!(paths.paths().dim(), (30, 100));
    assert_relative_eq!(paths.seed_price(), 200.0, epsilon = 1e-9);
    assert!(paths.paths().iter().all(|&p| p > 0.0));
}

#[tokio::test]
async fn pair_with_shifted_calendar() {
    let dates = trading_days(N + 5);
    let closes: Vec<f64> = (0..N).map(|i| 50.0 + (i as f64 * 0.3).cos()).collect();
    let shifted = PriceSeries::from_closes("SHIFT", &dates[5..], &closes).unwrap();
    let gateway = gateway().with_series(shifted);

    let err = pair_spread(&gateway, "RAMP", "SHIFT", Period::Max, SpreadAlignment::Strict)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::MisalignedSeries { .. }));

    let spread = pair_spread(
        &gateway,
        "RAMP",
        "SHIFT",
        Period::Max,
        SpreadAlignment::CommonDates,
    )
    .await
    .unwrap();
    assert_eq!(spread.len(), N - 5);
    let summary = spread.summary().unwrap();
    assert_relative_eq!(summary.mean, 0.0, epsilon = 1e-9);
    assert_relative_eq!(summary.std, 1.0, epsilon = 1e-9);
}
