//! Monte Carlo price paths under geometric Brownian motion.
//!
//! The model is calibrated in-sample on the whole close history:
//!
//! ```text
//! r_t     = ln(p_t / p_{t-1})
//! drift   = mean(r) - var(r) / 2
//! f[t, j] = exp(drift + stdev · Φ⁻¹(u[t, j])),   u ~ U(0, 1)
//! S[0, j] = last close
//! S[t, j] = S[t-1, j] · f[t, j]
//! ```
//!
//! Rows are days, columns are independent simulations. Factors are drawn in
//! row-major order, so a seeded generator reproduces the ensemble exactly.

use crate::error::{AnalyticsError, Result};
use crate::returns::DriftEstimate;
use crate::stats::quantile;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::Rng;
use rand::distributions::Open01;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Simulation size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Horizon in trading days, including the seed day
    pub days: usize,
    /// Number of independent paths
    pub simulations: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: 30,
            simulations: 1000,
        }
    }
}

impl SimulationConfig {
    /// Reject an empty ensemble.
    pub fn validate(&self) -> Result<()> {
        if self.days == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "simulation horizon must be at least 1 day".to_string(),
            ));
        }
        if self.simulations == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "number of simulations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Final-day distribution of simulated prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalPriceBands {
    /// 5th percentile
    pub p5: f64,
    /// Median
    pub p50: f64,
    /// 95th percentile
    pub p95: f64,
}

/// Ensemble of simulated price paths, shape `(days, simulations)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePaths {
    symbol: String,
    seed_price: f64,
    estimate: DriftEstimate,
    paths: Array2<f64>,
}

impl PricePaths {
    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Last observed close, row 0 of every path.
    pub const fn seed_price(&self) -> f64 {
        self.seed_price
    }

    /// Return moments the paths were drawn from.
    pub const fn estimate(&self) -> &DriftEstimate {
        &self.estimate
    }

    /// Full `(days, simulations)` matrix.
    pub const fn paths(&self) -> &Array2<f64> {
        &self.paths
    }

    /// Horizon length.
    pub fn days(&self) -> usize {
        self.paths.nrows()
    }

    /// Number of paths.
    pub fn simulations(&self) -> usize {
        self.paths.ncols()
    }

    /// One simulated path.
    pub fn path(&self, simulation: usize) -> Option<ArrayView1<'_, f64>> {
        (simulation < self.simulations()).then(|| self.paths.column(simulation))
    }

    /// Mean simulated price per day.
    pub fn mean_path(&self) -> Array1<f64> {
        // Axis length is never zero; the config rejects empty ensembles.
        self.paths
            .mean_axis(Axis(1))
            .unwrap_or_else(|| Array1::zeros(self.days()))
    }

    /// Prices on the last simulated day.
    pub fn final_prices(&self) -> Vec<f64> {
        self.paths.row(self.days() - 1).to_vec()
    }

    /// 5%, 50% and 95% quantiles of the final-day prices.
    pub fn final_bands(&self) -> FinalPriceBands {
        let finals = self.final_prices();
        FinalPriceBands {
            p5: quantile(&finals, 0.05),
            p50: quantile(&finals, 0.5),
            p95: quantile(&finals, 0.95),
        }
    }
}

/// Simulate `config.days × config.simulations` prices from a close history.
pub fn simulate_paths<R: Rng + ?Sized>(
    symbol: &str,
    closes: &[f64],
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<PricePaths> {
    config.validate()?;
    let estimate = DriftEstimate::from_closes(closes)?;
    let seed_price = closes[closes.len() - 1];

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AnalyticsError::InvalidParameter(format!("standard normal: {e}")))?;
    let factors = Array2::from_shape_simple_fn((config.days, config.simulations), || {
        let u: f64 = rng.sample(Open01);
        (estimate.drift + estimate.stdev * normal.inverse_cdf(u)).exp()
    });

    let mut paths = Array2::<f64>::zeros((config.days, config.simulations));
    paths.row_mut(0).fill(seed_price);
    for t in 1..config.days {
        let next = &paths.row(t - 1) * &factors.row(t);
        paths.row_mut(t).assign(&next);
    }

    if paths.iter().any(|p| !(p.is_finite() && *p > 0.0)) {
        return Err(AnalyticsError::DegenerateInput(
            "simulated prices left the positive finite range".to_string(),
        ));
    }

    tracing::debug!(
        symbol,
        days = config.days,
        simulations = config.simulations,
        drift = estimate.drift,
        stdev = estimate.stdev,
        "simulated price paths"
    );

    Ok(PricePaths {
        symbol: symbol.to_string(),
        seed_price,
        estimate,
        paths,
    })
}
