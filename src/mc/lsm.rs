// src/mc/lsm.rs
//! Least-Squares Monte Carlo (Longstaff-Schwartz) for early exercise
//!
//! # Algorithm
//!
//! 1. Simulate all paths up front on the exercise-date grid.
//! 2. Seed each path's cash flow with the terminal exercise payoff.
//! 3. Walk the dates backwards. At each date, restrict to in-the-money
//!    paths, regress their discounted future cash flows on the polynomial
//!    basis {1, S, S²} of the current underlying level, and exercise the
//!    paths whose intrinsic value beats the fitted continuation value.
//! 4. Discount each path's realized cash flow from its own exercise time
//!    and average.
//!
//! Reference: Longstaff & Schwartz (2001), "Valuing American Options by
//! Simulation".
//!
//! Antithetic pairing and importance sampling propagate through the shared
//! path set; control variates are not applied here. Fewer than three
//! in-the-money paths at a date is too thin to regress, so the cash flows
//! carry forward unchanged.

use crate::error::{validation::*, PricingError, PricingResult};
use crate::market::MarketParams;
use crate::mc::engine::VrFlags;
use crate::mc::path_gen::{PathSampler, SimulatedPath};
use crate::mc::payoffs::OptionKind;
use crate::models::gbm::Gbm;
use crate::rng;
use nalgebra::{Matrix3, Vector3};
use ndarray::Array2;
use rayon::prelude::*;

/// Minimum in-the-money sample size for a stable quadratic fit
const MIN_REGRESSION_PATHS: usize = 3;

pub struct LsmConfig<'a> {
    pub paths: usize,
    pub market: MarketParams,
    pub kind: OptionKind,
    /// Exercise dates, strictly increasing; the last one is the maturity
    pub dates: &'a [f64],
    pub vr: VrFlags,
    pub drift_shift: f64,
    pub stream_seed: u64,
}

impl LsmConfig<'_> {
    pub fn validate(&self) -> PricingResult<()> {
        validate_paths(self.paths)?;
        self.market.validate()?;
        validate_finite("drift_shift", self.drift_shift)?;
        validate_exercise_dates(self.dates)?;

        let last = *self.dates.last().unwrap_or(&0.0);
        if (last - self.market.maturity).abs() > 1e-9 * self.market.maturity.max(1.0) {
            return Err(PricingError::InvalidConfiguration {
                field: "exercise_dates".to_string(),
                reason: format!(
                    "final exercise date {} must coincide with maturity {}",
                    last, self.market.maturity
                ),
            });
        }
        Ok(())
    }
}

/// Price an early-exercisable option by Longstaff-Schwartz regression.
pub fn lsm_price(cfg: &LsmConfig) -> PricingResult<f64> {
    cfg.validate()?;

    let antithetic = cfg.vr.contains(VrFlags::ANTITHETIC);
    let drift_shift = if cfg.vr.contains(VrFlags::IMPORTANCE_SAMPLING) {
        cfg.drift_shift
    } else {
        0.0
    };

    let gbm = Gbm::with_drift_shift(
        cfg.market.spot,
        cfg.market.rate,
        cfg.market.volatility,
        drift_shift,
    );
    let sampler = PathSampler::through_dates(gbm, cfg.dates);

    // All paths are held simultaneously: rows are paths, column 0 is the
    // spot, column j the underlying at dates[j-1].
    let sims: Vec<SimulatedPath> = if antithetic {
        let pairs: Vec<(SimulatedPath, SimulatedPath)> = (0..(cfg.paths / 2).max(1))
            .into_par_iter()
            .map(|k| {
                let mut rng = rng::path_rng(cfg.stream_seed, k as u64);
                sampler.sample_pair(&mut rng, k)
            })
            .collect();
        pairs.into_iter().flat_map(|(a, b)| [a, b]).collect()
    } else {
        (0..cfg.paths)
            .into_par_iter()
            .map(|k| {
                let mut rng = rng::path_rng(cfg.stream_seed, k as u64);
                sampler.sample(&mut rng, k)
            })
            .collect()
    };

    let n_paths = sims.len();
    let n_dates = cfg.dates.len();
    let mut prices = Array2::<f64>::zeros((n_paths, n_dates + 1));
    let mut weights = vec![1.0; n_paths];
    for (i, sim) in sims.iter().enumerate() {
        for (j, &s) in sim.prices.iter().enumerate() {
            prices[[i, j]] = s;
        }
        weights[i] = sim.weight;
    }
    drop(sims);

    let strike = cfg.market.strike;
    let rate = cfg.market.rate;

    // Cash flow and exercise time per path, seeded at maturity
    let mut cash: Vec<f64> = (0..n_paths)
        .map(|i| cfg.kind.intrinsic(prices[[i, n_dates]], strike))
        .collect();
    let mut exercise_time = vec![cfg.market.maturity; n_paths];

    // Work backwards through the exercise dates (terminal date excluded)
    for col in (1..n_dates).rev() {
        let t = cfg.dates[col - 1];

        let itm: Vec<usize> = (0..n_paths)
            .filter(|&i| cfg.kind.intrinsic(prices[[i, col]], strike) > 0.0)
            .collect();
        if itm.len() < MIN_REGRESSION_PATHS {
            continue;
        }

        let x: Vec<f64> = itm.iter().map(|&i| prices[[i, col]]).collect();
        let y: Vec<f64> = itm
            .iter()
            .map(|&i| cash[i] * (-rate * (exercise_time[i] - t)).exp())
            .collect();

        let continuation = fit_quadratic(&x, &y);

        for (idx, &i) in itm.iter().enumerate() {
            let intrinsic = cfg.kind.intrinsic(prices[[i, col]], strike);
            if intrinsic > continuation(x[idx]) {
                cash[i] = intrinsic;
                exercise_time[i] = t;
            }
        }
    }

    // Discount every path's realized cash flow from its own exercise time
    let total: f64 = (0..n_paths)
        .into_par_iter()
        .map(|i| weights[i] * cash[i] * (-rate * exercise_time[i]).exp())
        .sum();
    let price = total / n_paths as f64;

    if !price.is_finite() {
        return Err(PricingError::NumericalInstability {
            method: "Least-Squares Monte Carlo".to_string(),
            reason: format!("price estimate is not finite: {}", price),
        });
    }

    Ok(price.max(0.0))
}

/// Least-squares fit of E[Y | X = x] = a + b·x + c·x² via the normal
/// equations. A singular system falls back to the sample mean.
fn fit_quadratic(x: &[f64], y: &[f64]) -> impl Fn(f64) -> f64 {
    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_x2: f64 = x.iter().map(|&v| v * v).sum();
    let sum_x3: f64 = x.iter().map(|&v| v * v * v).sum();
    let sum_x4: f64 = x.iter().map(|&v| v * v * v * v).sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(&xi, &yi)| xi * yi).sum();
    let sum_x2y: f64 = x.iter().zip(y).map(|(&xi, &yi)| xi * xi * yi).sum();

    let normal = Matrix3::new(
        n, sum_x, sum_x2, //
        sum_x, sum_x2, sum_x3, //
        sum_x2, sum_x3, sum_x4,
    );
    let rhs = Vector3::new(sum_y, sum_xy, sum_x2y);

    let coeffs = normal
        .lu()
        .solve(&rhs)
        .map(|b| (b[0], b[1], b[2]))
        .unwrap_or((sum_y / n, 0.0, 0.0));

    move |s: f64| coeffs.0 + coeffs.1 * s + coeffs.2 * s * s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_quadratic_recovers_polynomial() {
        let x: Vec<f64> = (0..50).map(|i| 80.0 + i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| 2.0 - 0.5 * v + 0.01 * v * v).collect();
        let fit = fit_quadratic(&x, &y);
        for &v in &[85.0, 100.0, 120.0] {
            let expected = 2.0 - 0.5 * v + 0.01 * v * v;
            assert!(
                (fit(v) - expected).abs() < 1e-6,
                "fit({}) = {}, expected {}",
                v,
                fit(v),
                expected
            );
        }
    }

    #[test]
    fn test_fit_quadratic_singular_falls_back_to_mean() {
        // All x identical makes the normal equations singular
        let x = vec![100.0; 10];
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let fit = fit_quadratic(&x, &y);
        assert!((fit(100.0) - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_date_reduces_to_european() {
        let market = MarketParams::new(100.0, 100.0, 0.05, 0.2, 1.0);
        let cfg = LsmConfig {
            paths: 50_000,
            market,
            kind: OptionKind::Put,
            dates: &[1.0],
            vr: VrFlags::empty(),
            drift_shift: 0.0,
            stream_seed: rng::mix_stream(42, 0),
        };
        let price = lsm_price(&cfg).expect("valid configuration");
        // Black-Scholes European put reference ≈ 5.5735
        assert!(
            (price - 5.5735).abs() < 0.3,
            "single-date LSM {} should match the European put",
            price
        );
    }

    #[test]
    fn test_rejects_mismatched_maturity() {
        let market = MarketParams::new(100.0, 100.0, 0.05, 0.2, 1.0);
        let cfg = LsmConfig {
            paths: 1_000,
            market,
            kind: OptionKind::Put,
            dates: &[0.5, 0.9],
            vr: VrFlags::empty(),
            drift_shift: 0.0,
            stream_seed: rng::mix_stream(42, 0),
        };
        assert!(lsm_price(&cfg).is_err());
    }
}
