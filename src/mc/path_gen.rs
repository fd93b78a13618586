// src/mc/path_gen.rs
//! GBM Path Generation with Variance-Reduction Hooks
//!
//! # Mathematical Framework
//!
//! Each path is built from the exact GBM solution on a time grid
//! `0 = t_0 < t_1 < … < t_M = T`:
//! ```text
//! S_i = S_{i-1} * exp((r - σ²/2 + μ)Δt_i + σ√Δt_i * Z_i)
//! ```
//! where `μ` is the importance-sampling drift shift (zero when disabled).
//!
//! # Likelihood-Ratio Weight
//!
//! Shifting the drift samples from a tilted measure. The Radon–Nikodym
//! correction per step with θ_i = (μ/σ)√Δt_i is
//! ```text
//! w = exp(-Σ θ_i Z_i - ½ Σ θ_i²) = exp(-(μ/σ)·Σ √Δt_i Z_i - ½ μ²T/σ²)
//! ```
//! so `payoff · w` stays unbiased under the original risk-neutral measure.
//!
//! # Stratified Terminal Draw
//!
//! In stratified mode, sample `k` of `n` draws its terminal increment as
//! `Φ⁻¹((k + U_k)/n)`; earlier increments are ordinary draws. Stratifying
//! a single increment leaves the rest of the path untouched, which is
//! exact for terminal-value payoffs and a known (accepted) approximation
//! for path-dependent ones.

use crate::math_utils::inverse_norm_cdf;
use crate::models::gbm::Gbm;
use crate::rng;
use rand::rngs::StdRng;

/// One simulated path plus its importance-sampling weight (1.0 when IS is off)
pub struct SimulatedPath {
    pub prices: Vec<f64>,
    pub weight: f64,
}

impl SimulatedPath {
    pub fn terminal(&self) -> f64 {
        self.prices.last().copied().unwrap_or(0.0)
    }
}

/// Samples risk-neutral GBM paths on a fixed time grid.
pub struct PathSampler {
    gbm: Gbm,
    dts: Vec<f64>,
    stratified: bool,
    strata: usize,
}

impl PathSampler {
    /// Uniform grid of `steps` intervals over `[0, maturity]`
    pub fn uniform(gbm: Gbm, maturity: f64, steps: usize, stratified: bool, strata: usize) -> Self {
        let dt = maturity / steps as f64;
        PathSampler {
            gbm,
            dts: vec![dt; steps],
            stratified,
            strata: strata.max(1),
        }
    }

    /// Grid through the supplied strictly increasing times (t=0 implied)
    pub fn through_dates(gbm: Gbm, dates: &[f64]) -> Self {
        let mut dts = Vec::with_capacity(dates.len());
        let mut prev = 0.0;
        for &t in dates {
            dts.push(t - prev);
            prev = t;
        }
        PathSampler {
            gbm,
            dts,
            stratified: false,
            strata: 1,
        }
    }

    pub fn steps(&self) -> usize {
        self.dts.len()
    }

    /// Generate one path for sample `sample_idx`
    pub fn sample(&self, rng: &mut StdRng, sample_idx: usize) -> SimulatedPath {
        let draws = self.draw_increments(rng, sample_idx);
        self.build(&draws, 1.0)
    }

    /// Generate an antithetic pair (Z, -Z) sharing one set of draws
    pub fn sample_pair(&self, rng: &mut StdRng, sample_idx: usize) -> (SimulatedPath, SimulatedPath) {
        let draws = self.draw_increments(rng, sample_idx);
        (self.build(&draws, 1.0), self.build(&draws, -1.0))
    }

    fn draw_increments(&self, rng: &mut StdRng, sample_idx: usize) -> Vec<f64> {
        let m = self.dts.len();
        let mut draws = Vec::with_capacity(m);
        for _ in 0..m.saturating_sub(1) {
            draws.push(rng::get_normal_draw(rng));
        }
        if m > 0 {
            let terminal = if self.stratified {
                let u = rng::get_uniform_draw(rng);
                inverse_norm_cdf((sample_idx as f64 + u) / self.strata as f64)
            } else {
                rng::get_normal_draw(rng)
            };
            draws.push(terminal);
        }
        draws
    }

    fn build(&self, draws: &[f64], sign: f64) -> SimulatedPath {
        let mut prices = Vec::with_capacity(self.dts.len() + 1);
        prices.push(self.gbm.spot);

        let mut current = self.gbm.spot;
        let mut log_weight = 0.0;
        let theta_scale = self.gbm.drift_shift / self.gbm.sigma;

        for (i, &dt) in self.dts.iter().enumerate() {
            let z = sign * draws[i];
            current = self.gbm.exact_step(current, dt, z);
            prices.push(current);

            if self.gbm.drift_shift != 0.0 {
                let theta = theta_scale * dt.sqrt();
                log_weight -= theta * z + 0.5 * theta * theta;
            }
        }

        SimulatedPath {
            prices,
            weight: log_weight.exp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{mix_stream, path_rng};

    fn sampler(steps: usize) -> PathSampler {
        PathSampler::uniform(Gbm::new(100.0, 0.05, 0.2), 1.0, steps, false, 1)
    }

    #[test]
    fn test_path_shape_and_spot() {
        let mut rng = path_rng(mix_stream(42, 0), 0);
        let path = sampler(12).sample(&mut rng, 0);
        assert_eq!(path.prices.len(), 13);
        assert_eq!(path.prices[0], 100.0);
        assert!(path.prices.iter().all(|&s| s > 0.0));
        assert_eq!(path.weight, 1.0);
    }

    #[test]
    fn test_antithetic_pair_mirrors_log_returns() {
        let mut rng = path_rng(mix_stream(42, 0), 0);
        let (p1, p2) = sampler(4).sample_pair(&mut rng, 0);
        // Log-returns of the pair sum to twice the deterministic drift
        let drift = (0.05 - 0.5 * 0.2 * 0.2) * 0.25;
        for i in 1..p1.prices.len() {
            let r1 = (p1.prices[i] / p1.prices[i - 1]).ln();
            let r2 = (p2.prices[i] / p2.prices[i - 1]).ln();
            assert!((r1 + r2 - 2.0 * drift).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reproducible_from_seed() {
        let s = sampler(8);
        let mut rng1 = path_rng(mix_stream(7, 0), 3);
        let mut rng2 = path_rng(mix_stream(7, 0), 3);
        let a = s.sample(&mut rng1, 3);
        let b = s.sample(&mut rng2, 3);
        assert_eq!(a.prices, b.prices);
    }

    #[test]
    fn test_stratified_terminal_ordering() {
        // With U ~ (0,1), stratum k draws its terminal z from quantile
        // ((k+U)/n): low strata must land below high strata for one step.
        let s = PathSampler::uniform(Gbm::new(100.0, 0.05, 0.2), 1.0, 1, true, 100);
        let mut rng_low = path_rng(mix_stream(42, 0), 0);
        let mut rng_high = path_rng(mix_stream(42, 0), 99);
        let low = s.sample(&mut rng_low, 0);
        let high = s.sample(&mut rng_high, 99);
        assert!(low.terminal() < high.terminal());
    }

    #[test]
    fn test_importance_weight_is_unit_mean() {
        // E[w] = 1 under the sampling measure
        let s = PathSampler::uniform(Gbm::with_drift_shift(100.0, 0.05, 0.2, 0.1), 1.0, 4, false, 1);
        let n = 20_000;
        let mean_w: f64 = (0..n)
            .map(|i| {
                let mut rng = path_rng(mix_stream(11, 0), i as u64);
                s.sample(&mut rng, i).weight
            })
            .sum::<f64>()
            / n as f64;
        assert!(
            (mean_w - 1.0).abs() < 0.05,
            "mean weight should be ~1, got {}",
            mean_w
        );
    }

    #[test]
    fn test_date_grid_spacing() {
        let s = PathSampler::through_dates(Gbm::new(100.0, 0.05, 0.2), &[0.25, 0.5, 1.0]);
        assert_eq!(s.steps(), 3);
        let mut rng = path_rng(mix_stream(42, 0), 0);
        let path = s.sample(&mut rng, 0);
        assert_eq!(path.prices.len(), 4);
    }
}
