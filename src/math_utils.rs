// src/math_utils.rs
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::function::erf;
use std::f64::consts::SQRT_2;

pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf::erf(x / SQRT_2))
}

/// Inverse standard normal CDF, Φ⁻¹(p) for p in (0, 1).
///
/// Stratified sampling maps stratum probabilities back to normal draws,
/// so the input is clamped away from {0, 1} to keep the result finite.
pub fn inverse_norm_cdf(p: f64) -> f64 {
    let clamped = p.clamp(1e-12, 1.0 - 1e-12);
    // Unit normal construction cannot fail
    let standard_normal = Normal::new(0.0, 1.0).unwrap();
    standard_normal.inverse_cdf(clamped)
}
