// src/lattice/crr.rs
//! Cox-Ross-Rubinstein Binomial Lattice
//!
//! # Mathematical Framework
//!
//! The recombining tree discretizes GBM with:
//! ```text
//! u = exp(σ√Δt),  d = 1/u
//! p = (exp(rΔt) - d) / (u - d)
//! ```
//! Terminal node `j` (j = number of down moves) carries
//! `S·u^(N-j)·d^j`. Backward induction rolls option values toward the
//! root with the per-step discount `exp(-rΔt)`:
//! ```text
//! V_{i,j} = e^(-rΔt) · (p·V_{i+1,j} + (1-p)·V_{i+1,j+1})
//! ```
//! American exercise replaces the rolled value with
//! `max(V_{i,j}, intrinsic)` at every level; Bermudan only at levels whose
//! time lies within Δt/2 of a contractual exercise date.
//!
//! # Memory
//!
//! A single `O(N)` value buffer is reused across levels; the full tableau
//! is never materialized.

use crate::error::{validation::*, PricingError, PricingResult};
use crate::market::MarketParams;
use crate::mc::payoffs::OptionKind;

/// When early exercise is permitted during backward induction
#[derive(Debug, Clone, Copy)]
pub enum ExercisePolicy<'a> {
    European,
    American,
    /// Exercise allowed only at the supplied dates (strictly increasing, positive)
    Bermudan(&'a [f64]),
}

/// Price an option on a CRR lattice with `steps` levels.
///
/// # Errors
///
/// Returns `PricingError` when the configuration is invalid or the
/// risk-neutral probability falls outside [0, 1] (a too-coarse grid for
/// the given rate and volatility).
pub fn crr_price(
    market: &MarketParams,
    kind: OptionKind,
    policy: ExercisePolicy,
    steps: usize,
) -> PricingResult<f64> {
    market.validate()?;
    validate_steps(steps)?;
    if let ExercisePolicy::Bermudan(dates) = policy {
        validate_exercise_dates(dates)?;
    }

    let n = steps;
    let dt = market.maturity / n as f64;
    let u = (market.volatility * dt.sqrt()).exp();
    let d = 1.0 / u;
    let disc = (-market.rate * dt).exp();
    let p = ((market.rate * dt).exp() - d) / (u - d);

    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(PricingError::NumericalInstability {
            method: "CRR lattice".to_string(),
            reason: format!("risk-neutral probability {} outside [0, 1]", p),
        });
    }

    // Terminal payoffs, j counting down moves
    let mut values: Vec<f64> = (0..=n)
        .map(|j| {
            let s = market.spot * u.powi((n - j) as i32) * d.powi(j as i32);
            kind.intrinsic(s, market.strike)
        })
        .collect();

    for i in (0..n).rev() {
        let exercisable = match policy {
            ExercisePolicy::European => false,
            ExercisePolicy::American => true,
            ExercisePolicy::Bermudan(dates) => {
                let t_i = i as f64 * dt;
                dates.iter().any(|&date| (date - t_i).abs() < 0.5 * dt)
            }
        };

        for j in 0..=i {
            let continuation = disc * (p * values[j] + (1.0 - p) * values[j + 1]);
            values[j] = if exercisable {
                let s = market.spot * u.powi((i - j) as i32) * d.powi(j as i32);
                continuation.max(kind.intrinsic(s, market.strike))
            } else {
                continuation
            };
        }
    }

    Ok(values[0])
}
