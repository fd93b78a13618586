// src/models/gbm.rs
//! Risk-neutral Geometric Brownian Motion
//!
//! # Mathematical Framework
//!
//! Under the risk-neutral measure the underlying follows:
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! ```
//!
//! With exact solution over one step of size Δt:
//! ```text
//! S_{t+Δt} = S_t * exp((r - σ²/2 + μ)Δt + σ√Δt * Z)
//! ```
//! where Z ~ N(0,1) and μ is an optional importance-sampling drift shift
//! (zero under the plain risk-neutral dynamics).


pub struct Gbm {
    pub spot: f64,
    pub rate: f64,
    pub sigma: f64,
    /// Importance-sampling drift shift added to the log-drift; 0.0 when disabled
    pub drift_shift: f64,
}

impl Gbm {
    pub fn new(spot: f64, rate: f64, sigma: f64) -> Self {
        Gbm {
            spot,
            rate,
            sigma,
            drift_shift: 0.0,
        }
    }

    pub fn with_drift_shift(spot: f64, rate: f64, sigma: f64, drift_shift: f64) -> Self {
        Gbm {
            spot,
            rate,
            sigma,
            drift_shift,
        }
    }

    /// Exact GBM step: S_{t+Δt} = S_t · exp((r − σ²/2 + μ)Δt + σ√Δt·Z)
    pub fn exact_step(&self, s_t: f64, dt: f64, normal_draw: f64) -> f64 {
        s_t * ((self.rate - 0.5 * self.sigma * self.sigma + self.drift_shift) * dt
            + self.sigma * dt.sqrt() * normal_draw)
            .exp()
    }
}
