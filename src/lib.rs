//! # mc-options: Monte Carlo & Lattice Option Pricing
//!
//! A Rust library for pricing equity derivatives under risk-neutral
//! Black-Scholes-Merton dynamics with two numerically distinct engines:
//! Monte Carlo path simulation and a Cox-Ross-Rubinstein binomial lattice.
//!
//! ## Key Features
//!
//! - **High Performance**: parallel path loop with Rayon, deterministic
//!   for a given seed regardless of thread count
//! - **Variance Reduction**: antithetic variates, terminal-stock control
//!   variates, stratified sampling, importance sampling
//! - **Product Coverage**: European, American (LSM and lattice), Bermudan,
//!   Asian arithmetic, barrier, and lookback options
//! - **Robust Numerics**: validated inputs and explicit error propagation
//!
//! ## Quick Start
//!
//! ```rust
//! use mc_options::Context;
//!
//! let mut ctx = Context::new();
//! ctx.set_seed(42);
//! ctx.set_num_simulations(100_000);
//! ctx.set_antithetic(true);
//!
//! // ATM European call: S=100, K=100, r=5%, σ=20%, T=1y
//! let price = ctx
//!     .european_call(100.0, 100.0, 0.05, 0.2, 1.0)
//!     .expect("valid parameters");
//! println!("Option price: {:.4}", price);
//! ```
//!
//! ## Mathematical Foundation
//!
//! All kernels price the discounted risk-neutral expectation
//! `V = e^(-rT) E^Q[payoff]`. The Monte Carlo engine simulates exact GBM
//! steps; the lattice performs backward induction with early-exercise
//! comparison; the Longstaff-Schwartz engine estimates continuation values
//! by least-squares regression over simulated paths.

// Module declarations
pub mod analytics;
pub mod context;
pub mod error;
pub mod lattice;
pub mod market;
pub mod math_utils;
pub mod mc;
pub mod models;
pub mod rng;

// Re-export commonly used types for convenience
pub use context::Context;
pub use error::{PricingError, PricingResult};
pub use market::MarketParams;
pub use mc::engine::VrFlags;
pub use mc::payoffs::{BarrierStyle, LookbackMode, OptionKind, Payoff};
