//! Option Payoff Functions
//!
//! # Mathematical Definitions
//!
//! This module implements the payoff functions that operate on simulated
//! asset price paths. Each payoff represents a different contract type.
//!
//! ## European Options
//! - **Call**: max(S_T - K, 0) - right to buy at strike K
//! - **Put**: max(K - S_T, 0) - right to sell at strike K
//!
//! ## Path-Dependent Options
//! - **Asian**: arithmetic average over discrete observation dates
//! - **Barrier**: knock-in / knock-out against a barrier level, monitored
//!   at every path point, with an optional rebate for contracts that end
//!   inactive
//! - **Lookback**: running maximum / minimum of the path, fixed or
//!   floating strike
//!
//! # Implementation Notes
//!
//! All payoffs operate on the full price path `&[f64]` (index 0 holding the
//! spot) and are pure: evaluating a payoff never touches RNG state.
//! Discounting is the kernel's job; evaluators return undiscounted amounts.


/// Call/put flag shared by the lattice and LSM kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Immediate-exercise value at underlying level `s`
    pub fn intrinsic(&self, s: f64, k: f64) -> f64 {
        match self {
            OptionKind::Call => (s - k).max(0.0),
            OptionKind::Put => (k - s).max(0.0),
        }
    }
}

/// Barrier activation/deactivation style.
///
/// Discriminants match the wire encoding used by the service layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierStyle {
    UpOut = 0,
    UpIn = 1,
    DownOut = 2,
    DownIn = 3,
}

impl BarrierStyle {
    /// Decode the wire representation; out-of-range values map to UpOut
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => BarrierStyle::UpIn,
            2 => BarrierStyle::DownOut,
            3 => BarrierStyle::DownIn,
            _ => BarrierStyle::UpOut,
        }
    }
}

/// Lookback strike convention: floating (payoff against the path extreme)
/// or fixed (extreme against the contractual strike).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookbackMode {
    Floating = 0,
    Fixed = 1,
}

impl LookbackMode {
    pub fn from_code(code: i32) -> Self {
        if code == 1 {
            LookbackMode::Fixed
        } else {
            LookbackMode::Floating
        }
    }
}

/// Enumeration of supported option payoff types
///
/// Each variant contains the parameters needed to compute the payoff
/// from a simulated asset price path.
#[derive(Debug, Clone)]
pub enum Payoff {
    /// European call option: max(S_T - K, 0)
    EuropeanCall { k: f64 },

    /// European put option: max(K - S_T, 0)
    EuropeanPut { k: f64 },

    /// Asian arithmetic call: max(Ā - K, 0) over n_obs observations ending at T
    AsianArithmeticCall { k: f64, n_obs: usize },

    /// Asian arithmetic put: max(K - Ā, 0) over n_obs observations ending at T
    AsianArithmeticPut { k: f64, n_obs: usize },

    /// Barrier call: vanilla call gated by a knock condition against h;
    /// a contract that ends inactive pays the rebate instead
    BarrierCall {
        k: f64,
        h: f64,
        style: BarrierStyle,
        rebate: f64,
    },

    /// Lookback call: fixed strike max(max S - K, 0), floating strike S_T - min S
    LookbackCall { k: f64, mode: LookbackMode },

    /// Lookback put: fixed strike max(K - min S, 0), floating strike max S - S_T
    LookbackPut { k: f64, mode: LookbackMode },
}

impl Payoff {
    /// Whether the payoff depends on the terminal price alone.
    ///
    /// Control variates against the terminal stock are only applied to
    /// these; path-dependent payoffs ignore the flag.
    pub fn is_european_style(&self) -> bool {
        matches!(
            self,
            Payoff::EuropeanCall { .. } | Payoff::EuropeanPut { .. }
        )
    }

    /// Calculate payoff value from a simulated asset price path
    ///
    /// # Parameters
    /// - `path`: Complete asset price path [S_0, S_1, ..., S_T]
    ///
    /// # Returns
    /// Non-negative payoff value. An empty path yields 0.0.
    pub fn calculate(&self, path: &[f64]) -> f64 {
        let terminal = match path.last() {
            Some(&s) => s,
            None => return 0.0,
        };

        match self {
            // European Call: max(S_T - K, 0)
            Payoff::EuropeanCall { k } => (terminal - k).max(0.0),

            // European Put: max(K - S_T, 0)
            Payoff::EuropeanPut { k } => (k - terminal).max(0.0),

            // Asian: max(±(Ā - K), 0) where Ā averages n_obs equally spaced
            // observations ending at T (the spot at index 0 is not observed)
            Payoff::AsianArithmeticCall { k, n_obs } => {
                (discrete_average(path, *n_obs) - k).max(0.0)
            }
            Payoff::AsianArithmeticPut { k, n_obs } => {
                (k - discrete_average(path, *n_obs)).max(0.0)
            }

            // Barrier: knock condition monitored at every path point,
            // including the spot; inactive contracts pay the rebate
            Payoff::BarrierCall {
                k,
                h,
                style,
                rebate,
            } => {
                let touched = match style {
                    BarrierStyle::UpOut | BarrierStyle::UpIn => {
                        path.iter().any(|&price| price >= *h)
                    }
                    BarrierStyle::DownOut | BarrierStyle::DownIn => {
                        path.iter().any(|&price| price <= *h)
                    }
                };
                let alive = match style {
                    BarrierStyle::UpOut | BarrierStyle::DownOut => !touched,
                    BarrierStyle::UpIn | BarrierStyle::DownIn => touched,
                };
                if alive {
                    (terminal - k).max(0.0)
                } else {
                    *rebate
                }
            }

            // Lookback call: running maximum against the strike (fixed) or
            // terminal against the running minimum (floating, always ≥ 0)
            Payoff::LookbackCall { k, mode } => match mode {
                LookbackMode::Fixed => (path_max(path) - k).max(0.0),
                LookbackMode::Floating => terminal - path_min(path),
            },

            // Lookback put symmetrically
            Payoff::LookbackPut { k, mode } => match mode {
                LookbackMode::Fixed => (k - path_min(path)).max(0.0),
                LookbackMode::Floating => path_max(path) - terminal,
            },
        }
    }
}

/// Arithmetic average of the last n_obs observations when the grid is a
/// multiple of the observation count, else of every point past the spot.
fn discrete_average(path: &[f64], n_obs: usize) -> f64 {
    let steps = path.len() - 1;
    if n_obs > 0 && steps >= n_obs && steps % n_obs == 0 {
        let stride = steps / n_obs;
        let sum: f64 = (1..=n_obs).map(|k| path[k * stride]).sum();
        sum / n_obs as f64
    } else {
        let sum: f64 = path[1..].iter().sum();
        sum / steps.max(1) as f64
    }
}

fn path_max(path: &[f64]) -> f64 {
    path.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
}

fn path_min(path: &[f64]) -> f64 {
    path.iter().cloned().fold(f64::INFINITY, f64::min)
}
