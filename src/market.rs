// src/market.rs
use crate::error::{validation::*, PricingResult};

/// Per-call market inputs shared by every pricing kernel.
///
/// Not persisted anywhere: kernels receive a borrowed copy and the rate is
/// continuously compounded.
#[derive(Debug, Clone, Copy)]
pub struct MarketParams {
    pub spot: f64,
    pub strike: f64,
    pub rate: f64,
    pub volatility: f64,
    pub maturity: f64,
}

impl MarketParams {
    pub fn new(spot: f64, strike: f64, rate: f64, volatility: f64, maturity: f64) -> Self {
        MarketParams {
            spot,
            strike,
            rate,
            volatility,
            maturity,
        }
    }

    /// Validate the admitted input domain
    pub fn validate(&self) -> PricingResult<()> {
        validate_non_negative("spot", self.spot)?;
        validate_non_negative("strike", self.strike)?;
        validate_finite("rate", self.rate)?;
        validate_positive("volatility", self.volatility)?;
        validate_positive("maturity", self.maturity)?;
        Ok(())
    }

    /// Discount factor from maturity back to today, e^(-rT)
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.maturity).exp()
    }

    /// Risk-neutral expectation of the terminal stock price, E[S_T] = S·e^(rT)
    pub fn forward(&self) -> f64 {
        self.spot * (self.rate * self.maturity).exp()
    }
}
