// src/context.rs
//! Pricing Context and Flat Operation Surface
//!
//! The `Context` is the mutable configuration record a caller holds for a
//! pricing session: seed, simulation count, variance-reduction switches,
//! and lattice resolution. Every Monte Carlo pricing call consumes one RNG
//! *stream* (a counter mixed with the seed), so sequential calls see
//! fresh randomness while `(seed, configuration, arguments)` still pins
//! the price bit-for-bit. Re-seeding resets the stream counter and
//! replays the session.
//!
//! A `Context` holds mutable RNG bookkeeping and is not meant to be shared
//! across workers; hold one per worker to parallelize across products.
//! Within one call the path loop is parallel but the price is independent
//! of the thread count.

use crate::error::{validation::*, PricingResult};
use crate::lattice::crr::{crr_price, ExercisePolicy};
use crate::market::MarketParams;
use crate::mc::engine::{mc_price, McConfig, VrFlags};
use crate::mc::lsm::{lsm_price, LsmConfig};
use crate::mc::payoffs::{BarrierStyle, LookbackMode, OptionKind, Payoff};
use crate::rng;

const DEFAULT_SEED: u64 = 12345;
const DEFAULT_SIMULATIONS: usize = 100_000;
/// One step per trading day
const DEFAULT_MC_STEPS: usize = 252;
const DEFAULT_BINOMIAL_STEPS: usize = 100;
const DEFAULT_LSM_EXERCISE_DATES: usize = 50;

pub struct Context {
    seed: u64,
    stream: u64,
    num_simulations: usize,
    num_steps: usize,
    binomial_steps: usize,
    lsm_exercise_dates: usize,
    vr: VrFlags,
    is_drift_shift: f64,
}

impl Default for Context {
    fn default() -> Self {
        Context {
            seed: DEFAULT_SEED,
            stream: 0,
            num_simulations: DEFAULT_SIMULATIONS,
            num_steps: DEFAULT_MC_STEPS,
            binomial_steps: DEFAULT_BINOMIAL_STEPS,
            lsm_exercise_dates: DEFAULT_LSM_EXERCISE_DATES,
            vr: VrFlags::empty(),
            is_drift_shift: 0.0,
        }
    }
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    // --- configuration -----------------------------------------------------

    /// Set the seed and rewind the stream counter so the session replays
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.stream = 0;
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn set_num_simulations(&mut self, n: usize) {
        self.num_simulations = n;
    }

    pub fn num_simulations(&self) -> usize {
        self.num_simulations
    }

    pub fn set_num_steps(&mut self, steps: usize) {
        self.num_steps = steps;
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    pub fn set_binomial_steps(&mut self, steps: usize) {
        self.binomial_steps = steps;
    }

    pub fn binomial_steps(&self) -> usize {
        self.binomial_steps
    }

    pub fn set_lsm_exercise_dates(&mut self, n: usize) {
        self.lsm_exercise_dates = n;
    }

    pub fn lsm_exercise_dates(&self) -> usize {
        self.lsm_exercise_dates
    }

    pub fn set_antithetic(&mut self, enabled: bool) {
        self.vr.set(VrFlags::ANTITHETIC, enabled);
    }

    pub fn antithetic(&self) -> bool {
        self.vr.contains(VrFlags::ANTITHETIC)
    }

    pub fn set_control_variates(&mut self, enabled: bool) {
        self.vr.set(VrFlags::CONTROL_VARIATE, enabled);
    }

    pub fn control_variates(&self) -> bool {
        self.vr.contains(VrFlags::CONTROL_VARIATE)
    }

    pub fn set_stratified_sampling(&mut self, enabled: bool) {
        self.vr.set(VrFlags::STRATIFIED, enabled);
    }

    pub fn stratified_sampling(&self) -> bool {
        self.vr.contains(VrFlags::STRATIFIED)
    }

    pub fn set_importance_sampling(&mut self, enabled: bool, drift_shift: f64) {
        self.vr.set(VrFlags::IMPORTANCE_SAMPLING, enabled);
        self.is_drift_shift = drift_shift;
    }

    pub fn importance_sampling(&self) -> (bool, f64) {
        (
            self.vr.contains(VrFlags::IMPORTANCE_SAMPLING),
            self.is_drift_shift,
        )
    }

    pub fn vr_flags(&self) -> VrFlags {
        self.vr
    }

    fn next_stream_seed(&mut self) -> u64 {
        let stream_seed = rng::mix_stream(self.seed, self.stream);
        self.stream = self.stream.wrapping_add(1);
        stream_seed
    }

    fn price_mc(&mut self, market: MarketParams, payoff: Payoff, steps: usize) -> PricingResult<f64> {
        let cfg = McConfig {
            paths: self.num_simulations,
            steps,
            market,
            payoff,
            vr: self.vr,
            drift_shift: self.is_drift_shift,
            stream_seed: self.next_stream_seed(),
        };
        mc_price(&cfg)
    }

    fn price_lsm(
        &mut self,
        market: MarketParams,
        kind: OptionKind,
        dates: &[f64],
    ) -> PricingResult<f64> {
        let cfg = LsmConfig {
            paths: self.num_simulations,
            market,
            kind,
            dates,
            vr: self.vr,
            drift_shift: self.is_drift_shift,
            stream_seed: self.next_stream_seed(),
        };
        lsm_price(&cfg)
    }

    // --- European (Monte Carlo) --------------------------------------------

    pub fn european_call(
        &mut self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
    ) -> PricingResult<f64> {
        let market = MarketParams::new(spot, strike, rate, volatility, maturity);
        self.price_mc(market, Payoff::EuropeanCall { k: strike }, self.num_steps)
    }

    pub fn european_put(
        &mut self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
    ) -> PricingResult<f64> {
        let market = MarketParams::new(spot, strike, rate, volatility, maturity);
        self.price_mc(market, Payoff::EuropeanPut { k: strike }, self.num_steps)
    }

    // --- Asian -------------------------------------------------------------

    /// Arithmetic-average Asian call over `n_obs` equally spaced
    /// observations ending at maturity. The simulation grid is the
    /// observation grid.
    pub fn asian_arithmetic_call(
        &mut self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
        n_obs: usize,
    ) -> PricingResult<f64> {
        let market = MarketParams::new(spot, strike, rate, volatility, maturity);
        self.price_mc(
            market,
            Payoff::AsianArithmeticCall { k: strike, n_obs },
            n_obs.max(1),
        )
    }

    pub fn asian_arithmetic_put(
        &mut self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
        n_obs: usize,
    ) -> PricingResult<f64> {
        let market = MarketParams::new(spot, strike, rate, volatility, maturity);
        self.price_mc(
            market,
            Payoff::AsianArithmeticPut { k: strike, n_obs },
            n_obs.max(1),
        )
    }

    // --- Barrier -----------------------------------------------------------

    /// Barrier call monitored at every simulation step. A contract that
    /// ends inactive pays the rebate at maturity.
    #[allow(clippy::too_many_arguments)]
    pub fn barrier_call(
        &mut self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
        barrier: f64,
        style: BarrierStyle,
        rebate: f64,
    ) -> PricingResult<f64> {
        let market = MarketParams::new(spot, strike, rate, volatility, maturity);
        self.price_mc(
            market,
            Payoff::BarrierCall {
                k: strike,
                h: barrier,
                style,
                rebate,
            },
            self.num_steps,
        )
    }

    // --- Lookback ----------------------------------------------------------

    pub fn lookback_call(
        &mut self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
        mode: LookbackMode,
    ) -> PricingResult<f64> {
        let market = MarketParams::new(spot, strike, rate, volatility, maturity);
        self.price_mc(
            market,
            Payoff::LookbackCall { k: strike, mode },
            self.num_steps,
        )
    }

    pub fn lookback_put(
        &mut self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
        mode: LookbackMode,
    ) -> PricingResult<f64> {
        let market = MarketParams::new(spot, strike, rate, volatility, maturity);
        self.price_mc(
            market,
            Payoff::LookbackPut { k: strike, mode },
            self.num_steps,
        )
    }

    // --- American / Bermudan (Least-Squares Monte Carlo) --------------------

    pub fn american_call(
        &mut self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
        exercise_points: usize,
    ) -> PricingResult<f64> {
        self.lsm_american_call(spot, strike, rate, volatility, maturity, exercise_points)
    }

    pub fn american_put(
        &mut self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
        exercise_points: usize,
    ) -> PricingResult<f64> {
        self.lsm_american_put(spot, strike, rate, volatility, maturity, exercise_points)
    }

    pub fn lsm_american_call(
        &mut self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
        n_dates: usize,
    ) -> PricingResult<f64> {
        let market = MarketParams::new(spot, strike, rate, volatility, maturity);
        let dates = uniform_dates(maturity, n_dates);
        self.price_lsm(market, OptionKind::Call, &dates)
    }

    pub fn lsm_american_put(
        &mut self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
        n_dates: usize,
    ) -> PricingResult<f64> {
        let market = MarketParams::new(spot, strike, rate, volatility, maturity);
        let dates = uniform_dates(maturity, n_dates);
        self.price_lsm(market, OptionKind::Put, &dates)
    }

    pub fn lsm_american_call_default(
        &mut self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
    ) -> PricingResult<f64> {
        let n = self.lsm_exercise_dates;
        self.lsm_american_call(spot, strike, rate, volatility, maturity, n)
    }

    pub fn lsm_american_put_default(
        &mut self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
    ) -> PricingResult<f64> {
        let n = self.lsm_exercise_dates;
        self.lsm_american_put(spot, strike, rate, volatility, maturity, n)
    }

    /// Bermudan call exercisable at the supplied strictly increasing
    /// dates; the final date is the maturity.
    pub fn bermudan_call(
        &mut self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        exercise_dates: &[f64],
    ) -> PricingResult<f64> {
        validate_exercise_dates(exercise_dates)?;
        let maturity = *exercise_dates.last().unwrap_or(&0.0);
        let market = MarketParams::new(spot, strike, rate, volatility, maturity);
        self.price_lsm(market, OptionKind::Call, exercise_dates)
    }

    // --- Binomial lattice ---------------------------------------------------

    pub fn binomial_european_call(
        &self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
    ) -> PricingResult<f64> {
        self.binomial_european_call_steps(spot, strike, rate, volatility, maturity, self.binomial_steps)
    }

    pub fn binomial_european_put(
        &self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
    ) -> PricingResult<f64> {
        self.binomial_european_put_steps(spot, strike, rate, volatility, maturity, self.binomial_steps)
    }

    pub fn binomial_european_call_steps(
        &self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
        steps: usize,
    ) -> PricingResult<f64> {
        let market = MarketParams::new(spot, strike, rate, volatility, maturity);
        crr_price(&market, OptionKind::Call, ExercisePolicy::European, steps)
    }

    pub fn binomial_european_put_steps(
        &self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
        steps: usize,
    ) -> PricingResult<f64> {
        let market = MarketParams::new(spot, strike, rate, volatility, maturity);
        crr_price(&market, OptionKind::Put, ExercisePolicy::European, steps)
    }

    pub fn binomial_american_call(
        &self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
    ) -> PricingResult<f64> {
        self.binomial_american_call_steps(spot, strike, rate, volatility, maturity, self.binomial_steps)
    }

    pub fn binomial_american_put(
        &self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
    ) -> PricingResult<f64> {
        self.binomial_american_put_steps(spot, strike, rate, volatility, maturity, self.binomial_steps)
    }

    pub fn binomial_american_call_steps(
        &self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
        steps: usize,
    ) -> PricingResult<f64> {
        let market = MarketParams::new(spot, strike, rate, volatility, maturity);
        crr_price(&market, OptionKind::Call, ExercisePolicy::American, steps)
    }

    pub fn binomial_american_put_steps(
        &self,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        maturity: f64,
        steps: usize,
    ) -> PricingResult<f64> {
        let market = MarketParams::new(spot, strike, rate, volatility, maturity);
        crr_price(&market, OptionKind::Put, ExercisePolicy::American, steps)
    }
}

/// Uniform exercise grid `k·T/n` for `k = 1..=n`
fn uniform_dates(maturity: f64, n: usize) -> Vec<f64> {
    let n = n.max(1);
    (1..=n).map(|k| k as f64 * maturity / n as f64).collect()
}
