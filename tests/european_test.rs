// tests/european_test.rs
use mc_options::analytics::bs_analytic;
use mc_options::Context;

fn fresh_ctx() -> Context {
    let mut ctx = Context::new();
    ctx.set_seed(42);
    ctx
}

#[test]
fn test_european_call_atm() {
    let mut ctx = fresh_ctx();

    // ATM option: S=K=100, Black-Scholes reference ≈ 10.4506
    let price = ctx
        .european_call(100.0, 100.0, 0.05, 0.2, 1.0)
        .expect("valid parameters");

    assert!(
        7.0 < price && price < 11.0,
        "ATM call price {} outside expected band",
        price
    );
}

#[test]
fn test_european_put_atm() {
    let mut ctx = fresh_ctx();

    // Black-Scholes reference ≈ 5.5735
    let price = ctx
        .european_put(100.0, 100.0, 0.05, 0.2, 1.0)
        .expect("valid parameters");

    assert!(
        3.0 < price && price < 7.0,
        "ATM put price {} outside expected band",
        price
    );
}

#[test]
fn test_european_call_itm() {
    let mut ctx = fresh_ctx();

    // Deep ITM: S=120, K=100, worth at least intrinsic
    let price = ctx
        .european_call(120.0, 100.0, 0.05, 0.2, 1.0)
        .expect("valid parameters");

    assert!(price > 20.0, "deep ITM call {} below intrinsic", price);
}

#[test]
fn test_european_put_itm() {
    let mut ctx = fresh_ctx();

    // Deep ITM: S=80, K=100, Black-Scholes reference ≈ 16.99
    let price = ctx
        .european_put(80.0, 100.0, 0.05, 0.2, 1.0)
        .expect("valid parameters");

    assert!(
        15.0 < price && price < 19.0,
        "deep ITM put price {} outside expected band",
        price
    );
}

#[test]
fn test_european_call_otm() {
    let mut ctx = fresh_ctx();

    // OTM: S=80, K=100, small but positive
    let price = ctx
        .european_call(80.0, 100.0, 0.05, 0.2, 1.0)
        .expect("valid parameters");

    assert!(
        0.0 < price && price < 5.0,
        "OTM call price {} outside expected band",
        price
    );
}

#[test]
fn test_put_call_parity() {
    let mut ctx = fresh_ctx();
    ctx.set_num_simulations(500_000);
    ctx.set_control_variates(true);

    let (s, k, r, sigma, t) = (100.0, 100.0, 0.05, 0.2, 1.0);

    let call = ctx.european_call(s, k, r, sigma, t).expect("valid parameters");
    let put = ctx.european_put(s, k, r, sigma, t).expect("valid parameters");

    let lhs = call - put;
    let rhs = s - k * (-r * t).exp();

    println!("C - P = {:.4}, S - K*e^(-rT) = {:.4}", lhs, rhs);
    assert!(
        (lhs - rhs).abs() / rhs.abs() < 0.01,
        "put-call parity violated: {} vs {}",
        lhs,
        rhs
    );
}

#[test]
fn test_arbitrage_lower_bounds() {
    let mut ctx = fresh_ctx();
    ctx.set_num_simulations(200_000);
    ctx.set_control_variates(true);

    let (r, sigma, t) = (0.05, 0.2, 1.0);
    let k = 100.0;

    for &s in &[80.0, 100.0, 120.0] {
        let call = ctx.european_call(s, k, r, sigma, t).expect("valid parameters");
        let put = ctx.european_put(s, k, r, sigma, t).expect("valid parameters");

        let call_floor = (s - k * (-r * t).exp()).max(0.0);
        let put_floor = (k * (-r * t).exp() - s).max(0.0);

        // A touch of slack for Monte Carlo noise
        assert!(
            call >= call_floor - 0.05,
            "call {} below arbitrage floor {} at S={}",
            call,
            call_floor,
            s
        );
        assert!(
            put >= put_floor - 0.05,
            "put {} below arbitrage floor {} at S={}",
            put,
            put_floor,
            s
        );
    }
}

#[test]
fn test_prices_are_non_negative() {
    let mut ctx = fresh_ctx();
    ctx.set_num_simulations(20_000);

    // Far OTM in both directions
    let call = ctx
        .european_call(50.0, 150.0, 0.05, 0.2, 0.5)
        .expect("valid parameters");
    let put = ctx
        .european_put(150.0, 50.0, 0.05, 0.2, 0.5)
        .expect("valid parameters");

    assert!(call >= 0.0);
    assert!(put >= 0.0);
}

#[test]
fn test_same_seed_reproduces_price_exactly() {
    let mut ctx1 = Context::new();
    ctx1.set_seed(42);
    let mut ctx2 = Context::new();
    ctx2.set_seed(42);

    let p1 = ctx1
        .european_call(100.0, 100.0, 0.05, 0.2, 1.0)
        .expect("valid parameters");
    let p2 = ctx2
        .european_call(100.0, 100.0, 0.05, 0.2, 1.0)
        .expect("valid parameters");

    assert_eq!(
        p1.to_bits(),
        p2.to_bits(),
        "identical seed and configuration must reproduce the price bit-for-bit"
    );
}

#[test]
fn test_sequential_calls_advance_the_rng_stream() {
    let mut ctx = fresh_ctx();
    ctx.set_num_simulations(10_000);

    let p1 = ctx
        .european_call(100.0, 100.0, 0.05, 0.2, 1.0)
        .expect("valid parameters");
    let p2 = ctx
        .european_call(100.0, 100.0, 0.05, 0.2, 1.0)
        .expect("valid parameters");

    assert_ne!(
        p1.to_bits(),
        p2.to_bits(),
        "sequential calls must consume fresh randomness"
    );

    // Re-seeding rewinds the session
    ctx.set_seed(42);
    let p3 = ctx
        .european_call(100.0, 100.0, 0.05, 0.2, 1.0)
        .expect("valid parameters");
    assert_eq!(p1.to_bits(), p3.to_bits());
}

#[test]
fn test_mc_tracks_black_scholes_with_cv() {
    let mut ctx = fresh_ctx();
    ctx.set_num_simulations(100_000);
    ctx.set_control_variates(true);

    let (s, k, r, sigma, t) = (100.0, 100.0, 0.05, 0.2, 1.0);
    let mc = ctx.european_call(s, k, r, sigma, t).expect("valid parameters");
    let reference = bs_analytic::bs_call_price(s, k, r, sigma, t);

    println!("MC (CV): {:.4}, Black-Scholes: {:.4}", mc, reference);
    assert!(
        (mc - reference).abs() / reference < 0.02,
        "MC with control variates {} too far from Black-Scholes {}",
        mc,
        reference
    );
}
