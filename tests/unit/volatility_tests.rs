use optionchain_rs::prelude::*;

const WEEK: f64 = 7.0 / 365.0;

#[test]
fn test_round_trip_across_strikes() {
    let config = SolverConfig::default();
    let forward = 24_000.0;

    for strike in [23_400.0, 23_800.0, 24_000.0, 24_200.0, 24_600.0] {
        for vol in [0.08, 0.15, 0.45] {
            let side = OptionSide::active_for(strike, forward);
            let params = Black76Params::new(forward, strike, WEEK, 0.0, side);
            let premium = Black76::price(&params, vol);
            if premium < 0.05 {
                continue;
            }

            let (iv, _) = solve_iv(&params, premium, 0.2, &config).unwrap();
            assert!(
                (iv - vol).abs() / vol < 1e-4,
                "strike {strike} vol {vol} solved {iv}"
            );
        }
    }
}

#[test]
fn test_price_monotonic_in_volatility() {
    let params = Black76Params::put(24_000.0, 23_700.0, WEEK);
    let mut previous = 0.0;
    for step in 1..=40 {
        let price = Black76::price(&params, step as f64 * 0.025);
        assert!(price > previous);
        previous = price;
    }
}

#[test]
fn test_put_call_parity() {
    for strike in [23_000.0, 24_000.0, 25_000.0] {
        let call = Black76::price(&Black76Params::call(24_000.0, strike, WEEK), 0.2);
        let put = Black76::price(&Black76Params::put(24_000.0, strike, WEEK), 0.2);
        assert!((call - put - (24_000.0 - strike)).abs() < 1e-6);
    }
}

#[test]
fn test_floor_is_idempotent() {
    for (quoted, intrinsic) in [(0.0, 0.0), (5.0, 12.0), (f64::NAN, 3.0), (40.0, 0.0)] {
        let once = floor_premium(quoted, intrinsic, 0.01);
        assert_eq!(floor_premium(once, intrinsic, 0.01), once);
        assert!(once >= intrinsic.max(0.01) + 0.01);
    }
}

#[test]
fn test_degenerate_zero_premium_reports_non_positive() {
    let request = IVRequest {
        forward: 24_000.0,
        strike: 25_000.0,
        time_to_expiry: WEEK,
        straddle: Some(AtmStraddle::new(24_000.0, 180.0, 170.0)),
        quoted_premium: 0.0,
        side: OptionSide::Call,
    };
    assert!(matches!(
        solve_implied_vol(&request, 0.0, &SolverConfig::default()),
        Err(IVError::NonPositivePremium { .. })
    ));
}

#[test]
fn test_expired_option_rejected() {
    let request = IVRequest {
        forward: 24_000.0,
        strike: 24_100.0,
        time_to_expiry: -0.001,
        straddle: None,
        quoted_premium: 20.0,
        side: OptionSide::Call,
    };
    assert!(matches!(
        solve_implied_vol(&request, 0.01, &SolverConfig::default()),
        Err(IVError::ExpiryNotInFuture { .. })
    ));
}

#[test]
fn test_straddle_inversion_matches_leg() {
    let config = SolverConfig::default();
    let (straddle_price, _) = Black76::straddle(24_000.0, 24_000.0, WEEK, 0.0, 0.13);
    let half = straddle_price / 2.0;
    let straddle = AtmStraddle::new(24_000.0, half, half);

    let atm_iv = straddle_implied_vol(&straddle, 24_000.0, WEEK, &config).unwrap();
    let leg = solve_iv(&Black76Params::call(24_000.0, 24_000.0, WEEK), half, 0.2, &config)
        .unwrap()
        .0;
    assert!((atm_iv - leg).abs() < 1e-5);
    assert!((atm_iv - 0.13).abs() < 1e-5);
}

#[test]
fn test_bisection_agrees_with_newton() {
    let config = SolverConfig::default();
    let params = Black76Params::call(24_000.0, 24_300.0, WEEK);
    let premium = Black76::price(&params, 0.22);

    let (newton, newton_iterations) = solve_iv(&params, premium, 0.2, &config).unwrap();
    let (bisection, bisection_iterations) = solve_iv_bisection(&params, premium, &config).unwrap();
    assert!((newton - bisection).abs() < 1e-4);
    assert!(newton_iterations < bisection_iterations);
}
