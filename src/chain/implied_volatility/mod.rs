//! Implied volatility calculation for option chain strikes.
//!
//! This module inverts the Black-76 forward pricing model to recover the
//! volatility implied by a quoted premium.
//!
//! # Overview
//!
//! Options on an index are quoted against a near-month future, so prices are
//! modelled off a forward `F` instead of spot. For each strike only the
//! out-of-the-money leg is solved: the call when `strike >= F`, the put
//! otherwise.
//!
//! # Premium floor
//!
//! A last traded price can be stale or below the no-arbitrage floor. Before
//! solving, the premium is raised to at least `max(intrinsic, ε) + ε`, which
//! always has a solution under the model.
//!
//! # Anchoring
//!
//! The ATM straddle (call + put at the strike nearest the forward) gives a
//! rough volatility level via `straddle ≈ 0.8 · F · σ · √T`. It seeds every
//! strike's solve, and its exact inversion is the ATM implied level.
//!
//! # Example
//!
//! ```
//! use optionchain_rs::prelude::*;
//!
//! let params = Black76Params::call(24000.0, 24200.0, 7.0 / 365.0);
//! let premium = Black76::price(&params, 0.15);
//!
//! let (iv, iterations) = solve_iv(&params, premium, 0.2, &SolverConfig::default()).unwrap();
//! assert!((iv - 0.15).abs() < 1e-4);
//! assert!(iterations <= 20);
//! ```

mod black76;
mod error;
mod solver;
mod types;

pub use black76::Black76;
pub use error::IVError;
pub use solver::{
    SolverConfig, floor_premium, solve_implied_vol, solve_iv, solve_iv_bisection,
    straddle_implied_vol, straddle_initial_guess,
};
pub use types::{
    AtmStraddle, Black76Params, ForwardAnchor, IVRequest, IVResult, OptionSide,
    intrinsic_value, round_to_cents,
};
