//! Safeguarded Newton-Raphson solver for implied volatility.
//!
//! Newton steps are taken while they stay inside a shrinking volatility
//! bracket; any step that would leave it (or a step with vanishing vega) is
//! replaced by a bisection of the bracket. The bracket starts at the
//! configured `[min_iv, max_iv]` domain and must contain a sign change of
//! `model_price - premium`, otherwise no solution exists.

use super::black76::Black76;
use super::error::IVError;
use super::types::{AtmStraddle, Black76Params, IVRequest, IVResult, intrinsic_value};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Configuration for the implied volatility solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum iterations before giving up.
    pub max_iterations: u32,
    /// Convergence tolerance for price difference, in price units.
    pub tolerance: f64,
    /// Initial IV guess when no ATM straddle is available (0.20 = 20%).
    pub default_initial_guess: f64,
    /// Minimum IV bound (0.0001 = 0.01%).
    pub min_iv: f64,
    /// Maximum IV bound (5.0 = 500%).
    pub max_iv: f64,
    /// Minimum vega threshold to avoid division by near-zero.
    pub min_vega: f64,
    /// Continuously compounded discount rate applied to model prices.
    pub rate: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            default_initial_guess: 0.20,
            min_iv: 0.0001,
            max_iv: 5.0,
            min_vega: 1e-10,
            rate: 0.0,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the fallback initial IV guess.
    #[must_use]
    pub fn with_initial_guess(mut self, initial_guess: f64) -> Self {
        self.default_initial_guess = initial_guess;
        self
    }

    /// Sets the IV bounds.
    #[must_use]
    pub fn with_bounds(mut self, min_iv: f64, max_iv: f64) -> Self {
        self.min_iv = min_iv;
        self.max_iv = max_iv;
        self
    }

    /// Sets the discount rate.
    #[must_use]
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Checks that the configuration describes a usable search domain.
    pub fn validate(&self) -> Result<(), IVError> {
        if !(self.min_iv > 0.0 && self.min_iv < self.max_iv && self.max_iv.is_finite()) {
            return Err(IVError::InvalidParams {
                message: format!(
                    "volatility bounds must satisfy 0 < min < max, got [{}, {}]",
                    self.min_iv, self.max_iv
                ),
            });
        }
        if self.max_iterations == 0 {
            return Err(IVError::InvalidParams {
                message: "max_iterations must be at least 1".to_string(),
            });
        }
        if !(self.tolerance > 0.0) {
            return Err(IVError::InvalidParams {
                message: format!("tolerance must be positive, got {}", self.tolerance),
            });
        }
        Ok(())
    }
}

/// Validates input parameters for IV calculation.
fn validate_params(params: &Black76Params) -> Result<(), IVError> {
    if !(params.forward.is_finite() && params.forward > 0.0) {
        return Err(IVError::InvalidParams {
            message: format!("forward price must be positive, got {}", params.forward),
        });
    }

    if !(params.strike.is_finite() && params.strike > 0.0) {
        return Err(IVError::InvalidParams {
            message: format!("strike price must be positive, got {}", params.strike),
        });
    }

    if !(params.time_to_expiry > 0.0) {
        return Err(IVError::ExpiryNotInFuture {
            time_to_expiry: params.time_to_expiry,
        });
    }

    Ok(())
}

/// Raises a quoted premium to the no-arbitrage floor.
///
/// The result is at least `max(intrinsic, epsilon) + epsilon`. Flooring an
/// already floored premium returns it unchanged.
#[must_use]
pub fn floor_premium(quoted: f64, intrinsic: f64, epsilon: f64) -> f64 {
    let floor = intrinsic.max(epsilon) + epsilon;
    if quoted.is_finite() {
        quoted.max(floor)
    } else {
        floor
    }
}

/// Rough volatility implied by an ATM straddle.
///
/// Brenner-Subrahmanyam: an ATM straddle is worth about `0.8 · F · σ · √T`.
/// Returns `None` when the straddle or the inputs cannot support an estimate.
#[must_use]
pub fn straddle_initial_guess(straddle: &AtmStraddle, forward: f64, time_to_expiry: f64) -> Option<f64> {
    let premium = straddle.premium();
    if !(premium > 0.0 && forward > 0.0 && time_to_expiry > 0.0) {
        return None;
    }

    let estimate = premium / (0.8 * forward * time_to_expiry.sqrt());
    estimate.is_finite().then(|| estimate.clamp(0.05, 2.0))
}

/// Root search shared by single-leg and straddle solves.
///
/// `price_and_vega` must be non-decreasing in volatility.
fn bracketed_newton<F>(
    target: f64,
    price_and_vega: F,
    initial_guess: f64,
    config: &SolverConfig,
) -> Result<(f64, u32), IVError>
where
    F: Fn(f64) -> (f64, f64),
{
    let mut low = config.min_iv;
    let mut high = config.max_iv;

    let (min_price, _) = price_and_vega(low);
    let (max_price, _) = price_and_vega(high);
    if target < min_price - config.tolerance || target > max_price + config.tolerance {
        return Err(IVError::NoBracket {
            premium: target,
            min_price,
            max_price,
        });
    }

    let mut iv = initial_guess.clamp(low, high);

    for iteration in 0..config.max_iterations {
        let (price, vega) = price_and_vega(iv);
        let diff = price - target;
        trace!(iteration, iv, diff, vega, "iv iteration");

        if diff.abs() < config.tolerance {
            return Ok((iv, iteration + 1));
        }

        if diff > 0.0 {
            high = iv;
        } else {
            low = iv;
        }

        if high - low < config.tolerance {
            return Ok((0.5 * (low + high), iteration + 1));
        }

        let newton = if vega > config.min_vega {
            iv - diff / vega
        } else {
            f64::NAN
        };

        iv = if newton.is_finite() && newton > low && newton < high {
            newton
        } else {
            0.5 * (low + high)
        };
    }

    Err(IVError::ConvergenceFailure {
        iterations: config.max_iterations,
        last_iv: iv,
    })
}

/// Solves for the volatility at which the Black-76 price equals `market_price`.
///
/// # Arguments
/// - `params`: Contract parameters (forward, strike, time, rate, side)
/// - `market_price`: Premium to match, already floored
/// - `initial_guess`: Starting volatility
/// - `config`: Solver configuration
///
/// # Returns
/// - `Ok((iv, iterations))`: Converged IV and number of iterations
/// - `Err(IVError)`: If inputs are degenerate or no root exists in bounds
pub fn solve_iv(
    params: &Black76Params,
    market_price: f64,
    initial_guess: f64,
    config: &SolverConfig,
) -> Result<(f64, u32), IVError> {
    validate_params(params)?;

    if !(market_price > 0.0) {
        return Err(IVError::NonPositivePremium {
            premium: market_price,
        });
    }

    bracketed_newton(
        market_price,
        |vol| (Black76::price(params, vol), Black76::vega(params, vol)),
        initial_guess,
        config,
    )
}

/// Solves for IV using plain bisection over the configured bounds.
///
/// Slower than [`solve_iv`] but makes no use of vega.
pub fn solve_iv_bisection(
    params: &Black76Params,
    market_price: f64,
    config: &SolverConfig,
) -> Result<(f64, u32), IVError> {
    validate_params(params)?;

    if !(market_price > 0.0) {
        return Err(IVError::NonPositivePremium {
            premium: market_price,
        });
    }

    let mut low = config.min_iv;
    let mut high = config.max_iv;

    let min_price = Black76::price(params, low);
    let max_price = Black76::price(params, high);
    if market_price < min_price - config.tolerance || market_price > max_price + config.tolerance
    {
        return Err(IVError::NoBracket {
            premium: market_price,
            min_price,
            max_price,
        });
    }

    for iteration in 0..config.max_iterations {
        let mid = 0.5 * (low + high);
        let diff = Black76::price(params, mid) - market_price;

        if diff.abs() < config.tolerance || (high - low) < config.tolerance {
            return Ok((mid, iteration + 1));
        }

        if diff > 0.0 {
            high = mid;
        } else {
            low = mid;
        }
    }

    Err(IVError::ConvergenceFailure {
        iterations: config.max_iterations,
        last_iv: 0.5 * (low + high),
    })
}

/// Volatility implied by the ATM straddle premium.
///
/// Inverts `call + put` at the ATM strike, which is the level every strike's
/// solve is anchored to.
pub fn straddle_implied_vol(
    straddle: &AtmStraddle,
    forward: f64,
    time_to_expiry: f64,
    config: &SolverConfig,
) -> Result<f64, IVError> {
    validate_params(&Black76Params::call(forward, straddle.strike, time_to_expiry))?;

    let premium = straddle.premium();
    if !(premium > 0.0) {
        return Err(IVError::NonPositivePremium { premium });
    }

    let guess = straddle_initial_guess(straddle, forward, time_to_expiry)
        .unwrap_or(config.default_initial_guess);
    let (iv, _) = bracketed_newton(
        premium,
        |vol| Black76::straddle(forward, straddle.strike, time_to_expiry, config.rate, vol),
        guess,
        config,
    )?;
    Ok(iv)
}

/// Full single-leg solve: floors the premium, seeds from the straddle and
/// rejects non-positive results.
///
/// # Example
/// ```
/// use optionchain_rs::prelude::*;
///
/// let request = IVRequest {
///     forward: 24050.0,
///     strike: 24200.0,
///     time_to_expiry: 5.0 / 365.0,
///     straddle: Some(AtmStraddle::new(24050.0, 160.0, 150.0)),
///     quoted_premium: 95.0,
///     side: OptionSide::Call,
/// };
/// let result = solve_implied_vol(&request, 0.01, &SolverConfig::default()).unwrap();
/// assert!(result.iv_percent() > 0.0);
/// ```
pub fn solve_implied_vol(
    request: &IVRequest,
    epsilon: f64,
    config: &SolverConfig,
) -> Result<IVResult, IVError> {
    let intrinsic = intrinsic_value(request.forward, request.strike, request.side);
    let price = floor_premium(request.quoted_premium, intrinsic, epsilon);
    if !(price > 0.0) {
        return Err(IVError::NonPositivePremium { premium: price });
    }

    let params = request.params(config.rate);
    validate_params(&params)?;

    let initial_guess = request
        .straddle
        .as_ref()
        .and_then(|straddle| {
            straddle_initial_guess(straddle, request.forward, request.time_to_expiry)
        })
        .unwrap_or(config.default_initial_guess);

    let (iv, iterations) = solve_iv(&params, price, initial_guess, config)?;
    let result = IVResult::new(iv, price, initial_guess, iterations);

    if !(iv > 0.0) || result.iv_percent() <= 0.0 {
        return Err(IVError::NonPositiveVolatility { volatility: iv });
    }

    trace!(
        strike = request.strike,
        side = ?request.side,
        price,
        iv,
        iterations,
        "solved implied volatility"
    );
    Ok(result)
}
