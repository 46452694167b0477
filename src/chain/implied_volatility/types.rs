//! Types for implied volatility calculation.

use serde::{Deserialize, Serialize};

/// Side of an option contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionSide {
    /// Call option (right to buy the underlying at strike price).
    Call,
    /// Put option (right to sell the underlying at strike price).
    Put,
}

impl OptionSide {
    /// Returns the side whose implied volatility is reported for `strike`.
    ///
    /// Strikes at or above the forward report the call, strikes below it
    /// report the put, so the reported leg is always the out-of-the-money one.
    #[must_use]
    pub fn active_for(strike: f64, forward: f64) -> Self {
        if strike >= forward {
            OptionSide::Call
        } else {
            OptionSide::Put
        }
    }
}

/// How the forward used for pricing is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForwardAnchor {
    /// Use the reference (near-month future) price as the forward.
    #[default]
    Reference,
    /// Use the put-call parity forward implied by the ATM straddle:
    /// `atm_strike + atm_call - atm_put`.
    SyntheticFuture,
}

impl ForwardAnchor {
    /// Resolves the pricing forward for this anchor.
    ///
    /// Falls back to the reference price when the synthetic forward is not
    /// strictly positive.
    #[must_use]
    pub fn forward(&self, reference_price: f64, straddle: &AtmStraddle) -> f64 {
        match self {
            ForwardAnchor::Reference => reference_price,
            ForwardAnchor::SyntheticFuture => {
                let synthetic = straddle.strike + straddle.call_premium - straddle.put_premium;
                if synthetic.is_finite() && synthetic > 0.0 {
                    synthetic
                } else {
                    reference_price
                }
            }
        }
    }
}

/// Call and put premiums at the at-the-money strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmStraddle {
    /// The ATM strike.
    pub strike: f64,
    /// Last traded call premium at the ATM strike (0 when missing).
    pub call_premium: f64,
    /// Last traded put premium at the ATM strike (0 when missing).
    pub put_premium: f64,
}

impl AtmStraddle {
    /// Creates a new straddle quote.
    #[must_use]
    pub fn new(strike: f64, call_premium: f64, put_premium: f64) -> Self {
        Self {
            strike,
            call_premium,
            put_premium,
        }
    }

    /// Combined call + put premium.
    #[must_use]
    pub fn premium(&self) -> f64 {
        self.call_premium + self.put_premium
    }

    /// Replaces any non-positive leg with `floor` so the straddle can anchor
    /// a solve.
    #[must_use]
    pub fn floored(&self, floor: f64) -> Self {
        let leg = |premium: f64| {
            if premium.is_finite() && premium > 0.0 {
                premium
            } else {
                floor
            }
        };
        Self {
            strike: self.strike,
            call_premium: leg(self.call_premium),
            put_premium: leg(self.put_premium),
        }
    }
}

/// Black-76 contract parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Black76Params {
    /// Forward price of the underlying in price units.
    pub forward: f64,
    /// Option strike price in price units.
    pub strike: f64,
    /// Time to expiration in years (e.g., 7 days = 7.0 / 365.0).
    pub time_to_expiry: f64,
    /// Continuously compounded discount rate (annualized).
    pub rate: f64,
    /// Option side (Call or Put).
    pub side: OptionSide,
}

impl Black76Params {
    /// Creates new Black-76 parameters.
    #[must_use]
    pub fn new(forward: f64, strike: f64, time_to_expiry: f64, rate: f64, side: OptionSide) -> Self {
        Self {
            forward,
            strike,
            time_to_expiry,
            rate,
            side,
        }
    }

    /// Creates undiscounted parameters for a call option.
    #[must_use]
    pub fn call(forward: f64, strike: f64, time_to_expiry: f64) -> Self {
        Self::new(forward, strike, time_to_expiry, 0.0, OptionSide::Call)
    }

    /// Creates undiscounted parameters for a put option.
    #[must_use]
    pub fn put(forward: f64, strike: f64, time_to_expiry: f64) -> Self {
        Self::new(forward, strike, time_to_expiry, 0.0, OptionSide::Put)
    }

    /// Intrinsic value measured against the forward.
    ///
    /// For calls: max(0, forward - strike)
    /// For puts: max(0, strike - forward)
    #[must_use]
    pub fn intrinsic_value(&self) -> f64 {
        intrinsic_value(self.forward, self.strike, self.side)
    }

    /// Returns true if the option is in-the-money against the forward.
    #[must_use]
    pub fn is_itm(&self) -> bool {
        self.intrinsic_value() > 0.0
    }
}

/// Intrinsic value of `side` at `strike` against `forward`.
#[must_use]
pub fn intrinsic_value(forward: f64, strike: f64, side: OptionSide) -> f64 {
    match side {
        OptionSide::Call => (forward - strike).max(0.0),
        OptionSide::Put => (strike - forward).max(0.0),
    }
}

/// A single-leg implied volatility solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IVRequest {
    /// Pricing forward.
    pub forward: f64,
    /// Strike being solved.
    pub strike: f64,
    /// Years from evaluation to expiry.
    pub time_to_expiry: f64,
    /// ATM straddle anchoring the initial guess. `None` falls back to the
    /// configured default guess.
    pub straddle: Option<AtmStraddle>,
    /// Quoted premium of the leg, before flooring.
    pub quoted_premium: f64,
    /// Which leg the premium belongs to.
    pub side: OptionSide,
}

impl IVRequest {
    /// Black-76 parameters for this request at the given discount rate.
    #[must_use]
    pub fn params(&self, rate: f64) -> Black76Params {
        Black76Params::new(
            self.forward,
            self.strike,
            self.time_to_expiry,
            rate,
            self.side,
        )
    }
}

/// Result of a successful implied volatility solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IVResult {
    /// Solved implied volatility as a fraction (e.g., 0.25 = 25%).
    pub iv: f64,
    /// Premium actually fed to the solver, after flooring.
    pub price_used: f64,
    /// Initial guess the solver started from.
    pub initial_guess: f64,
    /// Number of solver iterations to converge.
    pub iterations: u32,
}

impl IVResult {
    /// Creates a new IV result.
    #[must_use]
    pub fn new(iv: f64, price_used: f64, initial_guess: f64, iterations: u32) -> Self {
        Self {
            iv,
            price_used,
            initial_guess,
            iterations,
        }
    }

    /// Returns the IV as an annualized percentage rounded to 2 decimals
    /// (e.g., 25.0 for 25%).
    #[must_use]
    pub fn iv_percent(&self) -> f64 {
        round_to_cents(self.iv * 100.0)
    }
}

/// Rounds to 2 decimal places.
#[must_use]
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
