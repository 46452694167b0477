//! Pipeline configuration.

use super::error::ChainError;
use super::implied_volatility::{ForwardAnchor, SolverConfig};
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Settings for strike selection, premium policy and expiry derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Strike increment; only multiples enter the ladder (default: 100).
    pub strike_step: f64,
    /// Strikes kept either side of the center (default: 10).
    pub half_width: usize,
    /// ε of the premium floor `max(intrinsic, ε) + ε` (default: 0.01).
    pub price_floor_epsilon: f64,
    /// Stand-in for a zero ATM premium when anchoring (default: 1.0).
    pub atm_premium_floor: f64,
    /// Forward used for pricing and side selection.
    pub anchor: ForwardAnchor,
    /// Root finder settings.
    pub solver: SolverConfig,
    /// Settlement time of day for expiries (default: 15:30).
    pub expiry_close_time: NaiveTime,
    /// Weekday of the weekly expiry (default: Tuesday).
    pub weekly_expiry_weekday: Weekday,
    /// Local hour from which the same-day expiry rolls to next week
    /// (default: 16).
    pub expiry_rollover_hour: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            strike_step: 100.0,
            half_width: 10,
            price_floor_epsilon: 0.01,
            atm_premium_floor: 1.0,
            anchor: ForwardAnchor::default(),
            solver: SolverConfig::default(),
            expiry_close_time: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default(),
            weekly_expiry_weekday: Weekday::Tue,
            expiry_rollover_hour: 16,
        }
    }
}

impl ChainConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the strike increment.
    #[must_use]
    pub fn with_strike_step(mut self, strike_step: f64) -> Self {
        self.strike_step = strike_step;
        self
    }

    /// Sets the number of strikes either side of the center.
    #[must_use]
    pub fn with_half_width(mut self, half_width: usize) -> Self {
        self.half_width = half_width;
        self
    }

    /// Sets ε of the premium floor.
    #[must_use]
    pub fn with_price_floor_epsilon(mut self, epsilon: f64) -> Self {
        self.price_floor_epsilon = epsilon;
        self
    }

    /// Sets the forward anchor.
    #[must_use]
    pub fn with_anchor(mut self, anchor: ForwardAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Sets the solver configuration.
    #[must_use]
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Parses and validates a JSON configuration. Missing keys take their
    /// defaults.
    pub fn from_json(data: &str) -> Result<Self, ChainError> {
        let config: Self =
            serde_json::from_str(data).map_err(|error| ChainError::DeserializationError {
                message: error.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every setting is in range.
    pub fn validate(&self) -> Result<(), ChainError> {
        if !(self.strike_step.is_finite() && self.strike_step > 0.0) {
            return Err(ChainError::InvalidConfig {
                message: format!("strike_step must be positive, got {}", self.strike_step),
            });
        }
        if !(self.price_floor_epsilon.is_finite() && self.price_floor_epsilon >= 0.0) {
            return Err(ChainError::InvalidConfig {
                message: format!(
                    "price_floor_epsilon must be non-negative, got {}",
                    self.price_floor_epsilon
                ),
            });
        }
        if !(self.atm_premium_floor.is_finite() && self.atm_premium_floor > 0.0) {
            return Err(ChainError::InvalidConfig {
                message: format!(
                    "atm_premium_floor must be positive, got {}",
                    self.atm_premium_floor
                ),
            });
        }
        if self.expiry_rollover_hour > 24 {
            return Err(ChainError::InvalidConfig {
                message: format!(
                    "expiry_rollover_hour must be at most 24, got {}",
                    self.expiry_rollover_hour
                ),
            });
        }
        self.solver
            .validate()
            .map_err(|error| ChainError::InvalidConfig {
                message: error.to_string(),
            })
    }
}
