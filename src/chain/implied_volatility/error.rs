//! Error types for implied volatility calculation.

use std::fmt;

/// Reasons a single-leg implied volatility solve produced no solution.
///
/// Every variant is row-local: the caller leaves the IV cell blank and
/// carries on with the rest of the chain.
#[derive(Debug, Clone, PartialEq)]
pub enum IVError {
    /// Premium is not strictly positive after flooring.
    NonPositivePremium {
        /// Premium after flooring.
        premium: f64,
    },

    /// Expiry is not strictly after the evaluation instant.
    ExpiryNotInFuture {
        /// Time to expiry in years.
        time_to_expiry: f64,
    },

    /// Invalid input parameters for IV calculation.
    InvalidParams {
        /// Description of the invalid parameter.
        message: String,
    },

    /// Target premium is not attainable for any volatility in the domain.
    NoBracket {
        /// Premium being matched.
        premium: f64,
        /// Model price at the lower volatility bound.
        min_price: f64,
        /// Model price at the upper volatility bound.
        max_price: f64,
    },

    /// Solver did not converge within max iterations.
    ConvergenceFailure {
        /// Number of iterations attempted.
        iterations: u32,
        /// Last IV estimate before giving up.
        last_iv: f64,
    },

    /// Solved volatility is not strictly positive once expressed in percent.
    NonPositiveVolatility {
        /// Solved volatility as a fraction.
        volatility: f64,
    },
}

impl fmt::Display for IVError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IVError::NonPositivePremium { premium } => {
                write!(f, "premium {premium:.4} is not positive after flooring")
            }
            IVError::ExpiryNotInFuture { time_to_expiry } => {
                write!(
                    f,
                    "expiry is not in the future: time to expiry {time_to_expiry:.6} years"
                )
            }
            IVError::InvalidParams { message } => {
                write!(f, "invalid parameters: {message}")
            }
            IVError::NoBracket {
                premium,
                min_price,
                max_price,
            } => {
                write!(
                    f,
                    "premium {premium:.4} outside attainable range [{min_price:.4}, {max_price:.4}]"
                )
            }
            IVError::ConvergenceFailure {
                iterations,
                last_iv,
            } => {
                write!(
                    f,
                    "solver did not converge after {iterations} iterations, last IV: {last_iv:.4}"
                )
            }
            IVError::NonPositiveVolatility { volatility } => {
                write!(f, "solved volatility {volatility:.6} is not positive")
            }
        }
    }
}

impl std::error::Error for IVError {}
