//! # Option Chain Analytics
//!
//! Per-strike implied volatility for an index options chain, computed from a
//! single exchange snapshot and a reference (near-month future) price.
//!
//! ## Pipeline
//!
//! 1. **Session gate**: [`TradingCalendar`](chain::TradingCalendar) decides
//!    whether the exchange is open. A closed market ends the run with no
//!    rows and no data fetched.
//! 2. **Expiry**: the next weekly expiry is derived from the calendar,
//!    stepping back over holidays.
//! 3. **Strike window**: the reference price is rounded to the strike step
//!    and a window of strikes either side of the nearest listed strike is
//!    selected.
//! 4. **ATM straddle**: the window strike closest to the reference price
//!    provides the call and put premiums that seed every solve.
//! 5. **Implied volatility**: for each strike the out-of-the-money leg is
//!    inverted under Black-76 with a bracketed Newton-Raphson solver.
//! 6. **Table**: rows in ascending strike order, an underlying marker where
//!    strikes cross the underlying value, and a trailing timestamp row,
//!    wrapped in a checksummed package.
//!
//! ## Example
//!
//! ```
//! use optionchain_rs::prelude::*;
//!
//! struct Fixed(ChainSnapshot);
//!
//! impl ChainSource for Fixed {
//!     fn fetch_chain(&self, _expiry_label: &str) -> Result<ChainSnapshot, ChainError> {
//!         Ok(self.0.clone())
//!     }
//!     fn fetch_reference_price(&self) -> Result<f64, ChainError> {
//!         Ok(24_530.0)
//!     }
//! }
//!
//! let snapshot = ChainSnapshot::from_json(r#"{"records": {"underlyingValue": 24512.4, "data": [
//!     {"strikePrice": 24400, "CE": {"lastPrice": 210.5}, "PE": {"lastPrice": 82.0}},
//!     {"strikePrice": 24500, "CE": {"lastPrice": 140.0}, "PE": {"lastPrice": 112.3}},
//!     {"strikePrice": 24600, "CE": {"lastPrice": 88.6}, "PE": {"lastPrice": 161.0}}
//! ]}}"#).unwrap();
//!
//! let pipeline = ChainPipeline::nse().unwrap();
//! // Monday 20 October 2025, 11:00 IST; Tuesday is a holiday so the
//! // weekly expiry moves back to Monday
//! let now = chrono::DateTime::parse_from_rfc3339("2025-10-20T11:00:00+05:30").unwrap();
//!
//! let outcome = pipeline.run(&now, &Fixed(snapshot)).unwrap();
//! let package = outcome.table().unwrap();
//! assert!(package.validate().is_ok());
//! assert_eq!(package.metadata.expiry, "20-OCT-2025");
//! for record in package.table.records() {
//!     println!("{}", record.join(","));
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `info` for run outcomes, `warn` for
//! strikes whose volatility is left blank, `debug` and `trace` for window,
//! ATM and solver details. Install any subscriber to see them.

pub mod chain;

/// Commonly used types.
pub mod prelude;
