//! Commonly used types, re-exported for convenience.
//!
//! ```
//! use optionchain_rs::prelude::*;
//! ```

pub use crate::chain::implied_volatility::{
    AtmStraddle, Black76, Black76Params, ForwardAnchor, IVError, IVRequest, IVResult,
    OptionSide, SolverConfig, floor_premium, solve_implied_vol, solve_iv, solve_iv_bisection,
    straddle_implied_vol,
};
pub use crate::chain::{
    CalendarConfig, ChainAssembler, ChainConfig, ChainError, ChainMetadata, ChainPipeline,
    ChainRow, ChainSnapshot, ChainSource, ChainSummary, ChainTable, ChainTablePackage,
    ExpiryMoment, Holiday, OptionQuote, PipelineOutcome, SessionStatus, StrikeLadder,
    StrikeQuotes, StrikeRow, StrikeWindow, TradingCalendar, next_weekly_expiry, resolve_atm,
};
