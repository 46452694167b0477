//! Option chain assembly from a raw exchange snapshot.

mod assembler;
/// Atm strike and straddle lookup.
pub mod atm;
pub mod calendar;
pub mod config;
pub mod error;
pub mod expiry;
/// Black-76 implied volatility solver.
pub mod implied_volatility;
pub mod pipeline;
pub mod quote;
/// Strike ladder and window selection.
pub mod strikes;
pub mod table;

pub use assembler::ChainAssembler;
pub use atm::resolve_atm;
pub use calendar::{CalendarConfig, Holiday, SessionStatus, TradingCalendar};
pub use config::ChainConfig;
pub use error::ChainError;
pub use expiry::{ExpiryMoment, SECONDS_PER_YEAR, next_weekly_expiry};
pub use pipeline::{ChainPipeline, ChainSource, PipelineOutcome};
pub use quote::{ChainSnapshot, OptionQuote, StrikeQuotes};
pub use strikes::{StrikeLadder, StrikeWindow, round_to_step};
pub use table::{
    CHAIN_TABLE_FORMAT_VERSION, COLUMNS, ChainMetadata, ChainRow, ChainSummary, ChainTable,
    ChainTablePackage, StrikeRow,
};
