/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! End-to-end run: session gate, expiry, fetch, window, ATM, IV, table.

use super::assembler::ChainAssembler;
use super::atm::resolve_atm;
use super::calendar::{SessionStatus, TradingCalendar};
use super::config::ChainConfig;
use super::error::ChainError;
use super::expiry::{ExpiryMoment, next_weekly_expiry};
use super::quote::ChainSnapshot;
use super::strikes::StrikeLadder;
use super::table::{ChainMetadata, ChainTablePackage};
use chrono::{DateTime, TimeZone};
use tracing::{debug, info};

/// Supplier of market data for one run.
pub trait ChainSource {
    /// Raw options chain for the expiry labelled `expiry_label`
    /// (`DD-MON-YYYY`).
    fn fetch_chain(&self, expiry_label: &str) -> Result<ChainSnapshot, ChainError>;

    /// Current near-month future price.
    fn fetch_reference_price(&self) -> Result<f64, ChainError>;
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// The market is closed; no data was fetched and no rows were produced.
    SessionClosed(SessionStatus),
    /// The assembled, checksummed table.
    Table(Box<ChainTablePackage>),
}

impl PipelineOutcome {
    /// The table package, if one was produced.
    #[must_use]
    pub fn table(&self) -> Option<&ChainTablePackage> {
        match self {
            PipelineOutcome::Table(package) => Some(package),
            PipelineOutcome::SessionClosed(_) => None,
        }
    }
}

/// Orchestrates one chain computation.
#[derive(Debug, Clone)]
pub struct ChainPipeline {
    config: ChainConfig,
    calendar: TradingCalendar,
}

impl ChainPipeline {
    /// Creates a pipeline after validating `config`.
    pub fn new(config: ChainConfig, calendar: TradingCalendar) -> Result<Self, ChainError> {
        config.validate()?;
        Ok(Self { config, calendar })
    }

    /// Pipeline with default settings and the bundled NSE calendar.
    pub fn nse() -> Result<Self, ChainError> {
        Self::new(ChainConfig::default(), TradingCalendar::nse()?)
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Trading calendar in use.
    #[must_use]
    pub fn calendar(&self) -> &TradingCalendar {
        &self.calendar
    }

    /// The weekly expiry that applies at `now`.
    pub fn next_expiry<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<ExpiryMoment, ChainError> {
        next_weekly_expiry(
            &self.calendar,
            now,
            self.config.weekly_expiry_weekday,
            self.config.expiry_rollover_hour,
            self.config.expiry_close_time,
        )
    }

    /// Parses an explicit `DD-MON-YYYY` expiry label.
    pub fn expiry_from_label(&self, label: &str) -> Result<ExpiryMoment, ChainError> {
        ExpiryMoment::parse(label, self.config.expiry_close_time, self.calendar.offset())
    }

    /// Runs the full computation at `now`.
    ///
    /// A closed session short-circuits before any fetch. Fetch failures, a
    /// non-positive reference price and a chain with no usable strikes abort
    /// the run. Per-strike solver failures only blank the affected IV cell.
    pub fn run<Tz, S>(&self, now: &DateTime<Tz>, source: &S) -> Result<PipelineOutcome, ChainError>
    where
        Tz: TimeZone,
        S: ChainSource + ?Sized,
    {
        let status = self.calendar.session_status(now);
        if !status.is_open() {
            info!(%status, "session closed, skipping run");
            return Ok(PipelineOutcome::SessionClosed(status));
        }

        let expiry = self.next_expiry(now)?;
        let label = expiry.label();
        debug!(expiry = %label, "resolved weekly expiry");

        let snapshot = source.fetch_chain(&label)?;
        let reference_price = source.fetch_reference_price()?;

        let package = self.build_table(&snapshot, reference_price, &expiry, now)?;
        Ok(PipelineOutcome::Table(Box::new(package)))
    }

    /// Builds the table from data already fetched.
    pub fn build_table<Tz: TimeZone>(
        &self,
        snapshot: &ChainSnapshot,
        reference_price: f64,
        expiry: &ExpiryMoment,
        now: &DateTime<Tz>,
    ) -> Result<ChainTablePackage, ChainError> {
        if !(reference_price.is_finite() && reference_price > 0.0) {
            return Err(ChainError::DataUnavailable {
                message: format!("reference price {reference_price} is not positive"),
            });
        }

        let step = self.config.strike_step;
        let ladder = StrikeLadder::from_snapshot(snapshot, step);
        let window = ladder
            .select_window(reference_price, self.config.half_width, step)
            .ok_or_else(|| ChainError::DataUnavailable {
                message: format!("chain has no strikes at a step of {step}"),
            })?;

        let atm = resolve_atm(&window, snapshot, reference_price);
        let local = self.calendar.local(now);
        let assembler = ChainAssembler::new(&self.config);
        let forward = assembler.forward(reference_price, atm.as_ref());

        let atm_iv = atm
            .as_ref()
            .filter(|straddle| straddle.premium() > 0.0)
            .and_then(|straddle| {
                assembler.atm_implied_vol(straddle, forward, expiry.time_to_expiry(&local))
            });

        let table = assembler.assemble(
            snapshot,
            &window,
            reference_price,
            atm.as_ref(),
            expiry,
            &local,
        );

        let summary = table.summary();
        info!(
            expiry = %expiry.label(),
            reference_price,
            forward,
            atm_strike = atm.map(|straddle| straddle.strike),
            atm_iv,
            strikes = summary.strikes,
            solved = summary.solved,
            "assembled option chain"
        );

        let metadata = ChainMetadata {
            expiry: expiry.label(),
            underlying_value: snapshot.underlying_value,
            reference_price,
            forward,
            atm,
            atm_iv,
            generated_at: local,
        };
        ChainTablePackage::new(metadata, table)
    }
}
