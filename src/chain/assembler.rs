//! Per-strike implied volatility and table assembly.

use super::config::ChainConfig;
use super::expiry::ExpiryMoment;
use super::implied_volatility::{
    AtmStraddle, IVError, IVRequest, OptionSide, round_to_cents, solve_implied_vol,
    straddle_implied_vol,
};
use super::quote::{ChainSnapshot, StrikeQuotes};
use super::strikes::StrikeWindow;
use super::table::{ChainRow, ChainTable, StrikeRow};
use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

/// Format of the trailing timestamp row.
const TIMESTAMP_FORMAT: &str = "%d-%b %H:%M";

/// Builds the output table for one snapshot.
#[derive(Debug, Clone)]
pub struct ChainAssembler<'a> {
    config: &'a ChainConfig,
}

impl<'a> ChainAssembler<'a> {
    /// Creates an assembler using `config` for premium flooring, forward
    /// anchoring and the solver.
    #[must_use]
    pub fn new(config: &'a ChainConfig) -> Self {
        Self { config }
    }

    /// Forward used for pricing and side selection.
    ///
    /// Without an ATM straddle the reference price is used whatever the
    /// anchor.
    #[must_use]
    pub fn forward(&self, reference_price: f64, atm: Option<&AtmStraddle>) -> f64 {
        match atm {
            Some(straddle) => self
                .config
                .anchor
                .forward(reference_price, &straddle.floored(self.config.atm_premium_floor)),
            None => reference_price,
        }
    }

    /// Straddle-implied ATM volatility in percent, `None` when it cannot be
    /// solved.
    #[must_use]
    pub fn atm_implied_vol(
        &self,
        atm: &AtmStraddle,
        forward: f64,
        time_to_expiry: f64,
    ) -> Option<f64> {
        let straddle = atm.floored(self.config.atm_premium_floor);
        match straddle_implied_vol(&straddle, forward, time_to_expiry, &self.config.solver) {
            Ok(iv) => Some(round_to_cents(iv * 100.0)),
            Err(error) => {
                warn!(strike = atm.strike, %error, "atm straddle volatility unavailable");
                None
            }
        }
    }

    /// Implied volatility for the active side of one strike.
    ///
    /// The ATM strike reports the straddle inversion, so its row always
    /// equals [`atm_implied_vol`](Self::atm_implied_vol) even when its quotes
    /// break put-call parity against the forward.
    pub fn strike_implied_vol(
        &self,
        quotes: &StrikeQuotes,
        forward: f64,
        time_to_expiry: f64,
        atm: &AtmStraddle,
    ) -> Result<(f64, OptionSide), IVError> {
        let side = OptionSide::active_for(quotes.strike, forward);
        let straddle = atm.floored(self.config.atm_premium_floor);

        if quotes.strike == atm.strike {
            let iv =
                straddle_implied_vol(&straddle, forward, time_to_expiry, &self.config.solver)?;
            return Ok((round_to_cents(iv * 100.0), side));
        }
        let quote = match side {
            OptionSide::Call => quotes.call(),
            OptionSide::Put => quotes.put(),
        };

        let request = IVRequest {
            forward,
            strike: quotes.strike,
            time_to_expiry,
            straddle: Some(straddle),
            quoted_premium: quote.premium(),
            side,
        };
        let result = solve_implied_vol(
            &request,
            self.config.price_floor_epsilon,
            &self.config.solver,
        )?;
        Ok((result.iv_percent(), side))
    }

    /// Assembles the rows for every window strike present in `snapshot`.
    ///
    /// The underlying marker goes before the first strike above the
    /// underlying value, or last when none is above. A strike whose solve
    /// fails, or with no trade on either side, keeps its quote fields with a
    /// blank IV. Without an ATM straddle every IV is blank; zero ATM
    /// premiums are replaced by the configured floor.
    #[must_use]
    pub fn assemble(
        &self,
        snapshot: &ChainSnapshot,
        window: &StrikeWindow,
        reference_price: f64,
        atm: Option<&AtmStraddle>,
        expiry: &ExpiryMoment,
        now: &DateTime<FixedOffset>,
    ) -> ChainTable {
        let time_to_expiry = expiry.time_to_expiry(now);
        let forward = self.forward(reference_price, atm);
        if atm.is_none() {
            debug!("no atm straddle, implied volatility left blank");
        }

        let mut rows = Vec::with_capacity(window.strikes().len() + 2);
        let mut marker = Some(ChainRow::UnderlyingMarker {
            underlying: snapshot.underlying_value,
            expiry: expiry.label(),
        });

        for strike in window.strikes() {
            let Some(quotes) = snapshot.quotes_at(*strike) else {
                continue;
            };

            if *strike > snapshot.underlying_value {
                if let Some(row) = marker.take() {
                    rows.push(row);
                }
            }

            let traded = quotes.call().premium() > 0.0 || quotes.put().premium() > 0.0;
            let solved = match atm {
                Some(straddle) if traded => {
                    match self.strike_implied_vol(quotes, forward, time_to_expiry, straddle) {
                        Ok(solved) => Some(solved),
                        Err(error) => {
                            warn!(strike, %error, "implied volatility left blank");
                            None
                        }
                    }
                }
                Some(_) => {
                    debug!(strike, "no trades on either side");
                    None
                }
                None => None,
            };

            rows.push(ChainRow::Strike(StrikeRow {
                strike: *strike,
                call: quotes.call(),
                put: quotes.put(),
                iv: solved.map(|(iv, _)| iv),
                iv_side: solved.map(|(_, side)| side),
            }));
        }

        if let Some(row) = marker.take() {
            rows.push(row);
        }
        rows.push(ChainRow::Timestamp {
            label: now.format(TIMESTAMP_FORMAT).to_string(),
        });

        ChainTable::new(rows)
    }
}
