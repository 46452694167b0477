//! At-the-money strike resolution.

use super::implied_volatility::AtmStraddle;
use super::quote::ChainSnapshot;
use super::strikes::{StrikeWindow, nearest_index};
use tracing::debug;

/// Finds the strike in `window` closest to `reference_price` and its
/// straddle premiums.
///
/// Only strikes quoted in `snapshot` are candidates; ties go to the lower
/// strike. A missing or non-numeric premium reads as 0. Returns `None` when
/// no candidate exists, in which case every IV in the chain stays blank.
#[must_use]
pub fn resolve_atm(
    window: &StrikeWindow,
    snapshot: &ChainSnapshot,
    reference_price: f64,
) -> Option<AtmStraddle> {
    let candidates: Vec<f64> = window
        .strikes()
        .iter()
        .copied()
        .filter(|strike| snapshot.quotes_at(*strike).is_some())
        .collect();

    let strike = candidates[nearest_index(&candidates, reference_price)?];
    let quotes = snapshot.quotes_at(strike)?;
    let straddle = AtmStraddle::new(strike, quotes.call().premium(), quotes.put().premium());

    debug!(
        strike,
        call = straddle.call_premium,
        put = straddle.put_premium,
        "resolved atm straddle"
    );
    Some(straddle)
}
