//! Strike ladder and window selection around the money.

use super::error::ChainError;
use super::quote::ChainSnapshot;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tolerance for deciding that a strike is a multiple of the increment.
const STEP_TOLERANCE: f64 = 1e-9;

/// Strictly increasing sequence of strikes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeLadder {
    strikes: Vec<f64>,
}

impl StrikeLadder {
    /// Creates a ladder, rejecting non-finite or non-increasing strikes.
    pub fn new(strikes: Vec<f64>) -> Result<Self, ChainError> {
        if let Some(bad) = strikes.iter().find(|strike| !strike.is_finite()) {
            return Err(ChainError::InvalidLadder {
                message: format!("strike {bad} is not finite"),
            });
        }
        if let Some(pair) = strikes.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(ChainError::InvalidLadder {
                message: format!("strikes must be strictly increasing, got {} then {}", pair[0], pair[1]),
            });
        }
        Ok(Self { strikes })
    }

    /// Builds a ladder from the snapshot's strikes that are multiples of `step`.
    #[must_use]
    pub fn from_snapshot(snapshot: &ChainSnapshot, step: f64) -> Self {
        // snapshot strikes are already sorted and unique
        let strikes = snapshot
            .strikes()
            .iter()
            .map(|quotes| quotes.strike)
            .filter(|strike| is_multiple_of(*strike, step))
            .collect();
        Self { strikes }
    }

    /// Strikes in ascending order.
    #[must_use]
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// Number of strikes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strikes.len()
    }

    /// Returns true if the ladder holds no strikes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strikes.is_empty()
    }

    /// Index of the strike closest to `target`; ties go to the lower strike.
    #[must_use]
    pub fn nearest_index(&self, target: f64) -> Option<usize> {
        nearest_index(&self.strikes, target)
    }

    /// Picks the window of `half_width` strikes either side of the strike
    /// nearest `reference_price` rounded to `step`.
    ///
    /// The window is clipped at the ladder edges, so it may hold fewer than
    /// `2 * half_width + 1` strikes. Returns `None` only for an empty ladder.
    ///
    /// # Example
    /// ```
    /// use optionchain_rs::prelude::*;
    ///
    /// let ladder = StrikeLadder::new((1..=20).map(|i| i as f64 * 100.0).collect()).unwrap();
    /// let window = ladder.select_window(1053.0, 3, 100.0).unwrap();
    /// assert_eq!(window.strikes(), &[800.0, 900.0, 1000.0, 1100.0, 1200.0, 1300.0, 1400.0]);
    /// assert_eq!(window.center_strike(), 1100.0);
    /// ```
    #[must_use]
    pub fn select_window(&self, reference_price: f64, half_width: usize, step: f64) -> Option<StrikeWindow> {
        let target = round_to_step(reference_price, step);
        let center = self.nearest_index(target)?;

        let start = center.saturating_sub(half_width);
        let end = center.saturating_add(half_width).saturating_add(1).min(self.strikes.len());

        debug!(
            reference_price,
            target,
            center_strike = self.strikes[center],
            start,
            end,
            "selected strike window"
        );

        Some(StrikeWindow {
            strikes: self.strikes[start..end].to_vec(),
            center: center - start,
        })
    }
}

/// A contiguous slice of the ladder around the money.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeWindow {
    strikes: Vec<f64>,
    center: usize,
}

impl StrikeWindow {
    /// Strikes in ascending order.
    #[must_use]
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// Position of the center strike within the window.
    #[must_use]
    pub fn center_index(&self) -> usize {
        self.center
    }

    /// The center strike.
    #[must_use]
    pub fn center_strike(&self) -> f64 {
        self.strikes[self.center]
    }
}

/// Rounds `price` to the nearest multiple of `step`, ties to even.
#[must_use]
pub fn round_to_step(price: f64, step: f64) -> f64 {
    if step > 0.0 {
        (price / step).round_ties_even() * step
    } else {
        price
    }
}

/// Index of the value closest to `target`; the first minimum wins.
#[must_use]
pub fn nearest_index(values: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in values.iter().enumerate() {
        let distance = (value - target).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

fn is_multiple_of(strike: f64, step: f64) -> bool {
    if !(step > 0.0) {
        return true;
    }
    let ratio = strike / step;
    (ratio - ratio.round()).abs() < STEP_TOLERANCE
}
