//! Raw options-chain snapshot.
//!
//! Parses the exchange JSON shape
//!
//! ```text
//! {"records": {"underlyingValue": 24512.35,
//!              "data": [{"strikePrice": 24500, "CE": {...}, "PE": {...}}]}}
//! ```
//!
//! Quote fields are read leniently: numbers and numeric strings are taken as
//! is, anything else reads as 0.

use super::error::ChainError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Trade data for one side (call or put) of one strike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    /// Open interest.
    #[serde(rename = "openInterest", default, deserialize_with = "lenient_f64")]
    pub open_interest: f64,
    /// Change in open interest since the previous session.
    #[serde(rename = "changeinOpenInterest", default, deserialize_with = "lenient_f64")]
    pub change_in_open_interest: f64,
    /// Contracts traded in the session.
    #[serde(rename = "totalTradedVolume", default, deserialize_with = "lenient_f64")]
    pub volume: f64,
    /// Change in last price since the previous close.
    #[serde(rename = "change", default, deserialize_with = "lenient_f64")]
    pub price_change: f64,
    /// Last traded price.
    #[serde(rename = "lastPrice", default, deserialize_with = "lenient_f64")]
    pub last_price: f64,
}

impl OptionQuote {
    /// Creates a quote with only a last traded price.
    #[must_use]
    pub fn with_last_price(last_price: f64) -> Self {
        Self {
            last_price,
            ..Self::default()
        }
    }

    /// Last price if it is a usable positive number, else 0.
    #[must_use]
    pub fn premium(&self) -> f64 {
        if self.last_price.is_finite() && self.last_price > 0.0 {
            self.last_price
        } else {
            0.0
        }
    }
}

/// Both sides of a single strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeQuotes {
    /// Strike price.
    #[serde(rename = "strikePrice")]
    pub strike: f64,
    /// Call side; absent when the call never traded.
    #[serde(rename = "CE", default, skip_serializing_if = "Option::is_none")]
    pub call: Option<OptionQuote>,
    /// Put side; absent when the put never traded.
    #[serde(rename = "PE", default, skip_serializing_if = "Option::is_none")]
    pub put: Option<OptionQuote>,
}

impl StrikeQuotes {
    /// Creates quotes for a strike.
    #[must_use]
    pub fn new(strike: f64, call: Option<OptionQuote>, put: Option<OptionQuote>) -> Self {
        Self { strike, call, put }
    }

    /// Call side, all-zero when missing.
    #[must_use]
    pub fn call(&self) -> OptionQuote {
        self.call.unwrap_or_default()
    }

    /// Put side, all-zero when missing.
    #[must_use]
    pub fn put(&self) -> OptionQuote {
        self.put.unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct RawChain {
    records: RawRecords,
}

#[derive(Deserialize)]
struct RawRecords {
    #[serde(rename = "underlyingValue")]
    underlying_value: f64,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    data: Vec<StrikeQuotes>,
}

/// A point-in-time options chain for one expiry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainSnapshot {
    /// Underlying index value, for display only.
    pub underlying_value: f64,
    /// Exchange timestamp, if supplied.
    pub timestamp: Option<String>,
    strikes: Vec<StrikeQuotes>,
}

impl ChainSnapshot {
    /// Builds a snapshot, sorting strikes ascending and keeping the first
    /// entry of any duplicated strike. Non-finite strikes are dropped.
    #[must_use]
    pub fn new(underlying_value: f64, strikes: Vec<StrikeQuotes>) -> Self {
        let mut strikes: Vec<StrikeQuotes> = strikes
            .into_iter()
            .filter(|quotes| quotes.strike.is_finite())
            .collect();
        strikes.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        strikes.dedup_by(|later, earlier| later.strike == earlier.strike);

        Self {
            underlying_value,
            timestamp: None,
            strikes,
        }
    }

    /// Parses the exchange JSON payload.
    pub fn from_json(data: &str) -> Result<Self, ChainError> {
        let raw: RawChain =
            serde_json::from_str(data).map_err(|error| ChainError::DataUnavailable {
                message: format!("malformed chain payload: {error}"),
            })?;

        if !raw.records.underlying_value.is_finite() {
            return Err(ChainError::DataUnavailable {
                message: "underlying value is not a number".to_string(),
            });
        }

        let mut snapshot = Self::new(raw.records.underlying_value, raw.records.data);
        snapshot.timestamp = raw.records.timestamp;
        Ok(snapshot)
    }

    /// All strikes in ascending order.
    #[must_use]
    pub fn strikes(&self) -> &[StrikeQuotes] {
        &self.strikes
    }

    /// Quotes at exactly `strike`.
    #[must_use]
    pub fn quotes_at(&self, strike: f64) -> Option<&StrikeQuotes> {
        self.strikes
            .binary_search_by(|quotes| {
                quotes
                    .strike
                    .partial_cmp(&strike)
                    .unwrap_or(Ordering::Less)
            })
            .ok()
            .map(|index| &self.strikes[index])
    }

    /// Returns true if the snapshot holds no strikes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strikes.is_empty()
    }
}

/// Reads a number, a numeric string, or falls back to 0.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|number| number.is_finite()).unwrap_or(0.0))
}
