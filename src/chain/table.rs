//! Assembled chain table and its checksummed package.

use super::error::ChainError;
use super::implied_volatility::{AtmStraddle, OptionSide};
use super::quote::OptionQuote;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::trace;
use uuid::Uuid;

/// Column headers in output order.
pub const COLUMNS: [&str; 12] = [
    "CALL OI",
    "CALL OI CHNG",
    "CALL VOLUME",
    "CALL CHNG",
    "CALL LTP",
    "STRIKE",
    "IV",
    "PUT LTP",
    "PUT CHNG",
    "PUT VOLUME",
    "PUT OI CHNG",
    "PUT OI",
];

/// Format version used for checksum-enabled chain tables.
pub const CHAIN_TABLE_FORMAT_VERSION: u32 = 1;

/// One strike with both sides and the active side's IV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeRow {
    /// Strike price.
    pub strike: f64,
    /// Call side quote fields.
    pub call: OptionQuote,
    /// Put side quote fields.
    pub put: OptionQuote,
    /// Implied volatility in percent, blank when unsolved.
    pub iv: Option<f64>,
    /// Side the IV was solved from.
    pub iv_side: Option<OptionSide>,
}

/// A row of the output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChainRow {
    /// A real strike.
    Strike(StrikeRow),
    /// Separator placed where strikes cross the underlying value.
    UnderlyingMarker {
        /// Underlying display value.
        underlying: f64,
        /// Expiry label (`DD-MON-YYYY`).
        expiry: String,
    },
    /// Trailing generation timestamp.
    Timestamp {
        /// Local time formatted `DD-Mon HH:MM`.
        label: String,
    },
}

impl ChainRow {
    /// Renders the row into the 12 output cells.
    #[must_use]
    pub fn cells(&self) -> [String; 12] {
        match self {
            ChainRow::Strike(row) => [
                number(row.call.open_interest),
                number(row.call.change_in_open_interest),
                number(row.call.volume),
                number(row.call.price_change),
                number(row.call.last_price),
                number(row.strike),
                row.iv.map(number).unwrap_or_default(),
                number(row.put.last_price),
                number(row.put.price_change),
                number(row.put.volume),
                number(row.put.change_in_open_interest),
                number(row.put.open_interest),
            ],
            ChainRow::UnderlyingMarker { underlying, expiry } => {
                let mut cells: [String; 12] = Default::default();
                cells[5] = decimal(*underlying);
                cells[7] = format!("Expiry: {expiry}");
                cells
            }
            ChainRow::Timestamp { label } => {
                let mut cells: [String; 12] = Default::default();
                cells[10] = "Update Time".to_string();
                cells[11] = label.clone();
                cells
            }
        }
    }

    /// The strike data, if this is a data row.
    #[must_use]
    pub fn as_strike(&self) -> Option<&StrikeRow> {
        match self {
            ChainRow::Strike(row) => Some(row),
            _ => None,
        }
    }
}

fn number(value: f64) -> String {
    format!("{value}")
}

/// Always carries a fractional part: 24450 renders as `24450.0`.
fn decimal(value: f64) -> String {
    format!("{value:?}")
}

/// Totals over data rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSummary {
    /// Number of strike rows.
    pub strikes: usize,
    /// Number of strike rows with a solved IV.
    pub solved: usize,
    /// Sum of call open interest.
    pub total_call_oi: f64,
    /// Sum of put open interest.
    pub total_put_oi: f64,
    /// Sum of call volume.
    pub total_call_volume: f64,
    /// Sum of put volume.
    pub total_put_volume: f64,
    /// Put OI over call OI; `None` when there is no call OI.
    pub put_call_ratio: Option<f64>,
}

/// Ordered output rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainTable {
    rows: Vec<ChainRow>,
}

impl ChainTable {
    /// Wraps rows already in output order.
    #[must_use]
    pub fn new(rows: Vec<ChainRow>) -> Self {
        Self { rows }
    }

    /// All rows, pseudo-rows included.
    #[must_use]
    pub fn rows(&self) -> &[ChainRow] {
        &self.rows
    }

    /// Data rows only.
    pub fn strike_rows(&self) -> impl Iterator<Item = &StrikeRow> {
        self.rows.iter().filter_map(ChainRow::as_strike)
    }

    /// Column headers.
    #[must_use]
    pub fn header(&self) -> [&'static str; 12] {
        COLUMNS
    }

    /// Every row rendered to cells, in order.
    #[must_use]
    pub fn records(&self) -> Vec<[String; 12]> {
        self.rows.iter().map(ChainRow::cells).collect()
    }

    /// Aggregates over data rows; marker and timestamp rows never count.
    #[must_use]
    pub fn summary(&self) -> ChainSummary {
        let mut summary = ChainSummary {
            strikes: 0,
            solved: 0,
            total_call_oi: 0.0,
            total_put_oi: 0.0,
            total_call_volume: 0.0,
            total_put_volume: 0.0,
            put_call_ratio: None,
        };

        for row in self.strike_rows() {
            summary.strikes += 1;
            if row.iv.is_some() {
                summary.solved += 1;
            }
            summary.total_call_oi += row.call.open_interest;
            summary.total_put_oi += row.put.open_interest;
            summary.total_call_volume += row.call.volume;
            summary.total_put_volume += row.put.volume;
        }

        if summary.total_call_oi > 0.0 {
            summary.put_call_ratio = Some(summary.total_put_oi / summary.total_call_oi);
        }
        summary
    }
}

/// Run metadata carried beside the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainMetadata {
    /// Expiry label (`DD-MON-YYYY`).
    pub expiry: String,
    /// Underlying display value.
    pub underlying_value: f64,
    /// Reference (near-month future) price.
    pub reference_price: f64,
    /// Forward used for pricing and side selection.
    pub forward: f64,
    /// ATM straddle as quoted, if one was found.
    pub atm: Option<AtmStraddle>,
    /// Straddle-implied ATM volatility in percent.
    pub atm_iv: Option<f64>,
    /// Generation instant in exchange-local time.
    pub generated_at: DateTime<FixedOffset>,
}

/// Wrapper that provides checksum validation for a [`ChainTable`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainTablePackage {
    /// Version of the table schema for forward compatibility.
    pub version: u32,
    /// Identifier of the run that produced the table.
    pub run_id: Uuid,
    /// Run metadata.
    pub metadata: ChainMetadata,
    /// Table payload.
    pub table: ChainTable,
    /// Hex-encoded checksum of the serialized metadata and table.
    pub checksum: String,
}

impl ChainTablePackage {
    /// Creates a new package with a fresh run id, computing the checksum.
    pub fn new(metadata: ChainMetadata, table: ChainTable) -> Result<Self, ChainError> {
        let run_id = Uuid::new_v4();
        let checksum = Self::compute_checksum(&run_id, &metadata, &table)?;
        trace!(%run_id, %checksum, rows = table.rows().len(), "packaged chain table");

        Ok(Self {
            version: CHAIN_TABLE_FORMAT_VERSION,
            run_id,
            metadata,
            table,
            checksum,
        })
    }

    /// Serializes the package to JSON.
    pub fn to_json(&self) -> Result<String, ChainError> {
        serde_json::to_string(self).map_err(|error| ChainError::SerializationError {
            message: error.to_string(),
        })
    }

    /// Deserializes the package from JSON.
    pub fn from_json(data: &str) -> Result<Self, ChainError> {
        serde_json::from_str(data).map_err(|error| ChainError::DeserializationError {
            message: error.to_string(),
        })
    }

    /// Validates the checksum and version.
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.version != CHAIN_TABLE_FORMAT_VERSION {
            return Err(ChainError::UnsupportedVersion {
                found: self.version,
                expected: CHAIN_TABLE_FORMAT_VERSION,
            });
        }

        let computed = Self::compute_checksum(&self.run_id, &self.metadata, &self.table)?;
        if computed != self.checksum {
            return Err(ChainError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual: computed,
            });
        }

        Ok(())
    }

    /// Consumes the package and returns the validated table.
    pub fn into_table(self) -> Result<ChainTable, ChainError> {
        self.validate()?;
        Ok(self.table)
    }

    fn compute_checksum(
        run_id: &Uuid,
        metadata: &ChainMetadata,
        table: &ChainTable,
    ) -> Result<String, ChainError> {
        let payload = serde_json::to_vec(&(run_id, metadata, table)).map_err(|error| {
            ChainError::SerializationError {
                message: error.to_string(),
            }
        })?;

        let mut hasher = Sha256::new();
        hasher.update(payload);

        let checksum_bytes = hasher.finalize();
        Ok(format!("{:x}", checksum_bytes))
    }
}
