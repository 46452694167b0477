//! Error types for the option chain pipeline.
//!
//! A closed market is not an error; see
//! [`PipelineOutcome::SessionClosed`](super::PipelineOutcome::SessionClosed).
//! Solver failures are row-local and never surface here.

use std::fmt;

/// Errors that abort a pipeline run before any row is produced.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ChainError {
    /// The raw chain or the reference price could not be obtained.
    DataUnavailable {
        /// What was missing and why.
        message: String,
    },

    /// An expiry label could not be parsed as `DD-MON-YYYY`.
    InvalidExpiry {
        /// The rejected label.
        input: String,
    },

    /// Strikes do not form a strictly increasing ladder.
    InvalidLadder {
        /// Description of the violation.
        message: String,
    },

    /// Configuration values are out of range.
    InvalidConfig {
        /// Description of the invalid setting.
        message: String,
    },

    /// Serialization of a table package failed.
    SerializationError {
        /// Underlying serializer message.
        message: String,
    },

    /// Deserialization of a snapshot, config or table package failed.
    DeserializationError {
        /// Underlying deserializer message.
        message: String,
    },

    /// A table package does not match its recorded checksum.
    ChecksumMismatch {
        /// Checksum stored in the package.
        expected: String,
        /// Checksum computed from the contents.
        actual: String,
    },

    /// A table package carries an unknown format version.
    UnsupportedVersion {
        /// Version found in the package.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::DataUnavailable { message } => {
                write!(f, "chain data unavailable: {message}")
            }
            ChainError::InvalidExpiry { input } => {
                write!(f, "invalid expiry '{input}', expected DD-MON-YYYY")
            }
            ChainError::InvalidLadder { message } => {
                write!(f, "invalid strike ladder: {message}")
            }
            ChainError::InvalidConfig { message } => {
                write!(f, "invalid configuration: {message}")
            }
            ChainError::SerializationError { message } => {
                write!(f, "serialization failed: {message}")
            }
            ChainError::DeserializationError { message } => {
                write!(f, "deserialization failed: {message}")
            }
            ChainError::ChecksumMismatch { expected, actual } => {
                write!(f, "checksum mismatch: expected {expected}, got {actual}")
            }
            ChainError::UnsupportedVersion { found, expected } => {
                write!(
                    f,
                    "unsupported table version {found} (expected {expected})"
                )
            }
        }
    }
}

impl std::error::Error for ChainError {}
