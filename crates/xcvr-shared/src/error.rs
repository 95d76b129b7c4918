//! Error types for the normalization pipeline.

use thiserror::Error;

/// Why a SPROM output could not be turned into an attribute record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("SPROM output is empty")]
    Empty,

    #[error("transceiver is not present")]
    NotPresent,

    #[error("SPROM output has no '{0}' field")]
    MissingField(&'static str),

    #[error("invalid {field}: '{raw}'")]
    InvalidLaneCount { field: &'static str, raw: String },
}

impl ExtractError {
    /// Errors that mean there is no transceiver to report on at all, as
    /// opposed to a transceiver whose SPROM lacks classification fields.
    pub fn is_absent(&self) -> bool {
        matches!(self, ExtractError::Empty | ExtractError::NotPresent)
    }
}

/// Failure to substitute the type field in structured output.
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("details output is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unterminated string literal at byte {0}")]
    UnterminatedString(usize),
}

/// Failure to read the interface status table.
#[derive(Error, Debug)]
pub enum StatusParseError {
    #[error("status output is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("malformed status row: {0}")]
    MalformedRow(String),
}
