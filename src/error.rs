// src/error.rs
//
// Error taxonomy for snapshot ingestion and derived-quantity computation.
// Every error is terminal for the file/run it occurs in.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, OvfError>;

#[derive(Debug, Error)]
pub enum OvfError {
    #[error("missing header key `{key}`")]
    MissingMetadata { key: String },

    #[error("header key `{key}` has value {value:?}, expected {expected}")]
    MalformedMetadata {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("header key `{key}` must be >= 1, got {value}")]
    InvalidDimension { key: String, value: usize },

    #[error("body holds {actual} values, expected {expected} (xnodes*ynodes*znodes*3)")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("non-numeric token {token:?} on line {line}")]
    Parse { token: String, line: usize },

    #[error("unsupported OVF data block: {format}")]
    UnsupportedData { format: String },

    #[error("binary check value mismatch: expected {expected}, found {found}")]
    BadCheckValue { expected: f64, found: f64 },

    #[error("{axis} index {index} out of range (len {len})")]
    IndexOutOfRange {
        axis: char,
        index: usize,
        len: usize,
    },

    #[error("invalid y range [{start}, {end})")]
    InvalidRange { start: usize, end: usize },

    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] serde_json::Error),
}
