//! Error types raised at the loader and session boundaries.
//!
//! The matchers themselves never fail: they assume validated input and
//! return empty results for empty input.

use thiserror::Error;

/// Input rows or geometries that do not have the expected shape.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("line {line}: column '{column}' is not an integer: '{value}'")]
    InvalidBound {
        line: u64,
        column: String,
        value: String,
    },

    #[error("line {line}: column '{column}' is not a coordinate: '{value}'")]
    InvalidCoordinate {
        line: u64,
        column: String,
        value: String,
    },

    #[error("feature {index}: {reason}")]
    InvalidGeometry { index: usize, reason: String },

    #[error("delimited input error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid region file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Conditions under which a region export has nothing to write.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("draw at least one polygon or circle to export")]
    NoRegions,

    #[error("no points found inside the drawn areas")]
    NoPoints,
}
