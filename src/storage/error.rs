//! Storage error types
//!
//! Defines all errors that can occur while importing, holding and saving a
//! recording.

use crate::storage::types::AnnotationId;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a capture file is rejected
///
/// Every variant that concerns a specific row carries its 1-based line
/// number in the input text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    /// Input had no header row
    #[error("Import error: input is empty")]
    Empty,

    /// Header row is malformed
    #[error("Import error: line {line}: bad header cell '{cell}': {reason}")]
    Header {
        line: u64,
        cell: String,
        reason: String,
    },

    /// No `Annotations:` row separates readings from annotations
    #[error("Import error: sentinel row 'Annotations:' not found")]
    MissingSentinel,

    /// Header declares fewer sensors than configured as required
    #[error("Import error: line {line}: {found} sensor columns, {required} required")]
    TooFewSensors {
        line: u64,
        found: usize,
        required: usize,
    },

    /// Pressure row width does not match the header
    #[error("Import error: line {line}: expected {expected} cells, found {found}")]
    RowWidth {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A cell that must be numeric is not
    #[error("Import error: line {line}, column {column}: '{cell}' is not a number")]
    BadNumber {
        line: u64,
        column: usize,
        cell: String,
    },

    /// Sample times must be strictly increasing
    #[error("Import error: line {line}: time {time} does not increase past {previous}")]
    NonIncreasingTime { line: u64, time: f64, previous: f64 },

    /// Record could not be read at all
    #[error("Import error: line {line}: {reason}")]
    Malformed { line: u64, reason: String },
}

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Capture text was rejected; the store is unchanged
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Reading or writing a capture file failed
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operation needs a loaded recording
    #[error("State error: no data has been loaded")]
    NoData,

    /// Annotation id is not part of the loaded recording
    #[error("Annotation not found: {0}")]
    AnnotationNotFound(AnnotationId),

    /// Annotation time must be finite
    #[error("Invalid annotation time: {0}")]
    InvalidTime(f64),
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
