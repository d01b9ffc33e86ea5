//! Time codec error types

use thiserror::Error;

/// Errors raised while converting between clock strings and seconds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Input matched neither `MM:SS.ss` nor a bare number
    #[error("Parse error: '{0}' is neither MM:SS.ss nor a number of seconds")]
    Parse(String),

    /// One element of a batch failed; conversion stopped there
    #[error("Parse error at element {index}: '{value}' is neither MM:SS.ss nor a number of seconds")]
    BatchElement { index: usize, value: String },

    /// Negative or non-finite seconds cannot be written as a clock string
    #[error("Cannot format {0} as clock time: seconds must be finite and >= 0")]
    NotClockable(f64),
}

/// Result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
