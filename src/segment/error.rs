//! Segment error types

use crate::time::CodecError;
use thiserror::Error;

/// Errors that can occur while extracting a segment
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegmentError {
    /// No recording is loaded
    #[error("State error: no data has been loaded")]
    NoData,

    /// Start does not come before end
    #[error("Range error: start {start} is not before end {end}")]
    Range { start: f64, end: f64 },

    /// Range or sensor argument has the wrong shape
    #[error("Format error: {0}")]
    Format(String),

    /// A range element is not a valid time
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Result type for segment operations
pub type SegmentResult<T> = Result<T, SegmentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_is_wrapped() {
        let err: SegmentError = CodecError::Parse("1:xx".to_string()).into();
        assert!(matches!(err, SegmentError::Codec(CodecError::Parse(_))));
        assert_eq!(
            SegmentError::Range {
                start: 2.0,
                end: 1.0
            }
            .to_string(),
            "Range error: start 2 is not before end 1"
        );
    }
}
