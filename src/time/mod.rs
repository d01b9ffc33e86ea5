//! Time codec
//!
//! Conversion between the two ways a recording time is written:
//!
//! - seconds since capture start: `78.3`
//! - clock form: `1:18.3` (`M:SS.S`, minutes unbounded)
//!
//! # Example
//!
//! ```rust
//! use manometry::time::{to_clock, to_seconds};
//!
//! assert_eq!(to_seconds("1:30.0").unwrap(), 90.0);
//! assert_eq!(to_clock(90.0).unwrap(), "1:30.0");
//! ```

pub mod codec;
pub mod error;

pub use codec::{
    to_clock, to_clock_batch, to_seconds, to_seconds_batch, TimeFormat, TimeValue,
};
pub use error::{CodecError, CodecResult};
