//! Segment extraction
//!
//! A [`TimeSegment`] is a read-only view of the loaded recording: rows with
//! `start <= t < end`, the requested sensors in requested order, and the
//! annotations inside the same interval.
//!
//! # Example
//!
//! ```rust
//! use manometry::segment::{parse_sensors, Segmenter};
//! use manometry::storage::TimeSeriesStore;
//!
//! let mut store = TimeSeriesStore::default();
//! store
//!     .import_text("Time\t1\t2\n1.0\t10\t20\n2.0\t11\t21\nAnnotations:\n1.5\tBolus\n")
//!     .unwrap();
//!
//! let sensors = parse_sensors(&[2, 1]).unwrap();
//! let segment = Segmenter::new(&store).get_segment(("0:01", 2.0), &sensors).unwrap();
//! assert_eq!(segment.row(0), Some(vec![20.0, 10.0]));
//! assert_eq!(segment.annotations().len(), 1);
//! ```

pub mod axis;
pub mod error;
pub mod segmenter;

pub use axis::{padded_limits, sensor_ticks, time_ticks, SensorTick, TimeTick};
pub use error::{SegmentError, SegmentResult};
pub use segmenter::{
    parse_sensors, process_time_range, AnnotationEntry, RangeArg, SegmentExport, SegmentRow,
    Segmenter, TimeRange, TimeSegment,
};
