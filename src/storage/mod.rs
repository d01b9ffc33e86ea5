//! Recording storage
//!
//! This module holds the two streams of a manometry capture:
//!
//! - **types**: Core data structures (PressureTable, AnnotationRecord, Dataset)
//! - **format**: Tab-delimited capture text, import and export
//! - **files**: File capability for load/save
//! - **store**: TimeSeriesStore, the owner of the loaded recording
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Import:
//!   text → parse into fresh Dataset → swap in on success
//!
//! Export:
//!   Dataset → header, pressure rows, "Annotations:", rows sorted by time
//! ```
//!
//! # Example
//!
//! ```rust
//! use manometry::storage::{SensorId, StoreConfig, TimeSeriesStore};
//!
//! let mut store = TimeSeriesStore::new(StoreConfig::default());
//! store
//!     .import_text("Time\t1\t2\n0.0\t5\t6\nAnnotations:\n0.0\tStart\n")
//!     .unwrap();
//!
//! let pressures = store.pressures().unwrap();
//! assert_eq!(pressures.value_at(0.0, SensorId::new(2).unwrap()), Some(6.0));
//! ```

pub mod error;
pub mod files;
pub mod format;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{ImportError, StorageError, StorageResult};
pub use files::{FileAccess, LocalFiles};
pub use format::{parse_text, write_text, SENTINEL};
pub use store::{StoreConfig, TimeSeriesStore};
pub use types::{
    AnnotationId, AnnotationRecord, Dataset, PressureTable, RowRejection, SensorId,
    StoreSummary, MAX_SENSORS,
};
