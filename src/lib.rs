//! # Manometry
//!
//! High-resolution manometry recordings: import 36-channel pressure
//! captures, cut them into time and sensor segments, and keep annotation
//! markers consistent across several independently scaled views.
//!
//! ## Modules
//!
//! - [`time`]: Clock string and seconds conversion
//! - [`storage`]: Capture format, the recording store and file access
//! - [`segment`]: Time and sensor sub-views, axis helpers
//! - [`annotation`]: Surfaces, markers and the annotation registry
//! - [`render`]: Line and spatio-temporal views over a rendering backend
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use manometry::annotation::{AnnotationRegistry, LabelStyle};
//! use manometry::render::{DrawList, SpatioView};
//! use manometry::segment::{parse_sensors, Segmenter};
//! use manometry::storage::TimeSeriesStore;
//!
//! let mut store = TimeSeriesStore::default();
//! store
//!     .import_text("Time\t1\t2\t3\n1.0\t10\t20\t30\n2.0\t11\t21\t31\nAnnotations:\n1.5\tBolus start\n")
//!     .unwrap();
//!
//! let segment = Segmenter::new(&store)
//!     .get_segment((1.0, 2.5), &parse_sensors(&[1, 2, 3]).unwrap())
//!     .unwrap();
//!
//! let mut registry = AnnotationRegistry::new();
//! let spatio = registry.attach(Box::new(SpatioView::for_segment(&segment, DrawList::new())));
//! let report = registry
//!     .show_segment(spatio, &segment, true, &LabelStyle::default())
//!     .unwrap();
//! assert_eq!(report.added, 1);
//! ```

pub mod annotation;
pub mod config;
pub mod render;
pub mod segment;
pub mod storage;
pub mod time;

// Re-export top-level types for convenience
pub use storage::{
    AnnotationId, AnnotationRecord, Dataset, FileAccess, ImportError, LocalFiles, PressureTable,
    SensorId, StorageError, StorageResult, StoreConfig, StoreSummary, TimeSeriesStore,
};

pub use time::{to_clock, to_seconds, CodecError, TimeFormat, TimeValue};

pub use segment::{RangeArg, SegmentError, Segmenter, TimeRange, TimeSegment};

pub use annotation::{
    AnnotationRegistry, AxisKind, Handle, LabelStyle, RegistryError, Surface, SurfaceId,
    SyncReport,
};

pub use render::{DrawList, LineView, RenderBackend, SpatioView};

pub use config::{Config, ConfigError, LoggingConfig};
