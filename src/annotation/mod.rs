//! Annotation markers
//!
//! Binds annotation times to positions on several independently scaled
//! surfaces:
//!
//! - **surface**: The capability a drawing target provides
//! - **marker**: One annotation drawn on one surface
//! - **registry**: Owner of surfaces and markers, keyed by (surface, annotation)
//! - **error**: Error types
//!
//! # Lifecycle
//!
//! ```text
//! absent → created → positioned ⟲ moved
//!                         ↓
//!                      removed → absent
//! ```

pub mod error;
pub mod marker;
pub mod registry;
pub mod surface;

pub use error::{RegistryError, RegistryResult};
pub use marker::{AnnotationMarker, MarkerLabel, MarkerState};
pub use registry::{AnnotationRegistry, SurfaceId, SyncReport};
pub use surface::{AxisKind, Handle, LabelStyle, Surface};
