//! Annotation registry error types

use crate::annotation::registry::SurfaceId;
use crate::storage::{AnnotationId, StorageError};
use thiserror::Error;

/// Errors that can occur in the annotation registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Marker already registered for this surface and annotation
    #[error("Duplicate marker: annotation {id} is already on surface {surface}")]
    Duplicate { surface: SurfaceId, id: AnnotationId },

    /// No marker registered for this surface and annotation
    #[error("Marker not found: annotation {id} on surface {surface}")]
    NotFound { surface: SurfaceId, id: AnnotationId },

    /// Surface was never attached or has been detached
    #[error("Unknown surface: {0}")]
    UnknownSurface(SurfaceId),

    /// Display coordinate is NaN or infinite
    #[error("Invalid display position: {0}")]
    InvalidPosition(f64),

    /// Committing marker times to the store failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl RegistryError {
    /// True for errors a caller can check and skip
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RegistryError::Duplicate { .. })
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
