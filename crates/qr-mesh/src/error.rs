//! Error types for grid classification and mesh synthesis.
//!
//! All geometry generation is deterministic and in-memory, so every error here
//! is a hard contract violation: it is surfaced immediately and never retried
//! or silently corrected. A degenerate request must fail at generation time,
//! not turn into a defective print.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for mesh synthesis operations.
pub type MeshResult<T> = Result<T, QrMeshError>;

/// Errors that can occur while classifying a grid or synthesizing geometry.
#[derive(Debug, Error, Diagnostic)]
pub enum QrMeshError {
    /// The input pixel grid is malformed.
    #[error("invalid pixel grid: {details}")]
    #[diagnostic(
        code(qr_mesh::grid::invalid),
        help("The grid must be non-empty and rectangular (every row the same length).")
    )]
    InvalidGrid { details: String },

    /// A box, layer or footprint was requested with zero or negative extent.
    #[error("degenerate geometry: {details}")]
    #[diagnostic(
        code(qr_mesh::geometry::degenerate),
        help("Box extents, layer heights and the physical footprint must all be strictly positive.")
    )]
    DegenerateGeometry { details: String },

    /// The requested mounting feature cannot be built.
    #[error("invalid mount: {details}")]
    #[diagnostic(
        code(qr_mesh::mount::invalid),
        help(
            "The hole must be strictly smaller than the tab's shorter side and the hole wall needs at least 8 segments. Enlarge the tab, shrink the hole, or raise the segment count."
        )
    )]
    InvalidMount { details: String },
}

impl QrMeshError {
    /// Create an InvalidGrid error.
    pub fn invalid_grid(details: impl Into<String>) -> Self {
        QrMeshError::InvalidGrid {
            details: details.into(),
        }
    }

    /// Create a DegenerateGeometry error.
    pub fn degenerate_geometry(details: impl Into<String>) -> Self {
        QrMeshError::DegenerateGeometry {
            details: details.into(),
        }
    }

    /// Create an InvalidMount error.
    pub fn invalid_mount(details: impl Into<String>) -> Self {
        QrMeshError::InvalidMount {
            details: details.into(),
        }
    }
}
