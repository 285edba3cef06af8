//! Structured error types for the pageflow engine.
//!
//! The pagination core itself is total — normalization and splitting always
//! produce output, degrading gracefully on malformed input. Errors only
//! surface at the edges: JSON document input, geometry validation, and the
//! persistence seam.

use thiserror::Error;

/// The unified error type returned by fallible pageflow API functions.
#[derive(Debug, Error)]
pub enum PageflowError {
    /// JSON input failed to parse as a valid page array or geometry.
    #[error("failed to parse document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A page geometry that cannot hold any content (opposing margins
    /// crossed, or a non-positive page box).
    #[error("invalid page geometry: {0}")]
    Geometry(String),

    /// The document store rejected a load or save.
    #[error("document store error: {0}")]
    Store(String),

    /// File or stream I/O failed (CLI input/output).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
