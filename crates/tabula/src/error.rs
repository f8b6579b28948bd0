//! Error types for the Tabula library.

use thiserror::Error;

/// Main error type for Tabula operations.
///
/// Cell-level parse failures are never errors: a value that fails to parse
/// simply does not count toward its column's numeric/date ratios.
#[derive(Debug, Error)]
pub enum TabulaError {
    /// Bytes or text could not be interpreted as a container.
    #[error("parse error: {0}")]
    Parse(String),

    /// Input exceeds a hard resource cap. The request is rejected before any
    /// per-cell work starts; nothing is partially processed.
    #[error("resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    /// Parsing succeeded structurally but scoring produced zero usable tables.
    #[error("no usable table candidate found")]
    NoCandidate,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Tabula operations.
pub type Result<T> = std::result::Result<T, TabulaError>;
