//! Error types for swath data access.

use thiserror::Error;

/// Result type for swath parser operations.
pub type SwathResult<T> = Result<T, SwathError>;

/// Error types for swath parsing.
#[derive(Error, Debug)]
pub enum SwathError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed JSON swath document
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Array does not share the grid shape
    #[error("shape mismatch for '{name}': expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Error raised by the native NetCDF library
    #[error("NetCDF error: {0}")]
    NetCdf(String),
}

impl SwathError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(name: impl Into<String>, expected: &[usize], found: &[usize]) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }
}
