//! Error types for collocation.

use std::path::PathBuf;

use swath_parser::SwathError;
use thiserror::Error;

/// Errors that can occur while collocating points against swaths.
#[derive(Error, Debug)]
pub enum CollocationError {
    /// An overpass file (or the folder holding them) could not be read.
    #[error("data access failed for {}: {source}", file.display())]
    DataAccess {
        file: PathBuf,
        #[source]
        source: SwathError,
    },

    /// Co-indexed arrays do not share a shape.
    #[error("shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },

    /// Invalid point list or query parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl CollocationError {
    /// Create a DataAccess error for a file.
    pub fn data_access(file: impl Into<PathBuf>, source: SwathError) -> Self {
        Self::DataAccess {
            file: file.into(),
            source,
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error came from reading a file.
    pub fn is_data_access(&self) -> bool {
        matches!(self, Self::DataAccess { .. })
    }
}

/// Result type for collocation operations.
pub type Result<T> = std::result::Result<T, CollocationError>;
