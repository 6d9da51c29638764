//! Error type shared by every clustering stage.

use thiserror::Error;

/// Errors raised while reconstructing clusters from one image
#[derive(Error, Debug)]
pub enum ClusterError {
    /// No point survived noise reduction and extraction.
    ///
    /// Callers treat this as "zero clusters for this image".
    #[error("empty point set after filtering")]
    EmptyInput,

    /// A configuration value is out of range or names an unsupported option
    #[error("invalid clustering configuration: {0}")]
    InvalidConfiguration(String),

    /// A grid does not have the dimensions the caller declared
    #[error("grid shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Labels and points of one image are not aligned
    #[error("{labels} labels for {points} points")]
    LengthMismatch { points: usize, labels: usize },

    /// The parallel neighbour-search pool could not be created
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

impl ClusterError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        ClusterError::InvalidConfiguration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ClusterError>;
