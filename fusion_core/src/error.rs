//! Library error types.

use thiserror::Error;

/// Estimator-level failures. These are per-update: the filter state is left
/// untouched and the caller decides whether to continue.
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// Innovation covariance S could not be inverted.
    #[error("innovation covariance is singular; update skipped")]
    SingularInnovation,
}

/// Transport and framing failures on the wire.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame codec error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("protocol violation: {0}")]
    Protocol(String),
}
