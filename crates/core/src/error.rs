//! Error types for sheclust grouping and batching.

use thiserror::Error;

/// Primary error type for clustering operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// Malformed or contradictory parameters. Raised before any computation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A post-condition on the produced assignment failed.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
}

impl ClusterError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn inconsistent(msg: impl Into<String>) -> Self {
        Self::InternalInconsistency(msg.into())
    }
}

/// Convenience Result type alias for ClusterError.
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Checks that two coordinate sequences have the same length.
pub(crate) fn check_lengths(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(ClusterError::invalid(format!(
            "x and y must have the same length (got {} and {})",
            x.len(),
            y.len()
        )));
    }
    Ok(())
}

/// Checks that every coordinate is finite.
pub(crate) fn check_finite(x: &[f64], y: &[f64]) -> Result<()> {
    if let Some(i) = x
        .iter()
        .zip(y)
        .position(|(a, b)| !a.is_finite() || !b.is_finite())
    {
        return Err(ClusterError::invalid(format!(
            "point {i} has a non-finite coordinate ({}, {})",
            x[i], y[i]
        )));
    }
    Ok(())
}
