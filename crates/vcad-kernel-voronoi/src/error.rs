//! Error types for the Voronoi kernel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building a diagram or medial axis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoronoiError {
    /// Too few sites or polygon vertices to build anything.
    #[error("insufficient input: need at least {required} distinct points, found {found}")]
    InsufficientInput {
        /// Minimum number of distinct points.
        required: usize,
        /// Number of distinct points supplied.
        found: usize,
    },

    /// Input collapsed to degenerate geometry (zero area, all duplicates).
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Invalid settings or bounds.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for Voronoi kernel operations.
pub type Result<T> = std::result::Result<T, VoronoiError>;

/// Machine-readable reason attached to an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Too few sites or vertices.
    InsufficientInput,
    /// Input collapsed during degeneracy recovery.
    DegenerateGeometry,
    /// Settings or bounds were rejected.
    InvalidParameter,
}

/// Empty-result marker carried by [`Diagram`](crate::Diagram) and
/// [`MedialAxis`](crate::MedialAxis) when a call could not produce geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// Why the result is empty.
    pub reason: ReasonCode,
    /// Human-readable detail.
    pub message: String,
}

impl From<VoronoiError> for Failure {
    fn from(err: VoronoiError) -> Self {
        let reason = match err {
            VoronoiError::InsufficientInput { .. } => ReasonCode::InsufficientInput,
            VoronoiError::DegenerateGeometry(_) => ReasonCode::DegenerateGeometry,
            VoronoiError::InvalidParameter(_) => ReasonCode::InvalidParameter,
        };
        Self {
            reason,
            message: err.to_string(),
        }
    }
}
