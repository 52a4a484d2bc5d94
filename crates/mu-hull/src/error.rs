//! Error types for hull construction.

use mu_core::CoreError;
use thiserror::Error;

/// Errors that can occur while building a lower convex hull.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HullError {
    #[error("Hull input is empty")]
    Empty,

    #[error("Point {index} has {found} coordinates, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Point {index} is not barycentric (coordinates must be >= 0 and sum to 1)")]
    NotBarycentric { index: usize },

    #[error("No point at the corner of component {component}; the hull would not cover the simplex")]
    MissingCorner { component: usize },

    #[error("Could not settle a supporting plane on a hull vertex; input is numerically degenerate")]
    NoVertex,

    #[error("Numeric error: {0}")]
    Numeric(#[from] CoreError),
}

pub type HullResult<T> = Result<T, HullError>;
