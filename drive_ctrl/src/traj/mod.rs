//! # Trajectory module
//!
//! Time-parameterized paths and the constraints used to generate them. A
//! geometric path (poses with curvature) is pushed through
//! [`time_parameterize`], which finds the fastest velocity profile along
//! the path that honours every active [`TrajectoryConstraint`], producing a
//! [`Trajectory`] that controllers sample by time.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod constraint;
mod parameterize;
mod trajectory;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use parameterize::*;
pub use trajectory::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while building or parameterizing a trajectory.
#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error("A trajectory must contain at least one state")]
    EmptyTrajectory,

    #[error("Trajectory states must have monotonically increasing timestamps")]
    NotTimeOrdered,

    #[error(
        "The acceleration constraints are infeasible at path point {index}: \
         min {min_mss} m/s^2 exceeds max {max_mss} m/s^2"
    )]
    InfeasibleConstraints {
        index: usize,
        min_mss: f64,
        max_mss: f64,
    },

    #[error("Cannot integrate time along the path: {0}")]
    MalformedProfile(String),

    #[error("Invalid parameterization config: {0}")]
    InvalidConfig(String),
}
