//! # Trajectory constraints
//!
//! A constraint bounds the velocity and acceleration a drivetrain may have
//! at a point along a path. The parameterizer intersects every active
//! constraint at each path sample, so the tightest bound always wins.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod centripetal;
mod drivetrain;
mod max_velocity;
mod region;
mod voltage;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use centripetal::*;
pub use drivetrain::*;
pub use max_velocity::*;
pub use region::*;
pub use voltage::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::geom::Pose2d;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An acceleration interval. The default is unbounded in both directions.
#[derive(Debug, Copy, Clone)]
pub struct MinMaxAcceleration {
    /// Lower (most negative) allowed acceleration
    pub min_acceleration_mss: f64,

    /// Upper allowed acceleration
    pub max_acceleration_mss: f64,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A bound on drivetrain velocity and acceleration at a point along a path.
pub trait TrajectoryConstraint {
    /// The maximum allowed velocity at the given pose and curvature.
    /// `velocity_ms` is the bound computed so far; an unconstraining
    /// implementation returns it unchanged.
    fn max_velocity_ms(&self, pose: &Pose2d, curvature_radpm: f64, velocity_ms: f64) -> f64;

    /// The allowed acceleration interval at the given pose, curvature, and
    /// signed speed.
    fn min_max_acceleration(
        &self,
        pose: &Pose2d,
        curvature_radpm: f64,
        speed_ms: f64,
    ) -> MinMaxAcceleration;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MinMaxAcceleration {
    fn default() -> Self {
        Self {
            min_acceleration_mss: f64::NEG_INFINITY,
            max_acceleration_mss: f64::INFINITY,
        }
    }
}
