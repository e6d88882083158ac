//! Centripetal acceleration constraint

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::geom::Pose2d;

use super::{MinMaxAcceleration, TrajectoryConstraint};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Bounds the velocity through curves so the centripetal acceleration
/// `v^2 * |curvature|` never exceeds a maximum, which keeps the robot from
/// slipping sideways in tight turns. Straight sections are unconstrained.
#[derive(Debug, Copy, Clone)]
pub struct CentripetalAccelerationConstraint {
    max_centripetal_acceleration_mss: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CentripetalAccelerationConstraint {
    /// Create a new constraint with the given centripetal acceleration
    /// limit.
    pub fn new(max_centripetal_acceleration_mss: f64) -> Self {
        Self {
            max_centripetal_acceleration_mss: max_centripetal_acceleration_mss.abs(),
        }
    }
}

impl TrajectoryConstraint for CentripetalAccelerationConstraint {
    fn max_velocity_ms(&self, _pose: &Pose2d, curvature_radpm: f64, velocity_ms: f64) -> f64 {
        if curvature_radpm == 0.0 {
            return velocity_ms;
        }

        velocity_ms.min((self.max_centripetal_acceleration_mss / curvature_radpm.abs()).sqrt())
    }

    fn min_max_acceleration(
        &self,
        _pose: &Pose2d,
        _curvature_radpm: f64,
        _speed_ms: f64,
    ) -> MinMaxAcceleration {
        // The velocity cap alone keeps the lateral acceleration in bounds
        MinMaxAcceleration::default()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
