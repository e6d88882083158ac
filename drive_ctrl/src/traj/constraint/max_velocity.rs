//! Constant velocity cap constraint

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::geom::Pose2d;

use super::{MinMaxAcceleration, TrajectoryConstraint};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Caps the velocity along the whole path at a constant value. Useful on
/// its own or wrapped in a region constraint to slow the robot through one
/// part of the field.
#[derive(Debug, Copy, Clone)]
pub struct MaxVelocityConstraint {
    max_velocity_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MaxVelocityConstraint {
    /// Create a new constraint with the given cap.
    pub fn new(max_velocity_ms: f64) -> Self {
        Self {
            max_velocity_ms: max_velocity_ms.abs(),
        }
    }
}

impl TrajectoryConstraint for MaxVelocityConstraint {
    fn max_velocity_ms(&self, _pose: &Pose2d, _curvature_radpm: f64, velocity_ms: f64) -> f64 {
        velocity_ms.min(self.max_velocity_ms)
    }

    fn min_max_acceleration(
        &self,
        _pose: &Pose2d,
        _curvature_radpm: f64,
        _speed_ms: f64,
    ) -> MinMaxAcceleration {
        MinMaxAcceleration::default()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::Rotation2d;

    #[test]
    fn test_caps_velocity() {
        let constraint = MaxVelocityConstraint::new(2.0);
        let pose = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));

        assert_eq!(constraint.max_velocity_ms(&pose, 0.0, 5.0), 2.0);
        assert_eq!(constraint.max_velocity_ms(&pose, 0.0, 1.0), 1.0);
    }

    #[test]
    fn test_acceleration_unbounded() {
        let constraint = MaxVelocityConstraint::new(2.0);
        let pose = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));

        let min_max = constraint.min_max_acceleration(&pose, 0.0, 1.0);
        assert_eq!(min_max.min_acceleration_mss, f64::NEG_INFINITY);
        assert_eq!(min_max.max_acceleration_mss, f64::INFINITY);
    }
}
