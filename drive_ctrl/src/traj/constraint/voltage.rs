//! Differential drivetrain voltage constraint

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::ctrl::SimpleMotorFeedforward;
use crate::geom::Pose2d;
use crate::kinematics::{ChassisSpeeds, DifferentialDriveKinematics};

use super::{MinMaxAcceleration, TrajectoryConstraint};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Bounds the acceleration of a differential drivetrain so the voltage
/// commanded on either side never exceeds a maximum, leaving headroom for
/// the feedback controller on top of the feedforward.
///
/// The feedforward model is inverted at the faster wheel's speed to find
/// the largest wheel acceleration the voltage budget can sustain, then
/// scaled back to a chassis acceleration through the curvature. Keep the
/// maximum a volt or two below the battery's nominal voltage.
#[derive(Debug, Clone)]
pub struct DifferentialDriveVoltageConstraint {
    feedforward: SimpleMotorFeedforward,
    kinematics: DifferentialDriveKinematics,
    max_voltage: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DifferentialDriveVoltageConstraint {
    /// Create a new constraint from the drivetrain's feedforward model,
    /// geometry, and voltage budget.
    pub fn new(
        feedforward: SimpleMotorFeedforward,
        kinematics: DifferentialDriveKinematics,
        max_voltage: f64,
    ) -> Self {
        Self {
            feedforward,
            kinematics,
            max_voltage: max_voltage.abs(),
        }
    }
}

impl TrajectoryConstraint for DifferentialDriveVoltageConstraint {
    fn max_velocity_ms(&self, _pose: &Pose2d, _curvature_radpm: f64, velocity_ms: f64) -> f64 {
        velocity_ms
    }

    fn min_max_acceleration(
        &self,
        _pose: &Pose2d,
        curvature_radpm: f64,
        speed_ms: f64,
    ) -> MinMaxAcceleration {
        let wheel_speeds = self.kinematics.to_wheel_speeds(&ChassisSpeeds::new(
            speed_ms,
            0.0,
            speed_ms * curvature_radpm,
        ));

        let max_wheel_speed_ms = wheel_speeds.left_ms.max(wheel_speeds.right_ms);
        let min_wheel_speed_ms = wheel_speeds.left_ms.min(wheel_speeds.right_ms);

        // The fastest wheel has the least voltage headroom to accelerate,
        // and the slowest the least to brake
        let max_wheel_acceleration_mss = self
            .feedforward
            .max_achievable_acceleration(self.max_voltage, max_wheel_speed_ms);
        let min_wheel_acceleration_mss = self
            .feedforward
            .min_achievable_acceleration(self.max_voltage, min_wheel_speed_ms);

        // On a curve the outer wheel accelerates faster than the chassis by
        // (1 + trackwidth * |k| / 2)
        let scale = 1.0 + self.kinematics.trackwidth_m() * curvature_radpm.abs() / 2.0;

        MinMaxAcceleration {
            min_acceleration_mss: min_wheel_acceleration_mss / scale,
            max_acceleration_mss: max_wheel_acceleration_mss / scale,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::Rotation2d;

    fn test_constraint() -> DifferentialDriveVoltageConstraint {
        DifferentialDriveVoltageConstraint::new(
            SimpleMotorFeedforward::new(1.0, 2.0, 0.5),
            DifferentialDriveKinematics::new(0.6).unwrap(),
            10.0,
        )
    }

    #[test]
    fn test_velocity_unconstrained() {
        let constraint = test_constraint();
        let pose = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));

        assert_eq!(constraint.max_velocity_ms(&pose, 0.0, 7.0), 7.0);
    }

    #[test]
    fn test_straight_line_accel_matches_feedforward() {
        let constraint = test_constraint();
        let pose = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));

        let min_max = constraint.min_max_acceleration(&pose, 0.0, 2.0);

        // V = Ks + Kv v + Ka a = 10 => a = (10 - 1 - 4) / 0.5
        assert!((min_max.max_acceleration_mss - 10.0).abs() < 1e-9);
        // Braking: a = (-10 - 1 - 4) / 0.5
        assert!((min_max.min_acceleration_mss + 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_headroom_shrinks_with_speed() {
        let constraint = test_constraint();
        let pose = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));

        let slow = constraint.min_max_acceleration(&pose, 0.0, 1.0);
        let fast = constraint.min_max_acceleration(&pose, 0.0, 4.0);
        assert!(fast.max_acceleration_mss < slow.max_acceleration_mss);
    }

    #[test]
    fn test_curvature_reduces_chassis_accel() {
        let constraint = test_constraint();
        let pose = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));

        let straight = constraint.min_max_acceleration(&pose, 0.0, 0.0);
        let curved = constraint.min_max_acceleration(&pose, 2.0, 0.0);
        assert!(curved.max_acceleration_mss < straight.max_acceleration_mss);
    }
}
