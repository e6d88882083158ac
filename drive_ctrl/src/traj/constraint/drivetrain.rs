//! Drivetrain kinematics constraints

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::geom::Pose2d;
use crate::kinematics::{
    ChassisSpeeds, DifferentialDriveKinematics, MecanumDriveKinematics, SwerveDriveKinematics,
};

use super::{MinMaxAcceleration, TrajectoryConstraint};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Bounds the chassis velocity so neither wheel of a differential
/// drivetrain exceeds its attainable top speed. The chassis command is
/// projected to wheel speeds, desaturated, and projected back, so the
/// returned bound is always kinematically self-consistent.
#[derive(Debug, Clone)]
pub struct DifferentialDriveKinematicsConstraint {
    kinematics: DifferentialDriveKinematics,
    max_speed_ms: f64,
}

/// [`DifferentialDriveKinematicsConstraint`], for mecanum drivetrains.
#[derive(Debug, Clone)]
pub struct MecanumDriveKinematicsConstraint {
    kinematics: MecanumDriveKinematics,
    max_speed_ms: f64,
}

/// [`DifferentialDriveKinematicsConstraint`], for swerve drivetrains.
#[derive(Debug, Clone)]
pub struct SwerveDriveKinematicsConstraint {
    kinematics: SwerveDriveKinematics,
    max_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DifferentialDriveKinematicsConstraint {
    /// Create a new constraint from the drivetrain geometry and the
    /// attainable top wheel speed.
    pub fn new(kinematics: DifferentialDriveKinematics, max_speed_ms: f64) -> Self {
        Self {
            kinematics,
            max_speed_ms: max_speed_ms.abs(),
        }
    }
}

impl TrajectoryConstraint for DifferentialDriveKinematicsConstraint {
    fn max_velocity_ms(&self, _pose: &Pose2d, curvature_radpm: f64, velocity_ms: f64) -> f64 {
        let mut wheel_speeds = self.kinematics.to_wheel_speeds(&ChassisSpeeds::new(
            velocity_ms,
            0.0,
            velocity_ms * curvature_radpm,
        ));
        wheel_speeds.desaturate(self.max_speed_ms);

        self.kinematics.to_chassis_speeds(&wheel_speeds).vx_ms
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

impl MecanumDriveKinematicsConstraint {
    /// Create a new constraint from the drivetrain geometry and the
    /// attainable top wheel speed.
    pub fn new(kinematics: MecanumDriveKinematics, max_speed_ms: f64) -> Self {
        Self {
            kinematics,
            max_speed_ms: max_speed_ms.abs(),
        }
    }
}

impl TrajectoryConstraint for MecanumDriveKinematicsConstraint {
    fn max_velocity_ms(&self, _pose: &Pose2d, curvature_radpm: f64, velocity_ms: f64) -> f64 {
        let mut wheel_speeds = self.kinematics.to_wheel_speeds(&ChassisSpeeds::new(
            velocity_ms,
            0.0,
            velocity_ms * curvature_radpm,
        ));
        wheel_speeds.desaturate(self.max_speed_ms);

        self.kinematics.to_chassis_speeds(&wheel_speeds).vx_ms
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

impl SwerveDriveKinematicsConstraint {
    /// Create a new constraint from the drivetrain geometry and the
    /// attainable top module speed.
    pub fn new(kinematics: SwerveDriveKinematics, max_speed_ms: f64) -> Self {
        Self {
            kinematics,
            max_speed_ms: max_speed_ms.abs(),
        }
    }
}

impl TrajectoryConstraint for SwerveDriveKinematicsConstraint {
    fn max_velocity_ms(&self, _pose: &Pose2d, curvature_radpm: f64, velocity_ms: f64) -> f64 {
        let mut states = self.kinematics.to_module_states(&ChassisSpeeds::new(
            velocity_ms,
            0.0,
            velocity_ms * curvature_radpm,
        ));
        SwerveDriveKinematics::desaturate_wheel_speeds(&mut states, self.max_speed_ms);

        self.kinematics.to_chassis_speeds(&states).vx_ms
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
    use crate::geom::{Rotation2d, Translation2d};

    #[test]
    fn test_differential_straight_caps_at_wheel_speed() {
        let kinematics = DifferentialDriveKinematics::new(0.6).unwrap();
        let constraint = DifferentialDriveKinematicsConstraint::new(kinematics, 3.0);
        let pose = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));

        // Driving straight, the chassis can go as fast as a wheel
        assert!((constraint.max_velocity_ms(&pose, 0.0, 10.0) - 3.0).abs() < 1e-9);
        assert!((constraint.max_velocity_ms(&pose, 0.0, 1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_differential_curve_bound_is_self_consistent() {
        let kinematics = DifferentialDriveKinematics::new(0.6).unwrap();
        let constraint = DifferentialDriveKinematicsConstraint::new(kinematics.clone(), 3.0);
        let pose = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));

        let curvature = 2.0;
        let bound = constraint.max_velocity_ms(&pose, curvature, 10.0);

        // Re-projecting the bound through the kinematics must not saturate
        // a wheel
        let wheel_speeds = kinematics
            .to_wheel_speeds(&ChassisSpeeds::new(bound, 0.0, bound * curvature));
        assert!(wheel_speeds.left_ms.abs() <= 3.0 + 1e-9);
        assert!(wheel_speeds.right_ms.abs() <= 3.0 + 1e-9);

        // And the outer wheel should be exactly at the limit
        assert!(
            (wheel_speeds.left_ms.abs() - 3.0).abs() < 1e-9
                || (wheel_speeds.right_ms.abs() - 3.0).abs() < 1e-9
        );
    }

    #[test]
    fn test_swerve_spin_in_place_unaffected() {
        let kinematics = SwerveDriveKinematics::new(vec![
            Translation2d::new(0.3, 0.3),
            Translation2d::new(0.3, -0.3),
            Translation2d::new(-0.3, 0.3),
            Translation2d::new(-0.3, -0.3),
        ])
        .unwrap();
        let constraint = SwerveDriveKinematicsConstraint::new(kinematics, 4.0);
        let pose = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));

        // Slow forward velocity is under every module's limit even on a
        // tight curve
        let bound = constraint.max_velocity_ms(&pose, 1.0, 0.5);
        assert!((bound - 0.5).abs() < 1e-9);
    }
}
