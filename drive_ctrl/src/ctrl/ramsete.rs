//! RAMSETE nonlinear unicycle trajectory tracker

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;

// Internal
use crate::geom::Pose2d;
use crate::kinematics::ChassisSpeeds;
use crate::traj::TrajectoryState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A time-varying nonlinear reference tracker for unicycle-model robots.
///
/// Given a reference pose and the reference linear and angular velocities
/// along a trajectory, the controller returns adjusted chassis speeds that
/// converge the robot onto the reference. The tuning gains are
/// dimensionless: `b` (roughly a proportional term, larger is more
/// aggressive) and `zeta` (a damping term in (0, 1)).
#[derive(Debug, Clone)]
pub struct RamseteController {
    /// Aggressiveness gain, in rad^2/m^2
    b: f64,

    /// Damping gain, unitless
    zeta: f64,

    /// Pose error of the last `calculate` call, in the robot frame
    pose_error: Pose2d,

    /// Pose tolerance for `at_reference`
    pose_tolerance: Pose2d,

    enabled: bool,
}

/// Read-only snapshot of a RAMSETE controller for telemetry.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct RamseteStatus {
    /// Longitudinal pose error in the robot frame
    pub error_x_m: f64,

    /// Lateral pose error in the robot frame
    pub error_y_m: f64,

    /// Heading error
    pub error_heading_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RamseteController {
    /// Create a new controller with the given gains.
    ///
    /// `b` must be non-negative and `zeta` in [0, 1]; out-of-range values
    /// are clamped with a logged warning. With `b = 0` the feedback terms
    /// vanish and the controller passes the reference speeds through
    /// unchanged.
    pub fn new(b: f64, zeta: f64) -> Self {
        let b = if b.is_finite() && b >= 0.0 {
            b
        } else {
            warn!("Invalid RAMSETE b = {}, clamping to 0.0", b);
            0.0
        };
        let zeta = if zeta.is_finite() && (0.0..=1.0).contains(&zeta) {
            zeta
        } else {
            warn!("Invalid RAMSETE zeta = {}, clamping to 0.7", zeta);
            0.7
        };

        Self {
            b,
            zeta,
            pose_error: Pose2d::default(),
            pose_tolerance: Pose2d::default(),
            enabled: true,
        }
    }

    /// Set the pose tolerance used by `at_reference`.
    pub fn set_tolerance(&mut self, pose_tolerance: Pose2d) {
        self.pose_tolerance = pose_tolerance;
    }

    /// True if the pose error of the last `calculate` call is within the
    /// tolerance set by `set_tolerance`.
    pub fn at_reference(&self) -> bool {
        let translation_error = self.pose_error.translation;
        let rotation_error = self.pose_error.rotation;
        let translation_tolerance = self.pose_tolerance.translation;
        let rotation_tolerance = self.pose_tolerance.rotation;

        translation_error.x_m.abs() < translation_tolerance.x_m
            && translation_error.y_m.abs() < translation_tolerance.y_m
            && rotation_error.radians().abs() < rotation_tolerance.radians()
    }

    /// Enable or disable the feedback terms. When disabled the reference
    /// speeds pass through unchanged.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Get the next chassis speed command for the given current pose and
    /// reference.
    pub fn calculate(
        &mut self,
        current_pose: &Pose2d,
        pose_ref: &Pose2d,
        linear_velocity_ref_ms: f64,
        angular_velocity_ref_rads: f64,
    ) -> ChassisSpeeds {
        self.pose_error = pose_ref.relative_to(current_pose);

        if !self.enabled || self.b == 0.0 {
            return ChassisSpeeds::new(linear_velocity_ref_ms, 0.0, angular_velocity_ref_rads);
        }

        let e_x = self.pose_error.x_m();
        let e_y = self.pose_error.y_m();
        let e_theta = self.pose_error.rotation.radians();

        let v_ref = linear_velocity_ref_ms;
        let omega_ref = angular_velocity_ref_rads;

        let k = 2.0
            * self.zeta
            * (omega_ref * omega_ref + self.b * v_ref * v_ref).sqrt();

        ChassisSpeeds::new(
            v_ref * self.pose_error.rotation.cos() + k * e_x,
            0.0,
            omega_ref + k * e_theta + self.b * v_ref * sinc(e_theta) * e_y,
        )
    }

    /// Get the next chassis speed command for the given current pose and
    /// trajectory sample.
    pub fn calculate_state(
        &mut self,
        current_pose: &Pose2d,
        desired: &TrajectoryState,
    ) -> ChassisSpeeds {
        self.calculate(
            current_pose,
            &desired.pose,
            desired.velocity_ms,
            desired.velocity_ms * desired.curvature_radpm,
        )
    }

    /// Get a telemetry snapshot of the controller.
    pub fn status(&self) -> RamseteStatus {
        RamseteStatus {
            error_x_m: self.pose_error.x_m(),
            error_y_m: self.pose_error.y_m(),
            error_heading_rad: self.pose_error.rotation.radians(),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// sin(x)/x, with a second-order Taylor expansion near zero.
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-9 {
        1.0 - x * x / 6.0
    } else {
        x.sin() / x
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::Rotation2d;
    use util::maths::epsilon_eq;

    #[test]
    fn test_zero_error_passes_reference_through() {
        let mut ctrl = RamseteController::new(2.0, 0.7);
        let pose = Pose2d::new(1.0, 2.0, Rotation2d::new(0.5));

        let speeds = ctrl.calculate(&pose, &pose, 1.5, 0.3);
        assert!(epsilon_eq(speeds.vx_ms, 1.5, 1e-9));
        assert!(epsilon_eq(speeds.omega_rads, 0.3, 1e-9));
    }

    #[test]
    fn test_b_zero_is_open_loop() {
        let mut ctrl = RamseteController::new(0.0, 0.7);
        let current = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));
        let reference = Pose2d::new(1.0, 1.0, Rotation2d::new(1.0));

        let speeds = ctrl.calculate(&current, &reference, 2.0, 0.5);
        assert_eq!(speeds.vx_ms, 2.0);
        assert_eq!(speeds.omega_rads, 0.5);
    }

    #[test]
    fn test_lagging_robot_speeds_up() {
        let mut ctrl = RamseteController::new(2.0, 0.7);
        // Robot is 0.5 m behind the reference along its heading
        let current = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));
        let reference = Pose2d::new(0.5, 0.0, Rotation2d::new(0.0));

        let speeds = ctrl.calculate(&current, &reference, 1.0, 0.0);
        assert!(speeds.vx_ms > 1.0);
        assert!(epsilon_eq(speeds.omega_rads, 0.0, 1e-9));
    }

    #[test]
    fn test_lateral_error_produces_turn() {
        let mut ctrl = RamseteController::new(2.0, 0.7);
        // Reference is to the robot's left, so it should turn left
        let current = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));
        let reference = Pose2d::new(0.0, 0.5, Rotation2d::new(0.0));

        let speeds = ctrl.calculate(&current, &reference, 1.0, 0.0);
        assert!(speeds.omega_rads > 0.0);
    }

    #[test]
    fn test_converges_onto_straight_reference() {
        // Unicycle simulation tracking a constant-velocity straight
        // reference from an offset start
        let mut ctrl = RamseteController::new(2.0, 0.7);
        let dt_s = 0.02;
        let v_ref = 1.0;

        let mut pose = Pose2d::new(0.0, 0.3, Rotation2d::new(0.2));
        for i in 0..500 {
            let t_s = i as f64 * dt_s;
            let reference = Pose2d::new(v_ref * t_s, 0.0, Rotation2d::new(0.0));
            let speeds = ctrl.calculate(&pose, &reference, v_ref, 0.0);

            let twist = crate::geom::Twist2d::new(
                speeds.vx_ms * dt_s,
                0.0,
                speeds.omega_rads * dt_s,
            );
            pose = pose.exp(&twist);
        }

        let end_reference_x = v_ref * 500.0 * dt_s;
        assert!((pose.x_m() - end_reference_x).abs() < 0.01);
        assert!(pose.y_m().abs() < 0.01);
        assert!(pose.rotation.radians().abs() < 0.02);
    }

    #[test]
    fn test_invalid_gains_clamped() {
        let ctrl = RamseteController::new(-1.0, 2.0);
        assert_eq!(ctrl.b, 0.0);
        assert_eq!(ctrl.zeta, 0.7);
    }
}
