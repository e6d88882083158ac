//! LTV unicycle trajectory tracker

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{DMatrix, Vector3};
use serde::Serialize;

// Internal
use crate::geom::Pose2d;
use crate::kinematics::ChassisSpeeds;
use crate::traj::TrajectoryState;

use super::lqr::{bryson_cost, lqr_gain};
use super::{GainTable, LtvError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A linear time-varying tracker for unicycle-model robots.
///
/// The unicycle model linearized about a forward velocity `v` is
///
/// ```text
/// A = [0 0 0]    B = [1 0]
///     [0 0 v]        [0 0]
///     [0 0 0]        [0 1]
/// ```
///
/// with state `[x, y, theta]` error in the robot frame and inputs
/// `[v, omega]`. A gain is solved for each velocity of a sweep up to the
/// drivetrain's maximum at construction.
#[derive(Debug, Clone)]
pub struct LtvUnicycleController {
    gain_table: GainTable,

    /// Pose error of the last `calculate` call, in the robot frame
    pose_error: Pose2d,

    /// Pose tolerance for `at_reference`
    pose_tolerance: Pose2d,

    enabled: bool,
}

/// Read-only snapshot of an LTV unicycle controller for telemetry.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct LtvUnicycleStatus {
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

impl LtvUnicycleController {
    /// Create a new controller.
    ///
    /// `q_maxima` are the maximum tolerable `[x, y, theta]` errors and
    /// `r_maxima` the maximum tolerable `[v, omega]` control efforts, both
    /// weighted by Bryson's rule. `max_velocity_ms` bounds the gain sweep.
    pub fn new(
        q_maxima: [f64; 3],
        r_maxima: [f64; 2],
        dt_s: f64,
        max_velocity_ms: f64,
    ) -> Result<Self, LtvError> {
        if !dt_s.is_finite() || dt_s <= 0.0 {
            return Err(LtvError::InvalidParameter(format!(
                "period {} s must be positive",
                dt_s
            )));
        }

        let q = bryson_cost(&q_maxima);
        let r = bryson_cost(&r_maxima);
        let b = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);

        let gain_table = GainTable::build(max_velocity_ms, |velocity_ms| {
            let a = DMatrix::from_row_slice(
                3,
                3,
                &[0.0, 0.0, 0.0, 0.0, 0.0, velocity_ms, 0.0, 0.0, 0.0],
            );
            lqr_gain(&a, &b, &q, &r, dt_s)
        })?;

        Ok(Self {
            gain_table,
            pose_error: Pose2d::default(),
            pose_tolerance: Pose2d::default(),
            enabled: true,
        })
    }

    /// Create a controller with default cost weights, tolerating 6 cm of
    /// longitudinal error, 12 cm of lateral error and 2 rad of heading
    /// error.
    pub fn with_default_costs(dt_s: f64, max_velocity_ms: f64) -> Result<Self, LtvError> {
        Self::new([0.0625, 0.125, 2.0], [1.0, 2.0], dt_s, max_velocity_ms)
    }

    /// Set the pose tolerance used by `at_reference`.
    pub fn set_tolerance(&mut self, pose_tolerance: Pose2d) {
        self.pose_tolerance = pose_tolerance;
    }

    /// True if the pose error of the last `calculate` call is within the
    /// tolerance set by `set_tolerance`.
    pub fn at_reference(&self) -> bool {
        self.pose_error.x_m().abs() < self.pose_tolerance.x_m()
            && self.pose_error.y_m().abs() < self.pose_tolerance.y_m()
            && self.pose_error.rotation.radians().abs() < self.pose_tolerance.rotation.radians()
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

        if !self.enabled {
            return ChassisSpeeds::new(linear_velocity_ref_ms, 0.0, angular_velocity_ref_rads);
        }

        let k = self.gain_table.lookup(linear_velocity_ref_ms);
        let e = Vector3::new(
            self.pose_error.x_m(),
            self.pose_error.y_m(),
            self.pose_error.rotation.radians(),
        );
        let u = k * e;

        ChassisSpeeds::new(
            linear_velocity_ref_ms + u[0],
            0.0,
            angular_velocity_ref_rads + u[1],
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
    pub fn status(&self) -> LtvUnicycleStatus {
        LtvUnicycleStatus {
            error_x_m: self.pose_error.x_m(),
            error_y_m: self.pose_error.y_m(),
            error_heading_rad: self.pose_error.rotation.radians(),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::{Rotation2d, Twist2d};
    use util::maths::epsilon_eq;

    #[test]
    fn test_zero_error_passes_reference_through() {
        let mut ctrl = LtvUnicycleController::with_default_costs(0.02, 5.0).unwrap();
        let pose = Pose2d::new(2.0, -1.0, Rotation2d::new(0.3));

        let speeds = ctrl.calculate(&pose, &pose, 1.0, 0.2);
        assert!(epsilon_eq(speeds.vx_ms, 1.0, 1e-9));
        assert!(epsilon_eq(speeds.omega_rads, 0.2, 1e-9));
    }

    #[test]
    fn test_disabled_is_open_loop() {
        let mut ctrl = LtvUnicycleController::with_default_costs(0.02, 5.0).unwrap();
        ctrl.set_enabled(false);

        let current = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));
        let reference = Pose2d::new(1.0, 1.0, Rotation2d::new(0.5));

        let speeds = ctrl.calculate(&current, &reference, 2.0, 0.5);
        assert_eq!(speeds.vx_ms, 2.0);
        assert_eq!(speeds.omega_rads, 0.5);
    }

    #[test]
    fn test_error_produces_corrective_command() {
        let mut ctrl = LtvUnicycleController::with_default_costs(0.02, 5.0).unwrap();

        // Robot behind and to the right of the reference
        let current = Pose2d::new(0.0, -0.2, Rotation2d::new(0.0));
        let reference = Pose2d::new(0.5, 0.0, Rotation2d::new(0.0));

        let speeds = ctrl.calculate(&current, &reference, 1.0, 0.0);
        assert!(speeds.vx_ms > 1.0);
        assert!(speeds.omega_rads > 0.0);
    }

    #[test]
    fn test_converges_onto_straight_reference() {
        let mut ctrl = LtvUnicycleController::with_default_costs(0.02, 5.0).unwrap();
        let dt_s = 0.02;
        let v_ref = 1.0;

        let mut pose = Pose2d::new(0.0, 0.25, Rotation2d::new(-0.1));
        for i in 0..500 {
            let t_s = i as f64 * dt_s;
            let reference = Pose2d::new(v_ref * t_s, 0.0, Rotation2d::new(0.0));
            let speeds = ctrl.calculate(&pose, &reference, v_ref, 0.0);

            let twist = Twist2d::new(speeds.vx_ms * dt_s, 0.0, speeds.omega_rads * dt_s);
            pose = pose.exp(&twist);
        }

        assert!(pose.y_m().abs() < 0.02);
        assert!(pose.rotation.radians().abs() < 0.05);
    }

    #[test]
    fn test_invalid_period_rejected() {
        assert!(LtvUnicycleController::with_default_costs(0.0, 5.0).is_err());
        assert!(LtvUnicycleController::with_default_costs(-0.02, 5.0).is_err());
    }
}
