//! LTV differential-drive trajectory tracker

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{DMatrix, DVector, Matrix2};
use serde::Serialize;

// Internal
use crate::ctrl::feedforward::SimpleMotorFeedforward;
use crate::geom::Pose2d;
use crate::traj::TrajectoryState;

use super::lqr::{bryson_cost, lqr_gain};
use super::{GainTable, LtvError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Continuous state-space model of a differential drivetrain's wheel
/// velocities, with state `[v_left, v_right]` and input
/// `[V_left, V_right]`.
#[derive(Debug, Copy, Clone)]
pub struct DrivetrainPlant {
    /// State matrix
    pub a: Matrix2<f64>,

    /// Input matrix
    pub b: Matrix2<f64>,
}

/// Per-side voltage command for a differential drivetrain.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct DifferentialDriveWheelVoltages {
    /// Left side voltage
    pub left_v: f64,

    /// Right side voltage
    pub right_v: f64,
}

/// A linear time-varying tracker for differential drivetrains, producing
/// left/right wheel voltages.
///
/// The model has five states, `[x, y, theta, v_left, v_right]` with the
/// pose error in the robot frame, and two inputs, the per-side voltages.
/// The first three rows couple through the trackwidth and the operating
/// velocity; the wheel-velocity rows come from the identified plant. As
/// with the unicycle variant the gains are solved over a velocity sweep at
/// construction. Each returned voltage is the feedforward for that side's
/// reference wheel speed plus the feedback term `K*e`.
#[derive(Debug, Clone)]
pub struct LtvDifferentialDriveController {
    gain_table: GainTable,

    feedforward: SimpleMotorFeedforward,

    trackwidth_m: f64,

    /// Pose error of the last `calculate` call, in the robot frame
    pose_error: Pose2d,

    /// Pose tolerance for `at_reference`
    pose_tolerance: Pose2d,
}

/// Read-only snapshot of an LTV differential-drive controller for
/// telemetry.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct LtvDifferentialDriveStatus {
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

impl DrivetrainPlant {
    /// Build a drivetrain model from feedforward gains identified for the
    /// linear (both sides together) and angular (sides opposing) modes.
    ///
    /// `kv` gains are in volt seconds per meter, `ka` gains in volt
    /// seconds squared per meter. All four must be strictly positive.
    pub fn identify(
        kv_linear: f64,
        ka_linear: f64,
        kv_angular: f64,
        ka_angular: f64,
    ) -> Result<Self, LtvError> {
        for (name, gain) in [
            ("kv_linear", kv_linear),
            ("ka_linear", ka_linear),
            ("kv_angular", kv_angular),
            ("ka_angular", ka_angular),
        ] {
            if !gain.is_finite() || gain <= 0.0 {
                return Err(LtvError::InvalidParameter(format!(
                    "{} = {} must be positive",
                    name, gain
                )));
            }
        }

        let a1 = 0.5 * (-(kv_linear / ka_linear) - (kv_angular / ka_angular));
        let a2 = 0.5 * (-(kv_linear / ka_linear) + (kv_angular / ka_angular));
        let b1 = 0.5 * (1.0 / ka_linear + 1.0 / ka_angular);
        let b2 = 0.5 * (1.0 / ka_linear - 1.0 / ka_angular);

        Ok(Self {
            a: Matrix2::new(a1, a2, a2, a1),
            b: Matrix2::new(b1, b2, b2, b1),
        })
    }
}

impl LtvDifferentialDriveController {
    /// Create a new controller.
    ///
    /// `q_maxima` are the maximum tolerable
    /// `[x, y, theta, v_left, v_right]` errors and `r_maxima` the maximum
    /// tolerable per-side voltages, both weighted by Bryson's rule. The
    /// feedforward model supplies the sustaining voltage for each side's
    /// reference wheel speed.
    pub fn new(
        plant: &DrivetrainPlant,
        feedforward: SimpleMotorFeedforward,
        trackwidth_m: f64,
        q_maxima: [f64; 5],
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
        if !trackwidth_m.is_finite() || trackwidth_m <= 0.0 {
            return Err(LtvError::InvalidParameter(format!(
                "trackwidth {} m must be positive",
                trackwidth_m
            )));
        }

        let q = bryson_cost(&q_maxima);
        let r = bryson_cost(&r_maxima);

        let mut b = DMatrix::<f64>::zeros(5, 2);
        b.slice_mut((3, 0), (2, 2)).copy_from(&plant.b);

        let gain_table = GainTable::build(max_velocity_ms, |velocity_ms| {
            let mut a = DMatrix::<f64>::zeros(5, 5);
            a[(0, 3)] = 0.5;
            a[(0, 4)] = 0.5;
            a[(1, 2)] = velocity_ms;
            a[(2, 3)] = -1.0 / trackwidth_m;
            a[(2, 4)] = 1.0 / trackwidth_m;
            a.slice_mut((3, 3), (2, 2)).copy_from(&plant.a);

            lqr_gain(&a, &b, &q, &r, dt_s)
        })?;

        Ok(Self {
            gain_table,
            feedforward,
            trackwidth_m,
            pose_error: Pose2d::default(),
            pose_tolerance: Pose2d::default(),
        })
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

    /// Get the next wheel voltages for the given current pose, measured
    /// wheel velocities, and reference: per side, the feedforward voltage
    /// for the reference wheel speed plus the feedback term.
    #[allow(clippy::too_many_arguments)]
    pub fn calculate(
        &mut self,
        current_pose: &Pose2d,
        left_velocity_ms: f64,
        right_velocity_ms: f64,
        pose_ref: &Pose2d,
        left_velocity_ref_ms: f64,
        right_velocity_ref_ms: f64,
    ) -> DifferentialDriveWheelVoltages {
        self.pose_error = pose_ref.relative_to(current_pose);

        let lookup_velocity_ms = 0.5 * (left_velocity_ref_ms + right_velocity_ref_ms);
        let k = self.gain_table.lookup(lookup_velocity_ms);

        let e = DVector::from_vec(vec![
            self.pose_error.x_m(),
            self.pose_error.y_m(),
            self.pose_error.rotation.radians(),
            left_velocity_ref_ms - left_velocity_ms,
            right_velocity_ref_ms - right_velocity_ms,
        ]);
        let u = k * e;

        DifferentialDriveWheelVoltages {
            left_v: self.feedforward.calculate_velocity(left_velocity_ref_ms) + u[0],
            right_v: self.feedforward.calculate_velocity(right_velocity_ref_ms) + u[1],
        }
    }

    /// Get the next wheel voltages for the given current pose,
    /// measured wheel velocities, and trajectory sample. The reference
    /// wheel velocities are derived from the sample's velocity and
    /// curvature through the trackwidth.
    pub fn calculate_state(
        &mut self,
        current_pose: &Pose2d,
        left_velocity_ms: f64,
        right_velocity_ms: f64,
        desired: &TrajectoryState,
    ) -> DifferentialDriveWheelVoltages {
        let omega_ref = desired.velocity_ms * desired.curvature_radpm;
        let left_ref_ms = desired.velocity_ms - omega_ref * self.trackwidth_m / 2.0;
        let right_ref_ms = desired.velocity_ms + omega_ref * self.trackwidth_m / 2.0;

        self.calculate(
            current_pose,
            left_velocity_ms,
            right_velocity_ms,
            &desired.pose,
            left_ref_ms,
            right_ref_ms,
        )
    }

    /// Get a telemetry snapshot of the controller.
    pub fn status(&self) -> LtvDifferentialDriveStatus {
        LtvDifferentialDriveStatus {
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
    use crate::geom::Rotation2d;

    fn test_feedforward() -> SimpleMotorFeedforward {
        SimpleMotorFeedforward::new(0.5, 1.98, 0.2)
    }

    fn test_controller() -> LtvDifferentialDriveController {
        let plant = DrivetrainPlant::identify(1.98, 0.2, 1.5, 0.3).unwrap();
        LtvDifferentialDriveController::new(
            &plant,
            test_feedforward(),
            0.6,
            [0.0625, 0.125, 2.5, 0.95, 0.95],
            [12.0, 12.0],
            0.02,
            2.0,
        )
        .unwrap()
    }

    #[test]
    fn test_identify_rejects_bad_gains() {
        assert!(DrivetrainPlant::identify(0.0, 0.2, 1.5, 0.3).is_err());
        assert!(DrivetrainPlant::identify(1.98, -0.2, 1.5, 0.3).is_err());
        assert!(DrivetrainPlant::identify(1.98, 0.2, f64::NAN, 0.3).is_err());
    }

    #[test]
    fn test_identify_plant_structure() {
        // With equal linear and angular modes the sides decouple
        let plant = DrivetrainPlant::identify(2.0, 0.5, 2.0, 0.5).unwrap();
        assert!((plant.a[(0, 1)]).abs() < 1e-12);
        assert!((plant.b[(0, 1)]).abs() < 1e-12);
        assert!((plant.a[(0, 0)] + 4.0).abs() < 1e-12);
        assert!((plant.b[(0, 0)] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_on_reference_outputs_feedforward_voltage() {
        let mut ctrl = test_controller();
        let pose = Pose2d::new(1.0, 2.0, Rotation2d::new(0.4));

        // With zero error the feedback term vanishes, leaving the
        // sustaining voltage for 1 m/s on each side
        let sustaining_v = test_feedforward().calculate_velocity(1.0);
        let voltages = ctrl.calculate(&pose, 1.0, 1.0, &pose, 1.0, 1.0);
        assert!((voltages.left_v - sustaining_v).abs() < 1e-9);
        assert!((voltages.right_v - sustaining_v).abs() < 1e-9);
        assert!(sustaining_v > 0.0);
    }

    #[test]
    fn test_at_rest_on_reference_outputs_zero() {
        let mut ctrl = test_controller();
        let pose = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));

        let voltages = ctrl.calculate(&pose, 0.0, 0.0, &pose, 0.0, 0.0);
        assert!(voltages.left_v.abs() < 1e-9);
        assert!(voltages.right_v.abs() < 1e-9);
    }

    #[test]
    fn test_lagging_robot_gets_voltage_above_feedforward() {
        let mut ctrl = test_controller();
        let current = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));
        let reference = Pose2d::new(0.3, 0.0, Rotation2d::new(0.0));

        let sustaining_v = test_feedforward().calculate_velocity(1.0);
        let voltages = ctrl.calculate(&current, 1.0, 1.0, &reference, 1.0, 1.0);
        assert!(voltages.left_v > sustaining_v);
        assert!(voltages.right_v > sustaining_v);
    }

    #[test]
    fn test_wheel_velocity_error_feedback() {
        let mut ctrl = test_controller();
        let pose = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));

        // Left wheel slower than reference, right on target
        let sustaining_v = test_feedforward().calculate_velocity(1.0);
        let voltages = ctrl.calculate(&pose, 0.5, 1.0, &pose, 1.0, 1.0);
        assert!(voltages.left_v > sustaining_v);
    }

    #[test]
    fn test_at_reference_uses_tolerance() {
        let mut ctrl = test_controller();
        ctrl.set_tolerance(Pose2d::new(0.05, 0.05, Rotation2d::new(0.05)));

        let pose = Pose2d::new(0.0, 0.0, Rotation2d::new(0.0));
        ctrl.calculate(&pose, 1.0, 1.0, &pose, 1.0, 1.0);
        assert!(ctrl.at_reference());

        let reference = Pose2d::new(1.0, 0.0, Rotation2d::new(0.0));
        ctrl.calculate(&pose, 1.0, 1.0, &reference, 1.0, 1.0);
        assert!(!ctrl.at_reference());
    }
}
