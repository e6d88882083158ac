//! Mecanum drive kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Matrix3x4, Matrix4x3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

// Internal
use super::{ChassisSpeeds, KinematicsError};
use crate::geom::Translation2d;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematics for a mecanum drivetrain.
///
/// The inverse kinematics are a fixed 4x3 matrix determined by the wheel
/// positions; the forward direction uses its pseudo-inverse, precomputed at
/// construction, which gives the least-squares chassis velocity for any
/// (possibly inconsistent) set of wheel speeds.
#[derive(Debug, Clone)]
pub struct MecanumDriveKinematics {
    /// Maps a chassis velocity onto the four wheel speeds
    inverse_kinematics: Matrix4x3<f64>,

    /// Pseudo-inverse of `inverse_kinematics`
    forward_kinematics: Matrix3x4<f64>,
}

/// Per-wheel speeds of a mecanum drivetrain.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct MecanumDriveWheelSpeeds {
    /// Front left wheel speed
    pub front_left_ms: f64,

    /// Front right wheel speed
    pub front_right_ms: f64,

    /// Rear left wheel speed
    pub rear_left_ms: f64,

    /// Rear right wheel speed
    pub rear_right_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MecanumDriveKinematics {
    /// Create kinematics from the four wheel positions, given in the robot
    /// frame relative to the centre of rotation.
    ///
    /// Wheel placements whose kinematics matrix loses rank (all three chassis
    /// degrees of freedom are no longer observable from the wheels) are
    /// rejected here rather than at call time.
    pub fn new(
        front_left: Translation2d,
        front_right: Translation2d,
        rear_left: Translation2d,
        rear_right: Translation2d,
    ) -> Result<Self, KinematicsError> {
        // Rows follow the roller angles: the +/-45 degree rollers couple vy
        // into each wheel with alternating sign
        let inverse_kinematics = Matrix4x3::new(
            1.0, -1.0, -(front_left.x_m + front_left.y_m),
            1.0, 1.0, front_right.x_m - front_right.y_m,
            1.0, 1.0, rear_left.x_m - rear_left.y_m,
            1.0, -1.0, -(rear_right.x_m + rear_right.y_m),
        );

        if inverse_kinematics.clone_owned().rank(1e-9) < 3 {
            return Err(KinematicsError::DegenerateGeometry(
                "mecanum wheel positions do not span all chassis degrees of freedom".to_string(),
            ));
        }

        let forward_kinematics = inverse_kinematics
            .clone_owned()
            .pseudo_inverse(1e-9)
            .map_err(|e| KinematicsError::DegenerateGeometry(e.to_string()))?;

        Ok(Self {
            inverse_kinematics,
            forward_kinematics,
        })
    }

    /// Convert a chassis velocity into the four wheel speeds.
    pub fn to_wheel_speeds(&self, speeds: &ChassisSpeeds) -> MecanumDriveWheelSpeeds {
        let chassis = Vector3::new(speeds.vx_ms, speeds.vy_ms, speeds.omega_rads);
        let wheels = self.inverse_kinematics * chassis;

        MecanumDriveWheelSpeeds {
            front_left_ms: wheels[0],
            front_right_ms: wheels[1],
            rear_left_ms: wheels[2],
            rear_right_ms: wheels[3],
        }
    }

    /// Convert four wheel speeds into the chassis velocity.
    pub fn to_chassis_speeds(&self, wheel_speeds: &MecanumDriveWheelSpeeds) -> ChassisSpeeds {
        let wheels = Vector4::new(
            wheel_speeds.front_left_ms,
            wheel_speeds.front_right_ms,
            wheel_speeds.rear_left_ms,
            wheel_speeds.rear_right_ms,
        );
        let chassis = self.forward_kinematics * wheels;

        ChassisSpeeds {
            vx_ms: chassis[0],
            vy_ms: chassis[1],
            omega_rads: chassis[2],
        }
    }
}

impl MecanumDriveWheelSpeeds {
    /// Scale all four wheel speeds down so none exceeds the attainable
    /// maximum, preserving their ratios. Never scales up.
    pub fn desaturate(&mut self, attainable_max_speed_ms: f64) {
        let real_max = self
            .front_left_ms
            .abs()
            .max(self.front_right_ms.abs())
            .max(self.rear_left_ms.abs())
            .max(self.rear_right_ms.abs());

        if real_max > attainable_max_speed_ms {
            let scale = attainable_max_speed_ms / real_max;
            self.front_left_ms *= scale;
            self.front_right_ms *= scale;
            self.rear_left_ms *= scale;
            self.rear_right_ms *= scale;
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
