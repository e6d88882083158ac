//! Differential drive kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::{ChassisSpeeds, KinematicsError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematics for a differential (tank) drivetrain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifferentialDriveKinematics {
    /// Distance between the left and right wheel centrelines
    trackwidth_m: f64,
}

/// Per-side wheel speeds of a differential drivetrain.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct DifferentialDriveWheelSpeeds {
    /// Left side speed
    pub left_ms: f64,

    /// Right side speed
    pub right_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DifferentialDriveKinematics {
    /// Create kinematics for the given trackwidth.
    ///
    /// A non-positive or non-finite trackwidth cannot resolve the angular
    /// degree of freedom and is rejected here rather than at call time.
    pub fn new(trackwidth_m: f64) -> Result<Self, KinematicsError> {
        if !trackwidth_m.is_finite() || trackwidth_m <= 0.0 {
            return Err(KinematicsError::DegenerateGeometry(format!(
                "trackwidth must be positive and finite, got {}",
                trackwidth_m
            )));
        }

        Ok(Self { trackwidth_m })
    }

    /// Get the trackwidth the kinematics were built with.
    pub fn trackwidth_m(&self) -> f64 {
        self.trackwidth_m
    }

    /// Convert a chassis velocity into per-side wheel speeds.
    ///
    /// The `vy` component of the command is unreachable for this topology and
    /// is ignored.
    pub fn to_wheel_speeds(&self, speeds: &ChassisSpeeds) -> DifferentialDriveWheelSpeeds {
        DifferentialDriveWheelSpeeds {
            left_ms: speeds.vx_ms - speeds.omega_rads * self.trackwidth_m / 2.0,
            right_ms: speeds.vx_ms + speeds.omega_rads * self.trackwidth_m / 2.0,
        }
    }

    /// Convert per-side wheel speeds into a chassis velocity.
    pub fn to_chassis_speeds(&self, wheel_speeds: &DifferentialDriveWheelSpeeds) -> ChassisSpeeds {
        ChassisSpeeds {
            vx_ms: (wheel_speeds.left_ms + wheel_speeds.right_ms) / 2.0,
            vy_ms: 0.0,
            omega_rads: (wheel_speeds.right_ms - wheel_speeds.left_ms) / self.trackwidth_m,
        }
    }
}

impl DifferentialDriveWheelSpeeds {
    /// Scale both wheel speeds down so neither exceeds the attainable
    /// maximum, preserving their ratio.
    ///
    /// Speeds already within the limit are left untouched, so desaturating
    /// twice is the same as desaturating once.
    pub fn desaturate(&mut self, attainable_max_speed_ms: f64) {
        let real_max = self.left_ms.abs().max(self.right_ms.abs());

        if real_max > attainable_max_speed_ms {
            let scale = attainable_max_speed_ms / real_max;
            self.left_ms *= scale;
            self.right_ms *= scale;
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
