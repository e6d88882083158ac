//! Chassis-frame velocity command

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A robot-frame velocity command.
///
/// `vx` points out the front of the robot, `vy` out its left side, and
/// `omega` is counter-clockwise positive. Non-holonomic drivetrains simply
/// never produce or consume a nonzero `vy`.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct ChassisSpeeds {
    /// Forward velocity
    pub vx_ms: f64,

    /// Sideways (leftward) velocity
    pub vy_ms: f64,

    /// Counter-clockwise angular velocity
    pub omega_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisSpeeds {
    /// Create a new chassis speeds command.
    pub fn new(vx_ms: f64, vy_ms: f64, omega_rads: f64) -> Self {
        Self {
            vx_ms,
            vy_ms,
            omega_rads,
        }
    }
}
