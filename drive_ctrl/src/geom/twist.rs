//! Planar twist

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::ops::Mul;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A change in distance along an arc.
///
/// A twist is the infinitesimal motion `(dx, dy, dtheta)` of a pose, and is
/// what a robot-frame velocity command becomes once integrated over a control
/// period. [`Pose2d::exp`](super::Pose2d::exp) applies a twist to a pose.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct Twist2d {
    /// Linear "dx" component, in meters
    pub dx_m: f64,

    /// Linear "dy" component, in meters
    pub dy_m: f64,

    /// Angular "dtheta" component, in radians
    pub dtheta_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Twist2d {
    /// Create a new twist from its components.
    pub fn new(dx_m: f64, dy_m: f64, dtheta_rad: f64) -> Self {
        Self {
            dx_m,
            dy_m,
            dtheta_rad,
        }
    }
}

impl Mul<f64> for Twist2d {
    type Output = Twist2d;

    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(
            self.dx_m * scalar,
            self.dy_m * scalar,
            self.dtheta_rad * scalar,
        )
    }
}
