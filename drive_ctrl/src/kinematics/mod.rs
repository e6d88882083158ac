//! # Kinematics module
//!
//! Stateless conversions between a chassis-frame velocity command and
//! per-wheel commands, one submodule per drivetrain topology (differential,
//! mecanum, swerve).
//!
//! All conversions are pure functions of the wheel geometry fixed at
//! construction. Degenerate geometry (zero trackwidth, collinear wheel
//! positions) is rejected when the kinematics object is built, so no
//! conversion can divide by zero at call time. Each wheel speed struct
//! provides `desaturate`, which uniformly scales every wheel down (never up)
//! so the largest magnitude meets an attainable maximum while the ratios
//! between wheels are preserved.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod chassis_speeds;
mod differential;
mod mecanum;
mod swerve;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use chassis_speeds::*;
pub use differential::*;
pub use mecanum::*;
pub use swerve::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised when constructing a kinematics object.
#[derive(Debug, thiserror::Error)]
pub enum KinematicsError {
    /// The wheel geometry cannot resolve all three chassis degrees of
    /// freedom, for example a zero trackwidth or collinear module positions.
    #[error("Degenerate drivetrain geometry: {0}")]
    DegenerateGeometry(String),
}
