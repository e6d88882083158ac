//! Planar rotation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

// Internal
use util::maths::epsilon_eq;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A rotation in the plane.
///
/// The rotation is stored as its cosine and sine rather than a raw angle, so
/// that composing rotations stays numerically stable across the +/-pi
/// wraparound.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Rotation2d {
    /// Cosine of the rotation
    cos: f64,

    /// Sine of the rotation
    sin: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Rotation2d {
    /// Create a new rotation from an angle in radians.
    pub fn new(angle_rad: f64) -> Self {
        Self {
            cos: angle_rad.cos(),
            sin: angle_rad.sin(),
        }
    }

    /// Create a new rotation from raw cosine and sine components.
    ///
    /// The components are normalised onto the unit circle. A near-zero
    /// component pair is treated as the identity rotation rather than
    /// producing a division by zero.
    pub fn from_components(cos: f64, sin: f64) -> Self {
        let magnitude = cos.hypot(sin);

        if magnitude > 1e-6 {
            Self {
                cos: cos / magnitude,
                sin: sin / magnitude,
            }
        } else {
            Self { cos: 1.0, sin: 0.0 }
        }
    }

    /// Get the angle of the rotation in radians, in the range `[-pi, pi]`.
    pub fn radians(&self) -> f64 {
        self.sin.atan2(self.cos)
    }

    /// Get the angle of the rotation in degrees.
    pub fn degrees(&self) -> f64 {
        self.radians().to_degrees()
    }

    /// Get the cosine of the rotation.
    pub fn cos(&self) -> f64 {
        self.cos
    }

    /// Get the sine of the rotation.
    pub fn sin(&self) -> f64 {
        self.sin
    }

    /// Compose this rotation with another.
    ///
    /// This is done with the rotation matrix product rather than by adding
    /// angles, which keeps the result exact across wraparound.
    pub fn rotate_by(&self, other: &Rotation2d) -> Self {
        Self::from_components(
            self.cos * other.cos - self.sin * other.sin,
            self.cos * other.sin + self.sin * other.cos,
        )
    }

    /// True if the two rotations are within `epsilon` of each other, measured
    /// on the unit circle.
    pub fn epsilon_eq(&self, other: &Rotation2d, epsilon: f64) -> bool {
        epsilon_eq(
            (self.cos - other.cos).hypot(self.sin - other.sin),
            0.0,
            epsilon,
        )
    }
}

impl Default for Rotation2d {
    fn default() -> Self {
        Self { cos: 1.0, sin: 0.0 }
    }
}

impl Add for Rotation2d {
    type Output = Rotation2d;

    fn add(self, rhs: Rotation2d) -> Self::Output {
        self.rotate_by(&rhs)
    }
}

impl Sub for Rotation2d {
    type Output = Rotation2d;

    fn sub(self, rhs: Rotation2d) -> Self::Output {
        self.rotate_by(&-rhs)
    }
}

impl Neg for Rotation2d {
    type Output = Rotation2d;

    fn neg(self) -> Self::Output {
        Self {
            cos: self.cos,
            sin: -self.sin,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
