//! Planar translation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

// Internal
use super::Rotation2d;
use util::maths::epsilon_eq;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A translation in the plane, in meters.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct Translation2d {
    /// The X component of the translation
    pub x_m: f64,

    /// The Y component of the translation
    pub y_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Translation2d {
    /// Create a new translation from its components.
    pub fn new(x_m: f64, y_m: f64) -> Self {
        Self { x_m, y_m }
    }

    /// Get the distance of the translation from the origin.
    pub fn norm_m(&self) -> f64 {
        self.x_m.hypot(self.y_m)
    }

    /// Get the distance between this translation and another.
    pub fn distance_to_m(&self, other: &Translation2d) -> f64 {
        (*other - *self).norm_m()
    }

    /// Rotate the translation about the origin.
    pub fn rotate_by(&self, rotation: &Rotation2d) -> Self {
        Self {
            x_m: self.x_m * rotation.cos() - self.y_m * rotation.sin(),
            y_m: self.x_m * rotation.sin() + self.y_m * rotation.cos(),
        }
    }

    /// True if both components are within `epsilon` of the other translation.
    pub fn epsilon_eq(&self, other: &Translation2d, epsilon: f64) -> bool {
        epsilon_eq(self.x_m, other.x_m, epsilon) && epsilon_eq(self.y_m, other.y_m, epsilon)
    }
}

impl Add for Translation2d {
    type Output = Translation2d;

    fn add(self, rhs: Translation2d) -> Self::Output {
        Self::new(self.x_m + rhs.x_m, self.y_m + rhs.y_m)
    }
}

impl Sub for Translation2d {
    type Output = Translation2d;

    fn sub(self, rhs: Translation2d) -> Self::Output {
        Self::new(self.x_m - rhs.x_m, self.y_m - rhs.y_m)
    }
}

impl Neg for Translation2d {
    type Output = Translation2d;

    fn neg(self) -> Self::Output {
        Self::new(-self.x_m, -self.y_m)
    }
}

impl Mul<f64> for Translation2d {
    type Output = Translation2d;

    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.x_m * scalar, self.y_m * scalar)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
