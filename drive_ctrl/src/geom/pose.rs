//! Planar pose

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::{Rotation2d, Translation2d, Twist2d};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A pose (position and heading) in the plane.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct Pose2d {
    /// The position of the pose
    pub translation: Translation2d,

    /// The heading of the pose
    pub rotation: Rotation2d,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2d {
    /// Create a new pose from position components and a heading.
    pub fn new(x_m: f64, y_m: f64, rotation: Rotation2d) -> Self {
        Self {
            translation: Translation2d::new(x_m, y_m),
            rotation,
        }
    }

    /// Create a new pose from a translation and a rotation.
    pub fn from_parts(translation: Translation2d, rotation: Rotation2d) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Get the X component of the pose's position.
    pub fn x_m(&self) -> f64 {
        self.translation.x_m
    }

    /// Get the Y component of the pose's position.
    pub fn y_m(&self) -> f64 {
        self.translation.y_m
    }

    /// Compose this pose with a relative pose expressed in this pose's frame.
    pub fn compose(&self, other: &Pose2d) -> Self {
        Self {
            translation: self.translation + other.translation.rotate_by(&self.rotation),
            rotation: self.rotation + other.rotation,
        }
    }

    /// Get the inverse of this pose under composition.
    pub fn inverse(&self) -> Self {
        let rotation = -self.rotation;
        Self {
            translation: (-self.translation).rotate_by(&rotation),
            rotation,
        }
    }

    /// Express this pose relative to another pose.
    ///
    /// The result is this pose as seen from `other`'s frame, which is exactly
    /// the pose error used by the path tracking controllers when `self` is
    /// the reference and `other` the current pose.
    pub fn relative_to(&self, other: &Pose2d) -> Self {
        Self {
            translation: (self.translation - other.translation).rotate_by(&-other.rotation),
            rotation: self.rotation - other.rotation,
        }
    }

    /// Apply a twist to this pose, following the constant-curvature arc the
    /// twist describes.
    ///
    /// Near-zero `dtheta` falls back on the Taylor expansions of `sin(x)/x`
    /// and `(1 - cos(x))/x` so that a pure translation never divides by zero.
    pub fn exp(&self, twist: &Twist2d) -> Self {
        let dtheta = twist.dtheta_rad;
        let sin_theta = dtheta.sin();
        let cos_theta = dtheta.cos();

        let (s, c) = if dtheta.abs() < 1e-9 {
            (1.0 - dtheta * dtheta / 6.0, 0.5 * dtheta)
        } else {
            (sin_theta / dtheta, (1.0 - cos_theta) / dtheta)
        };

        let transform = Pose2d::from_parts(
            Translation2d::new(
                twist.dx_m * s - twist.dy_m * c,
                twist.dx_m * c + twist.dy_m * s,
            ),
            Rotation2d::from_components(cos_theta, sin_theta),
        );

        self.compose(&transform)
    }

    /// Get the twist which maps this pose onto `end`, the inverse of
    /// [`Pose2d::exp`].
    pub fn log(&self, end: &Pose2d) -> Twist2d {
        let transform = end.relative_to(self);
        let dtheta = transform.rotation.radians();
        let half_dtheta = dtheta / 2.0;

        let cos_minus_one = transform.rotation.cos() - 1.0;

        let halftheta_by_tan_of_halfdtheta = if cos_minus_one.abs() < 1e-9 {
            1.0 - dtheta * dtheta / 12.0
        } else {
            -(half_dtheta * transform.rotation.sin()) / cos_minus_one
        };

        let translation_part = transform
            .translation
            .rotate_by(&Rotation2d::from_components(
                halftheta_by_tan_of_halfdtheta,
                -half_dtheta,
            ))
            * halftheta_by_tan_of_halfdtheta.hypot(half_dtheta);

        Twist2d::new(translation_part.x_m, translation_part.y_m, dtheta)
    }

    /// Interpolate between this pose and `end` along the constant-twist arc
    /// joining them. `t` is clamped into `[0, 1]`.
    pub fn interpolate(&self, end: &Pose2d, t: f64) -> Self {
        let t = clamp(t, 0.0, 1.0);
        self.exp(&(self.log(end) * t))
    }

    /// True if the two poses are within `epsilon` of each other in both
    /// position and heading.
    pub fn epsilon_eq(&self, other: &Pose2d, epsilon: f64) -> bool {
        self.translation.epsilon_eq(&other.translation, epsilon)
            && self.rotation.epsilon_eq(&other.rotation, epsilon)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_compose_inverse_roundtrip() {
        let pose = Pose2d::new(1.0, 2.0, Rotation2d::new(0.5));
        let identity = pose.compose(&pose.inverse());

        assert!(identity.epsilon_eq(&Pose2d::default(), 1e-9));
    }

    #[test]
    fn test_relative_to() {
        let reference = Pose2d::new(1.0, 1.0, Rotation2d::new(90f64.to_radians()));
        let current = Pose2d::new(1.0, 0.0, Rotation2d::new(90f64.to_radians()));

        // From the current pose, facing +Y, the reference is one meter dead
        // ahead
        let error = reference.relative_to(&current);
        assert!(error.epsilon_eq(&Pose2d::new(1.0, 0.0, Rotation2d::default()), 1e-9));
    }

    #[test]
    fn test_exp_straight_line() {
        let pose = Pose2d::new(0.0, 0.0, Rotation2d::new(90f64.to_radians()));
        let moved = pose.exp(&Twist2d::new(2.0, 0.0, 0.0));

        assert!(moved.epsilon_eq(&Pose2d::new(0.0, 2.0, Rotation2d::new(90f64.to_radians())), 1e-9));
    }

    #[test]
    fn test_exp_quarter_arc() {
        // Drive a quarter circle of radius 1: arc length pi/2, turn pi/2
        let pose = Pose2d::default();
        let quarter = std::f64::consts::FRAC_PI_2;
        let moved = pose.exp(&Twist2d::new(quarter, 0.0, quarter));

        assert!(moved.epsilon_eq(&Pose2d::new(1.0, 1.0, Rotation2d::new(quarter)), 1e-9));
    }

    #[test]
    fn test_log_is_exp_inverse() {
        let start = Pose2d::new(1.0, -2.0, Rotation2d::new(0.3));
        let end = Pose2d::new(4.0, 5.0, Rotation2d::new(-1.2));

        let twist = start.log(&end);
        assert!(start.exp(&twist).epsilon_eq(&end, 1e-9));
    }

    #[test]
    fn test_interpolate_endpoints_clamped() {
        let start = Pose2d::default();
        let end = Pose2d::new(2.0, 0.0, Rotation2d::default());

        assert!(start.interpolate(&end, -0.5).epsilon_eq(&start, 1e-9));
        assert!(start.interpolate(&end, 1.5).epsilon_eq(&end, 1e-9));
        assert!(start
            .interpolate(&end, 0.5)
            .epsilon_eq(&Pose2d::new(1.0, 0.0, Rotation2d::default()), 1e-9));
    }
}
