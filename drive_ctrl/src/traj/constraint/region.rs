//! Region-gated constraint wrappers

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::geom::{Pose2d, Rotation2d, Translation2d};

use super::{MinMaxAcceleration, TrajectoryConstraint};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Slack on the boundary test. Points exactly on the boundary count as
/// inside under floating-point noise.
const BOUNDARY_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Applies an inner constraint only while the pose lies within an ellipse,
/// boundary included. Outside the region the wrapper is transparent.
#[derive(Debug, Clone)]
pub struct EllipticalRegionConstraint<C: TrajectoryConstraint> {
    center: Translation2d,
    rotation: Rotation2d,

    /// Semi-axis along the ellipse's rotated X direction
    x_semi_axis_m: f64,

    /// Semi-axis along the ellipse's rotated Y direction
    y_semi_axis_m: f64,

    constraint: C,
}

/// Applies an inner constraint only while the pose lies within an
/// axis-aligned rectangle, boundary included.
#[derive(Debug, Clone)]
pub struct RectangularRegionConstraint<C: TrajectoryConstraint> {
    bottom_left: Translation2d,
    top_right: Translation2d,
    constraint: C,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<C: TrajectoryConstraint> EllipticalRegionConstraint<C> {
    /// Create a new region from its center, full width and height, and the
    /// rotation of its axes.
    pub fn new(
        center: Translation2d,
        x_width_m: f64,
        y_height_m: f64,
        rotation: Rotation2d,
        constraint: C,
    ) -> Self {
        Self {
            center,
            rotation,
            x_semi_axis_m: x_width_m.abs() / 2.0,
            y_semi_axis_m: y_height_m.abs() / 2.0,
            constraint,
        }
    }

    /// True if the pose's translation lies inside or on the ellipse.
    pub fn is_pose_in_region(&self, pose: &Pose2d) -> bool {
        // Express the query point in the ellipse's own frame
        let local = (pose.translation - self.center).rotate_by(&-self.rotation);

        let x_norm = local.x_m / self.x_semi_axis_m;
        let y_norm = local.y_m / self.y_semi_axis_m;

        x_norm * x_norm + y_norm * y_norm <= 1.0 + BOUNDARY_EPSILON
    }
}

impl<C: TrajectoryConstraint> TrajectoryConstraint for EllipticalRegionConstraint<C> {
    fn max_velocity_ms(&self, pose: &Pose2d, curvature_radpm: f64, velocity_ms: f64) -> f64 {
        if self.is_pose_in_region(pose) {
            self.constraint
                .max_velocity_ms(pose, curvature_radpm, velocity_ms)
        } else {
            velocity_ms
        }
    }

    fn min_max_acceleration(
        &self,
        pose: &Pose2d,
        curvature_radpm: f64,
        speed_ms: f64,
    ) -> MinMaxAcceleration {
        if self.is_pose_in_region(pose) {
            self.constraint
                .min_max_acceleration(pose, curvature_radpm, speed_ms)
        } else {
            MinMaxAcceleration::default()
        }
    }
}

impl<C: TrajectoryConstraint> RectangularRegionConstraint<C> {
    /// Create a new region from its bottom-left and top-right corners.
    pub fn new(bottom_left: Translation2d, top_right: Translation2d, constraint: C) -> Self {
        Self {
            bottom_left,
            top_right,
            constraint,
        }
    }

    /// True if the pose's translation lies inside or on the rectangle.
    pub fn is_pose_in_region(&self, pose: &Pose2d) -> bool {
        pose.x_m() >= self.bottom_left.x_m - BOUNDARY_EPSILON
            && pose.x_m() <= self.top_right.x_m + BOUNDARY_EPSILON
            && pose.y_m() >= self.bottom_left.y_m - BOUNDARY_EPSILON
            && pose.y_m() <= self.top_right.y_m + BOUNDARY_EPSILON
    }
}

impl<C: TrajectoryConstraint> TrajectoryConstraint for RectangularRegionConstraint<C> {
    fn max_velocity_ms(&self, pose: &Pose2d, curvature_radpm: f64, velocity_ms: f64) -> f64 {
        if self.is_pose_in_region(pose) {
            self.constraint
                .max_velocity_ms(pose, curvature_radpm, velocity_ms)
        } else {
            velocity_ms
        }
    }

    fn min_max_acceleration(
        &self,
        pose: &Pose2d,
        curvature_radpm: f64,
        speed_ms: f64,
    ) -> MinMaxAcceleration {
        if self.is_pose_in_region(pose) {
            self.constraint
                .min_max_acceleration(pose, curvature_radpm, speed_ms)
        } else {
            MinMaxAcceleration::default()
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
