//! Time-parameterized trajectory representation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::geom::Pose2d;
use util::maths::interpolate;

use super::TrajectoryError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single sample of a trajectory.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct TrajectoryState {
    /// Time since the start of the trajectory
    pub time_s: f64,

    /// Signed velocity at this sample. Negative for a reversed (driving
    /// backwards) trajectory.
    pub velocity_ms: f64,

    /// Signed acceleration at this sample
    pub acceleration_mss: f64,

    /// Pose at this sample
    pub pose: Pose2d,

    /// Signed curvature at this sample
    pub curvature_radpm: f64,
}

/// A time-ordered sequence of trajectory states.
///
/// Built once by the parameterizer, then only sampled. Sampling at an
/// arbitrary time interpolates between the bracketing stored states using
/// the constant-acceleration profile between them, so the returned pose
/// sits at the correct arc length rather than at a naive linear blend of
/// timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    states: Vec<TrajectoryState>,

    total_time_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryState {
    /// Interpolate between this state and `end` at fraction `t` in [0, 1]
    /// of the time between them.
    pub fn interpolate(&self, end: &TrajectoryState, t: f64) -> TrajectoryState {
        let new_time_s = interpolate(self.time_s, end.time_s, t);
        let delta_t_s = new_time_s - self.time_s;

        // Sampling backwards from the end state is the same interpolation
        // mirrored
        if delta_t_s < 0.0 {
            return end.interpolate(self, 1.0 - t);
        }

        let reversing = self.velocity_ms < 0.0
            || (self.velocity_ms.abs() < 1e-9 && self.acceleration_mss < 0.0);

        // Constant-acceleration profile between the two stored states
        let new_velocity_ms = self.velocity_ms + self.acceleration_mss * delta_t_s;
        let new_distance_m = self.velocity_ms * delta_t_s
            + 0.5 * self.acceleration_mss * delta_t_s * delta_t_s;

        let signed_distance_m = if reversing {
            -new_distance_m
        } else {
            new_distance_m
        };

        let total_distance_m = self
            .pose
            .translation
            .distance_to_m(&end.pose.translation);

        let interpolation_frac = if total_distance_m < 1e-9 {
            // Coincident poses, nothing spatial to interpolate
            0.0
        } else {
            signed_distance_m.abs() / total_distance_m
        };

        TrajectoryState {
            time_s: new_time_s,
            velocity_ms: new_velocity_ms,
            acceleration_mss: self.acceleration_mss,
            pose: self.pose.interpolate(&end.pose, interpolation_frac),
            curvature_radpm: interpolate(
                self.curvature_radpm,
                end.curvature_radpm,
                interpolation_frac,
            ),
        }
    }
}

impl Trajectory {
    /// Create a trajectory from a list of states.
    ///
    /// The list must be non-empty and in non-decreasing time order. Equal
    /// timestamps are allowed; sampling at one resolves to the later state.
    pub fn new(states: Vec<TrajectoryState>) -> Result<Self, TrajectoryError> {
        if states.is_empty() {
            return Err(TrajectoryError::EmptyTrajectory);
        }

        if states.windows(2).any(|w| w[1].time_s < w[0].time_s) {
            return Err(TrajectoryError::NotTimeOrdered);
        }

        let total_time_s = states.last().unwrap().time_s;

        Ok(Self {
            states,
            total_time_s,
        })
    }

    /// Get the stored states.
    pub fn states(&self) -> &[TrajectoryState] {
        &self.states
    }

    /// Get the total duration of the trajectory.
    pub fn total_time_s(&self) -> f64 {
        self.total_time_s
    }

    /// Get the pose of the first state.
    pub fn initial_pose(&self) -> Pose2d {
        self.states[0].pose
    }

    /// Sample the trajectory at the given time.
    ///
    /// Times before the first state return the first state; times past the
    /// end return the last.
    pub fn sample(&self, time_s: f64) -> TrajectoryState {
        if time_s <= self.states[0].time_s {
            return self.states[0];
        }
        if time_s >= self.total_time_s {
            return *self.states.last().unwrap();
        }

        // First state with a timestamp strictly after the sample time
        let upper = self.states.partition_point(|s| s.time_s <= time_s);
        let prev = &self.states[upper - 1];
        let next = &self.states[upper];

        if (next.time_s - prev.time_s).abs() < 1e-9 {
            return *next;
        }

        prev.interpolate(
            next,
            (time_s - prev.time_s) / (next.time_s - prev.time_s),
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::Rotation2d;

    fn state(time_s: f64, velocity_ms: f64, accel_mss: f64, x_m: f64) -> TrajectoryState {
        TrajectoryState {
            time_s,
            velocity_ms,
            acceleration_mss: accel_mss,
            pose: Pose2d::new(x_m, 0.0, Rotation2d::new(0.0)),
            curvature_radpm: 0.0,
        }
    }

    // Constant 1 m/s straight line along X for 2 s
    fn straight_trajectory() -> Trajectory {
        Trajectory::new(vec![
            state(0.0, 1.0, 0.0, 0.0),
            state(1.0, 1.0, 0.0, 1.0),
            state(2.0, 1.0, 0.0, 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            Trajectory::new(vec![]),
            Err(TrajectoryError::EmptyTrajectory)
        ));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let result = Trajectory::new(vec![state(1.0, 1.0, 0.0, 0.0), state(0.5, 1.0, 0.0, 1.0)]);
        assert!(matches!(result, Err(TrajectoryError::NotTimeOrdered)));
    }

    #[test]
    fn test_equal_timestamps_accepted() {
        let traj = Trajectory::new(vec![
            state(0.0, 1.0, 0.0, 0.0),
            state(1.0, 1.0, 0.0, 1.0),
            state(1.0, 1.0, 0.0, 1.5),
            state(2.0, 1.0, 0.0, 2.5),
        ])
        .unwrap();

        // Sampling at the duplicate resolves to the later state
        assert!((traj.sample(1.0).pose.x_m() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_sample_clamps_to_ends() {
        let traj = straight_trajectory();

        assert_eq!(traj.sample(-1.0).pose.x_m(), 0.0);
        assert_eq!(traj.sample(10.0).pose.x_m(), 2.0);
    }

    #[test]
    fn test_sample_interpolates_position() {
        let traj = straight_trajectory();

        let sample = traj.sample(0.5);
        assert!((sample.pose.x_m() - 0.5).abs() < 1e-9);
        assert!((sample.velocity_ms - 1.0).abs() < 1e-9);

        let sample = traj.sample(1.25);
        assert!((sample.pose.x_m() - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_sample_accelerating_segment() {
        // From rest at 1 m/s^2: after 0.5 s, v = 0.5 m/s and s = 0.125 m
        let traj = Trajectory::new(vec![
            state(0.0, 0.0, 1.0, 0.0),
            state(1.0, 1.0, 1.0, 0.5),
        ])
        .unwrap();

        let sample = traj.sample(0.5);
        assert!((sample.velocity_ms - 0.5).abs() < 1e-9);
        assert!((sample.pose.x_m() - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_reversed_trajectory_moves_backwards() {
        let traj = Trajectory::new(vec![
            state(0.0, -1.0, 0.0, 0.0),
            state(1.0, -1.0, 0.0, -1.0),
        ])
        .unwrap();

        let sample = traj.sample(0.5);
        assert!((sample.pose.x_m() + 0.5).abs() < 1e-9);
        assert!(sample.velocity_ms < 0.0);
    }

    #[test]
    fn test_total_time() {
        assert_eq!(straight_trajectory().total_time_s(), 2.0);
    }

    #[test]
    fn test_json_round_trip() {
        let traj = straight_trajectory();

        let json = serde_json::to_string(&traj).unwrap();
        let loaded: Trajectory = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.states().len(), traj.states().len());
        assert_eq!(loaded.total_time_s(), traj.total_time_s());
        assert!(loaded
            .sample(1.5)
            .pose
            .epsilon_eq(&traj.sample(1.5).pose, 1e-9));
    }
}
