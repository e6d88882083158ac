//! Trapezoidal motion profile

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::{Deserialize, Serialize};

// Internal
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Velocity and acceleration limits of a trapezoid profile.
///
/// Units are whatever the caller profiles in (meters and meters/second,
/// radians and radians/second, ...), as long as they are consistent.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct TrapezoidConstraints {
    /// Maximum velocity magnitude
    max_velocity: f64,

    /// Maximum acceleration magnitude
    max_acceleration: f64,
}

/// A (position, velocity) state along a profile.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileState {
    /// Position at this state
    pub position: f64,

    /// Velocity at this state
    pub velocity: f64,
}

/// A trapezoid-shaped velocity profile.
///
/// The profile is symmetric in both directions of motion: a goal behind the
/// current state simply runs the same closed-form evaluation with position
/// and velocity negated.
#[derive(Debug, Clone)]
pub struct TrapezoidProfile {
    /// Profile limits
    constraints: TrapezoidConstraints,

    /// +1 for a forward profile, -1 for an inverted one
    direction: f64,

    /// Directed current state of the last `calculate` call
    current: ProfileState,

    /// End of the acceleration phase, in directed profile time
    end_accel_s: f64,

    /// End of the cruise phase, in directed profile time
    end_full_speed_s: f64,

    /// End of the deceleration phase, in directed profile time
    end_decel_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrapezoidConstraints {
    /// Create profile constraints from maximum velocity and acceleration
    /// magnitudes.
    ///
    /// Both limits must be positive and finite. Invalid values are replaced
    /// with 1.0 and a warning is logged, so a bad configuration degrades
    /// rather than crashing the control loop.
    pub fn new(max_velocity: f64, max_acceleration: f64) -> Self {
        let max_velocity = if max_velocity.is_finite() && max_velocity > 0.0 {
            max_velocity
        } else {
            warn!(
                "Invalid profile max velocity {}, falling back to 1.0",
                max_velocity
            );
            1.0
        };

        let max_acceleration = if max_acceleration.is_finite() && max_acceleration > 0.0 {
            max_acceleration
        } else {
            warn!(
                "Invalid profile max acceleration {}, falling back to 1.0",
                max_acceleration
            );
            1.0
        };

        Self {
            max_velocity,
            max_acceleration,
        }
    }

    /// Get the maximum velocity magnitude.
    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// Get the maximum acceleration magnitude.
    pub fn max_acceleration(&self) -> f64 {
        self.max_acceleration
    }
}

impl ProfileState {
    /// Create a new profile state.
    pub fn new(position: f64, velocity: f64) -> Self {
        Self { position, velocity }
    }
}

impl TrapezoidProfile {
    /// Create a profile with the given constraints.
    pub fn new(constraints: TrapezoidConstraints) -> Self {
        Self {
            constraints,
            direction: 1.0,
            current: ProfileState::default(),
            end_accel_s: 0.0,
            end_full_speed_s: 0.0,
            end_decel_s: 0.0,
        }
    }

    /// Get the constraints the profile was built with.
    pub fn constraints(&self) -> TrapezoidConstraints {
        self.constraints
    }

    /// Calculate the profile state a time `t_s` after `current`, on the
    /// minimal-time profile from `current` to `goal` under the constraints.
    ///
    /// The profile is recomputed from scratch each call, so the goal is free
    /// to change between calls. A current velocity outside the configured
    /// limit is clamped onto it; the returned state never exceeds the limits
    /// in either direction of motion.
    pub fn calculate(&mut self, t_s: f64, current: &ProfileState, goal: &ProfileState) -> ProfileState {
        let max_vel = self.constraints.max_velocity;
        let max_accel = self.constraints.max_acceleration;

        // Run the evaluation in a directed frame where the goal is always
        // ahead of the current state
        self.direction = if current.position > goal.position {
            -1.0
        } else {
            1.0
        };
        let mut current = self.direct(current);
        let goal = self.direct(goal);

        current.velocity = clamp(current.velocity, -max_vel, max_vel);
        self.current = current;

        // Deal with a possibly truncated motion profile (with nonzero initial
        // or final velocity) by calculating the parameters as if the profile
        // began and ended at zero velocity
        let cutoff_begin_s = current.velocity / max_accel;
        let cutoff_dist_begin = cutoff_begin_s * cutoff_begin_s * max_accel / 2.0;

        let cutoff_end_s = goal.velocity / max_accel;
        let cutoff_dist_end = cutoff_end_s * cutoff_end_s * max_accel / 2.0;

        // Now the parameters of the equivalent full trapezoid
        let full_trapezoid_dist =
            cutoff_dist_begin + (goal.position - current.position) + cutoff_dist_end;
        let mut acceleration_time_s = max_vel / max_accel;

        let mut full_speed_dist =
            full_trapezoid_dist - acceleration_time_s * acceleration_time_s * max_accel;

        // Triangular profile: never reaches full speed
        if full_speed_dist < 0.0 {
            acceleration_time_s = (full_trapezoid_dist / max_accel).sqrt();
            full_speed_dist = 0.0;
        }

        self.end_accel_s = acceleration_time_s - cutoff_begin_s;
        self.end_full_speed_s = self.end_accel_s + full_speed_dist / max_vel;
        self.end_decel_s = self.end_full_speed_s + acceleration_time_s - cutoff_end_s;

        let mut result = current;

        if t_s < self.end_accel_s {
            result.velocity += t_s * max_accel;
            result.position += (current.velocity + t_s * max_accel / 2.0) * t_s;
        } else if t_s < self.end_full_speed_s {
            result.velocity = max_vel;
            result.position += (current.velocity + self.end_accel_s * max_accel / 2.0)
                * self.end_accel_s
                + max_vel * (t_s - self.end_accel_s);
        } else if t_s <= self.end_decel_s {
            let time_left_s = self.end_decel_s - t_s;
            result.velocity = goal.velocity + time_left_s * max_accel;
            result.position =
                goal.position - (goal.velocity + time_left_s * max_accel / 2.0) * time_left_s;
        } else {
            result = goal;
        }

        self.direct(&result)
    }

    /// Get the time left from the last `calculate` call until the given
    /// target position is reached.
    pub fn time_left_until(&self, target: f64) -> f64 {
        let position = self.current.position * self.direction;
        let mut velocity = self.current.velocity * self.direction;

        let mut end_accel_s = self.end_accel_s * self.direction;
        let mut end_full_speed_s = self.end_full_speed_s * self.direction - end_accel_s;

        if target < position {
            end_accel_s = -end_accel_s;
            end_full_speed_s = -end_full_speed_s;
            velocity = -velocity;
        }

        end_accel_s = end_accel_s.max(0.0);
        end_full_speed_s = end_full_speed_s.max(0.0);

        let acceleration = self.constraints.max_acceleration;
        let deceleration = -self.constraints.max_acceleration;

        let dist_to_target = (target - position).abs();
        if dist_to_target < 1e-6 {
            return 0.0;
        }

        let mut accel_dist = velocity * end_accel_s + 0.5 * acceleration * end_accel_s * end_accel_s;

        let decel_velocity = if end_accel_s > 0.0 {
            (velocity * velocity + 2.0 * acceleration * accel_dist).abs().sqrt()
        } else {
            velocity
        };

        let mut full_speed_dist = self.constraints.max_velocity * end_full_speed_s;
        let decel_dist;

        if accel_dist > dist_to_target {
            accel_dist = dist_to_target;
            full_speed_dist = 0.0;
            decel_dist = 0.0;
        } else if accel_dist + full_speed_dist > dist_to_target {
            full_speed_dist = dist_to_target - accel_dist;
            decel_dist = 0.0;
        } else {
            decel_dist = dist_to_target - full_speed_dist - accel_dist;
        }

        let accel_time_s = (-velocity
            + (velocity * velocity + 2.0 * acceleration * accel_dist).abs().sqrt())
            / acceleration;

        let decel_time_s = (-decel_velocity
            + (decel_velocity * decel_velocity + 2.0 * deceleration * decel_dist)
                .abs()
                .sqrt())
            / deceleration;

        let full_speed_time_s = full_speed_dist / self.constraints.max_velocity;

        accel_time_s + full_speed_time_s + decel_time_s
    }

    /// Get the total time the profile of the last `calculate` call takes to
    /// reach its goal.
    pub fn total_time_s(&self) -> f64 {
        self.end_decel_s
    }

    /// True if the profile of the last `calculate` call has reached its goal
    /// at time `t_s` after the profile start.
    pub fn is_finished(&self, t_s: f64) -> bool {
        t_s >= self.total_time_s()
    }

    /// Flip a state into or out of the directed profile frame.
    fn direct(&self, state: &ProfileState) -> ProfileState {
        ProfileState {
            position: state.position * self.direction,
            velocity: state.velocity * self.direction,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use util::maths::epsilon_eq;

    const DT_S: f64 = 0.01;

    /// Step the profile to completion, checking the velocity and implied
    /// acceleration limits at every step.
    fn run_to_goal(
        profile: &mut TrapezoidProfile,
        mut state: ProfileState,
        goal: ProfileState,
    ) -> ProfileState {
        let max_vel = profile.constraints().max_velocity();
        let max_accel = profile.constraints().max_acceleration();

        for _ in 0..10_000 {
            let next = profile.calculate(DT_S, &state, &goal);

            assert!(
                next.velocity.abs() <= max_vel + 1e-9,
                "velocity limit exceeded: {}",
                next.velocity
            );
            assert!(
                (next.velocity - state.velocity).abs() <= max_accel * DT_S + 1e-9,
                "acceleration limit exceeded"
            );
            assert!(!next.position.is_nan() && !next.velocity.is_nan());

            state = next;
            if state == goal {
                break;
            }
        }

        state
    }

    #[test]
    fn test_reaches_goal() {
        let mut profile = TrapezoidProfile::new(TrapezoidConstraints::new(1.75, 0.75));
        let reached = run_to_goal(
            &mut profile,
            ProfileState::new(0.0, 0.0),
            ProfileState::new(3.0, 0.0),
        );

        assert_eq!(reached, ProfileState::new(3.0, 0.0));
    }

    #[test]
    fn test_goal_behind_current() {
        let mut profile = TrapezoidProfile::new(TrapezoidConstraints::new(0.75, 0.75));
        let reached = run_to_goal(
            &mut profile,
            ProfileState::new(0.0, 0.0),
            ProfileState::new(-2.0, 0.0),
        );

        assert_eq!(reached, ProfileState::new(-2.0, 0.0));
    }

    #[test]
    fn test_already_at_goal() {
        let mut profile = TrapezoidProfile::new(TrapezoidConstraints::new(1.0, 1.0));
        let goal = ProfileState::new(1.5, 0.0);
        let result = profile.calculate(DT_S, &goal, &goal);

        assert_eq!(result, goal);
        assert!(profile.is_finished(DT_S));
    }

    #[test]
    fn test_overspeed_current_is_clamped() {
        let mut profile = TrapezoidProfile::new(TrapezoidConstraints::new(1.0, 1.0));
        let result = profile.calculate(DT_S, &ProfileState::new(0.0, 4.0), &ProfileState::new(5.0, 0.0));

        assert!(result.velocity <= 1.0 + 1e-9);
        assert!(!result.position.is_nan());
    }

    #[test]
    fn test_moving_away_from_goal_recovers() {
        let mut profile = TrapezoidProfile::new(TrapezoidConstraints::new(1.0, 1.0));
        let reached = run_to_goal(
            &mut profile,
            ProfileState::new(0.0, -0.5),
            ProfileState::new(2.0, 0.0),
        );

        assert_eq!(reached, ProfileState::new(2.0, 0.0));
    }

    #[test]
    fn test_total_time_is_minimal_trapezoid() {
        // 1 m at max_vel 1, max_accel 1: accelerate 1 s over 0.5 m, no
        // cruise... full trapezoid needs sqrt shaping, check the triangular
        // case analytically: t = 2 * sqrt(d / a)
        let mut profile = TrapezoidProfile::new(TrapezoidConstraints::new(10.0, 1.0));
        profile.calculate(DT_S, &ProfileState::new(0.0, 0.0), &ProfileState::new(1.0, 0.0));

        assert!(epsilon_eq(profile.total_time_s(), 2.0, 1e-9));
    }

    #[test]
    fn test_time_left_until() {
        let mut profile = TrapezoidProfile::new(TrapezoidConstraints::new(0.75, 0.75));
        profile.calculate(DT_S, &ProfileState::new(0.0, 0.0), &ProfileState::new(3.0, 0.0));

        // The end of the profile is total_time away
        assert!(epsilon_eq(
            profile.time_left_until(3.0),
            profile.total_time_s(),
            1e-6
        ));

        assert_eq!(profile.time_left_until(0.0), 0.0);
    }

    #[test]
    fn test_invalid_constraints_fall_back() {
        let constraints = TrapezoidConstraints::new(-1.0, f64::NAN);
        assert_eq!(constraints.max_velocity(), 1.0);
        assert_eq!(constraints.max_acceleration(), 1.0);
    }
}
