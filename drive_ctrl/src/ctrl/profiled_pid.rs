//! PID controller whose setpoint follows a trapezoid motion profile

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::profile::{ProfileState, TrapezoidConstraints, TrapezoidProfile};
use util::maths::input_modulus;

use super::PidController;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller that drives towards a goal by tracking intermediate
/// setpoints along a trapezoid profile.
///
/// Each `calculate` call advances the profile by one controller period and
/// feeds the profiled position to the inner PID loop. The profile velocity
/// is available from `setpoint` for a velocity feedforward term.
#[derive(Debug, Clone)]
pub struct ProfiledPidController {
    controller: PidController,

    constraints: TrapezoidConstraints,

    /// Goal the profile is driving towards
    goal: ProfileState,

    /// Current intermediate setpoint along the profile
    setpoint: ProfileState,

    minimum_input: f64,
    maximum_input: f64,
}

/// Read-only snapshot of a profiled PID controller for telemetry.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct ProfiledPidStatus {
    /// Goal position
    pub goal_position: f64,

    /// Goal velocity
    pub goal_velocity: f64,

    /// Current profiled setpoint position
    pub setpoint_position: f64,

    /// Current profiled setpoint velocity
    pub setpoint_velocity: f64,

    /// Last computed position error
    pub position_error: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ProfiledPidController {
    /// Create a new controller with the given gains, period, and motion
    /// constraints. Gain and period validation matches [`PidController`].
    pub fn new(
        kp: f64,
        ki: f64,
        kd: f64,
        constraints: TrapezoidConstraints,
        period_s: f64,
    ) -> Self {
        Self {
            controller: PidController::new(kp, ki, kd, period_s),
            constraints,
            goal: ProfileState::default(),
            setpoint: ProfileState::default(),
            minimum_input: 0.0,
            maximum_input: 0.0,
        }
    }

    /// Set the PID gains.
    pub fn set_pid(&mut self, kp: f64, ki: f64, kd: f64) {
        self.controller.set_pid(kp, ki, kd);
    }

    /// Set the motion constraints applied to the profile.
    pub fn set_constraints(&mut self, constraints: TrapezoidConstraints) {
        self.constraints = constraints;
    }

    /// Get the motion constraints.
    pub fn constraints(&self) -> TrapezoidConstraints {
        self.constraints
    }

    /// Set the goal state.
    pub fn set_goal(&mut self, goal: ProfileState) {
        self.goal = goal;
    }

    /// Set the goal position, with zero goal velocity.
    pub fn set_goal_position(&mut self, position: f64) {
        self.goal = ProfileState::new(position, 0.0);
    }

    /// Get the goal state.
    pub fn goal(&self) -> ProfileState {
        self.goal
    }

    /// Get the current profiled setpoint. The velocity component is the
    /// profile's commanded velocity, suitable as a feedforward reference.
    pub fn setpoint(&self) -> ProfileState {
        self.setpoint
    }

    /// Enable continuous input over `[min_input, max_input)` for both the
    /// inner PID error and the profile goal.
    pub fn enable_continuous_input(&mut self, min_input: f64, max_input: f64) {
        self.controller.enable_continuous_input(min_input, max_input);
        self.minimum_input = min_input;
        self.maximum_input = max_input;
    }

    /// Disable continuous input.
    pub fn disable_continuous_input(&mut self) {
        self.controller.disable_continuous_input();
    }

    /// Set the error and error-derivative tolerances used by `at_goal`.
    pub fn set_tolerance(&mut self, position_tolerance: f64, velocity_tolerance: f64) {
        self.controller
            .set_tolerance(position_tolerance, velocity_tolerance);
    }

    /// Set the IZone on the inner PID loop.
    pub fn set_izone(&mut self, izone: f64) {
        self.controller.set_izone(izone);
    }

    /// Clamp the integral term's contribution to the output.
    pub fn set_integrator_range(&mut self, min_integral: f64, max_integral: f64) {
        self.controller
            .set_integrator_range(min_integral, max_integral);
    }

    /// Get the error of the last `calculate` call.
    pub fn position_error(&self) -> f64 {
        self.controller.position_error()
    }

    /// Get the error derivative of the last `calculate` call.
    pub fn velocity_error(&self) -> f64 {
        self.controller.velocity_error()
    }

    /// True if the measurement is within tolerance of the final goal (not
    /// just the current intermediate setpoint).
    pub fn at_goal(&self) -> bool {
        self.at_setpoint() && self.goal == self.setpoint
    }

    /// True if the measurement is within tolerance of the current profiled
    /// setpoint.
    pub fn at_setpoint(&self) -> bool {
        self.controller.at_setpoint()
    }

    /// Advance the profile by one period and get the next controller
    /// output for the given measurement.
    pub fn calculate(&mut self, measurement: f64) -> f64 {
        if self.controller.is_continuous_input_enabled() {
            // Remap the profile onto the side of the wraparound closest to
            // the measurement, so the profile takes the short way around
            let error_bound = (self.maximum_input - self.minimum_input) / 2.0;
            let goal_min_distance = input_modulus(
                self.goal.position - measurement,
                -error_bound,
                error_bound,
            );
            let setpoint_min_distance = input_modulus(
                self.setpoint.position - measurement,
                -error_bound,
                error_bound,
            );

            self.goal.position = goal_min_distance + measurement;
            self.setpoint.position = setpoint_min_distance + measurement;
        }

        let mut profile = TrapezoidProfile::new(self.constraints);
        self.setpoint = profile.calculate(self.controller.period_s(), &self.setpoint, &self.goal);
        self.controller
            .calculate_with_setpoint(measurement, self.setpoint.position)
    }

    /// Set a new goal and get the next controller output.
    pub fn calculate_with_goal(&mut self, measurement: f64, goal: ProfileState) -> f64 {
        self.set_goal(goal);
        self.calculate(measurement)
    }

    /// Reset the profile to the given state and clear the inner PID
    /// accumulators. Call when the mechanism starts from a known state, for
    /// example on mode entry.
    pub fn reset(&mut self, state: ProfileState) {
        self.controller.reset();
        self.setpoint = state;
    }

    /// Reset with the given position and zero velocity.
    pub fn reset_position(&mut self, position: f64) {
        self.reset(ProfileState::new(position, 0.0));
    }

    /// Get a telemetry snapshot of the controller.
    pub fn status(&self) -> ProfiledPidStatus {
        ProfiledPidStatus {
            goal_position: self.goal.position,
            goal_velocity: self.goal.velocity,
            setpoint_position: self.setpoint.position,
            setpoint_velocity: self.setpoint.velocity,
            position_error: self.controller.position_error(),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_setpoint_respects_constraints() {
        let constraints = TrapezoidConstraints::new(1.0, 0.5);
        let mut ctrl = ProfiledPidController::new(1.0, 0.0, 0.0, constraints, 0.02);
        ctrl.reset_position(0.0);
        ctrl.set_goal_position(10.0);

        let mut prev = ctrl.setpoint();
        for _ in 0..200 {
            ctrl.calculate(prev.position);
            let sp = ctrl.setpoint();
            assert!(sp.velocity.abs() <= 1.0 + 1e-9);
            assert!((sp.velocity - prev.velocity).abs() / 0.02 <= 0.5 + 1e-9);
            prev = sp;
        }
    }

    #[test]
    fn test_reaches_goal() {
        let constraints = TrapezoidConstraints::new(2.0, 1.0);
        let mut ctrl = ProfiledPidController::new(1.0, 0.0, 0.0, constraints, 0.02);
        ctrl.set_tolerance(0.05, f64::INFINITY);
        ctrl.reset_position(0.0);
        ctrl.set_goal_position(3.0);

        // Perfect plant that always sits on the setpoint
        for _ in 0..500 {
            ctrl.calculate(ctrl.setpoint().position);
        }

        assert!(ctrl.at_goal());
        assert!((ctrl.setpoint().position - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_continuous_input_profile_takes_short_way() {
        use std::f64::consts::PI;

        let constraints = TrapezoidConstraints::new(8.0, 20.0);
        let mut ctrl = ProfiledPidController::new(1.0, 0.0, 0.0, constraints, 0.02);
        ctrl.enable_continuous_input(-PI, PI);

        // Measurement just below +pi, goal just above -pi: the short way is
        // through the wraparound, so the first step should move the
        // setpoint towards +pi, not back through zero
        ctrl.reset_position(3.0);
        ctrl.set_goal_position(-3.0);
        ctrl.calculate(3.0);

        assert!(ctrl.setpoint().position > 3.0);
    }

    #[test]
    fn test_output_is_pid_on_profiled_setpoint() {
        let constraints = TrapezoidConstraints::new(1.0, 1.0);
        let mut ctrl = ProfiledPidController::new(2.0, 0.0, 0.0, constraints, 0.02);
        ctrl.reset_position(0.0);
        ctrl.set_goal_position(5.0);

        let out = ctrl.calculate(0.0);
        let expected = 2.0 * ctrl.setpoint().position;
        assert!((out - expected).abs() < 1e-9);
    }
}
