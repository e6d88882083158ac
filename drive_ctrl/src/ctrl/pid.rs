//! PID feedback controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;

// Internal
use util::maths::{clamp, input_modulus};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default controller period, in seconds.
pub const DEFAULT_PERIOD_S: f64 = 0.02;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A discrete PID feedback controller.
///
/// `calculate` is expected to be called once per fixed period. The
/// controller has no notion of wall-clock time; the period passed at
/// construction is what scales the integral and derivative terms.
#[derive(Debug, Clone)]
pub struct PidController {
    /// Proportional gain
    kp: f64,

    /// Integral gain
    ki: f64,

    /// Derivative gain
    kd: f64,

    /// Error magnitude above which the accumulator resets to zero
    izone: f64,

    /// Controller period
    period_s: f64,

    /// Lower clamp on the integral term's contribution to the output
    min_integral: f64,

    /// Upper clamp on the integral term's contribution to the output
    max_integral: f64,

    /// Range for continuous (wraparound) input
    min_input: f64,
    max_input: f64,
    continuous: bool,

    /// Current error (setpoint - measurement)
    position_error: f64,

    /// Change in error per second
    velocity_error: f64,

    /// Error of the previous cycle
    prev_error: f64,

    /// The integral accumulation
    total_error: f64,

    /// Tolerances for `at_setpoint`
    position_tolerance: f64,
    velocity_tolerance: f64,

    setpoint: f64,
    have_setpoint: bool,
    have_measurement: bool,
}

/// Read-only snapshot of a PID controller for telemetry.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct PidStatus {
    /// Proportional gain
    pub kp: f64,

    /// Integral gain
    pub ki: f64,

    /// Derivative gain
    pub kd: f64,

    /// Current setpoint
    pub setpoint: f64,

    /// Last computed error
    pub position_error: f64,

    /// Last computed error derivative
    pub velocity_error: f64,

    /// Current integral accumulation
    pub total_error: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains and period.
    ///
    /// Negative gains are clamped to zero and a non-positive or non-finite
    /// period falls back to [`DEFAULT_PERIOD_S`], each with a logged
    /// warning. Construction never fails: a running control loop with
    /// degraded gains beats no control loop at all.
    pub fn new(kp: f64, ki: f64, kd: f64, period_s: f64) -> Self {
        let period_s = if period_s.is_finite() && period_s > 0.0 {
            period_s
        } else {
            warn!(
                "Invalid PID period {} s, falling back to {} s",
                period_s, DEFAULT_PERIOD_S
            );
            DEFAULT_PERIOD_S
        };

        Self {
            kp: Self::validated_gain("Kp", kp),
            ki: Self::validated_gain("Ki", ki),
            kd: Self::validated_gain("Kd", kd),
            izone: f64::INFINITY,
            period_s,
            min_integral: -1.0,
            max_integral: 1.0,
            min_input: 0.0,
            max_input: 0.0,
            continuous: false,
            position_error: 0.0,
            velocity_error: 0.0,
            prev_error: 0.0,
            total_error: 0.0,
            position_tolerance: 0.05,
            velocity_tolerance: f64::INFINITY,
            setpoint: 0.0,
            have_setpoint: false,
            have_measurement: false,
        }
    }

    /// Set the proportional, integral and derivative gains, with the same
    /// validation as construction.
    pub fn set_pid(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = Self::validated_gain("Kp", kp);
        self.ki = Self::validated_gain("Ki", ki);
        self.kd = Self::validated_gain("Kd", kd);
    }

    /// Get the proportional gain.
    pub fn kp(&self) -> f64 {
        self.kp
    }

    /// Get the integral gain.
    pub fn ki(&self) -> f64 {
        self.ki
    }

    /// Get the derivative gain.
    pub fn kd(&self) -> f64 {
        self.kd
    }

    /// Get the controller period.
    pub fn period_s(&self) -> f64 {
        self.period_s
    }

    /// Set the IZone range. While the error magnitude exceeds `izone` the
    /// integral accumulator is held at zero, preventing windup far from the
    /// setpoint. Infinity (the default) disables the zone; a negative value
    /// is invalid and restores the default with a warning.
    pub fn set_izone(&mut self, izone: f64) {
        if izone < 0.0 || izone.is_nan() {
            warn!("Invalid IZone {}, falling back to infinity", izone);
            self.izone = f64::INFINITY;
        } else {
            self.izone = izone;
        }
    }

    /// Get the IZone range.
    pub fn izone(&self) -> f64 {
        self.izone
    }

    /// Enable continuous input over `[min_input, max_input)`.
    ///
    /// The endpoints are treated as the same point and the error becomes the
    /// signed shortest distance around the circle, so a heading controller
    /// never unwinds the long way across the wraparound.
    pub fn enable_continuous_input(&mut self, min_input: f64, max_input: f64) {
        self.continuous = true;
        self.min_input = min_input;
        self.max_input = max_input;
    }

    /// Disable continuous input.
    pub fn disable_continuous_input(&mut self) {
        self.continuous = false;
    }

    /// True if continuous input is enabled.
    pub fn is_continuous_input_enabled(&self) -> bool {
        self.continuous
    }

    /// Clamp the integral term's contribution to the output into
    /// `[min_integral, max_integral]` (anti-windup).
    pub fn set_integrator_range(&mut self, min_integral: f64, max_integral: f64) {
        self.min_integral = min_integral;
        self.max_integral = max_integral;
    }

    /// Set the error and error-derivative tolerances used by `at_setpoint`.
    pub fn set_tolerance(&mut self, position_tolerance: f64, velocity_tolerance: f64) {
        self.position_tolerance = position_tolerance;
        self.velocity_tolerance = velocity_tolerance;
    }

    /// Set the setpoint.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
        self.have_setpoint = true;
    }

    /// Get the setpoint.
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Get the error of the last `calculate` call.
    pub fn position_error(&self) -> f64 {
        self.position_error
    }

    /// Get the error derivative of the last `calculate` call.
    pub fn velocity_error(&self) -> f64 {
        self.velocity_error
    }

    /// True if both the error and its derivative were within tolerance on
    /// the last `calculate` call. Always false before the first calculation.
    pub fn at_setpoint(&self) -> bool {
        self.have_measurement
            && self.have_setpoint
            && self.position_error.abs() < self.position_tolerance
            && self.velocity_error.abs() < self.velocity_tolerance
    }

    /// Get the next controller output for the given measurement.
    pub fn calculate(&mut self, measurement: f64) -> f64 {
        self.prev_error = self.position_error;
        self.have_measurement = true;

        if self.continuous {
            let error_bound = (self.max_input - self.min_input) / 2.0;
            self.position_error =
                input_modulus(self.setpoint - measurement, -error_bound, error_bound);
        } else {
            self.position_error = self.setpoint - measurement;
        }

        self.velocity_error = (self.position_error - self.prev_error) / self.period_s;

        // Outside the IZone the accumulator resets; inside it accumulates,
        // clamped so the integral contribution stays within the configured
        // range. The division by Ki only happens after the Ki != 0 check.
        if self.position_error.abs() > self.izone {
            self.total_error = 0.0;
        } else if self.ki != 0.0 {
            self.total_error = clamp(
                self.total_error + self.position_error * self.period_s,
                self.min_integral / self.ki,
                self.max_integral / self.ki,
            );
        }

        self.kp * self.position_error + self.ki * self.total_error + self.kd * self.velocity_error
    }

    /// Set a new setpoint and get the next controller output.
    pub fn calculate_with_setpoint(&mut self, measurement: f64, setpoint: f64) -> f64 {
        self.set_setpoint(setpoint);
        self.calculate(measurement)
    }

    /// Clear the accumulated state (errors and integrator) without touching
    /// the gains or setpoint.
    pub fn reset(&mut self) {
        self.position_error = 0.0;
        self.prev_error = 0.0;
        self.velocity_error = 0.0;
        self.total_error = 0.0;
        self.have_measurement = false;
    }

    /// Get a telemetry snapshot of the controller.
    pub fn status(&self) -> PidStatus {
        PidStatus {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            setpoint: self.setpoint,
            position_error: self.position_error,
            velocity_error: self.velocity_error,
            total_error: self.total_error,
        }
    }

    /// Validate a gain value, clamping negatives and NaN to zero with a
    /// warning.
    fn validated_gain(name: &str, gain: f64) -> f64 {
        if gain.is_nan() || gain < 0.0 {
            warn!("Invalid PID gain {} = {}, clamping to 0.0", name, gain);
            0.0
        } else {
            gain
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
