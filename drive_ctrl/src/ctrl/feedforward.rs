//! Permanent-magnet DC motor feedforward model

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Voltage feedforward for a simple permanent-magnet DC motor:
///
/// `V = Ks * sgn(v) + Kv * v + Ka * a`
///
/// The gains are usually obtained from system identification of the real
/// mechanism.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct SimpleMotorFeedforward {
    /// Static gain, in volts
    ks_v: f64,

    /// Velocity gain, in volt seconds per unit distance
    kv_v: f64,

    /// Acceleration gain, in volt seconds squared per unit distance
    ka_v: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimpleMotorFeedforward {
    /// Create a new feedforward with the given gains.
    ///
    /// `ka_v` must be strictly positive for the achievable-velocity and
    /// achievable-acceleration queries to be meaningful; a non-positive or
    /// non-finite value falls back to 1.0 with a logged warning.
    pub fn new(ks_v: f64, kv_v: f64, ka_v: f64) -> Self {
        let ka_v = if ka_v.is_finite() && ka_v > 0.0 {
            ka_v
        } else {
            warn!("Invalid feedforward Ka = {} V s^2/m, falling back to 1.0", ka_v);
            1.0
        };

        Self { ks_v, kv_v, ka_v }
    }

    /// Get the static gain.
    pub fn ks_v(&self) -> f64 {
        self.ks_v
    }

    /// Get the velocity gain.
    pub fn kv_v(&self) -> f64 {
        self.kv_v
    }

    /// Get the acceleration gain.
    pub fn ka_v(&self) -> f64 {
        self.ka_v
    }

    /// Calculate the feedforward voltage for the given velocity and
    /// acceleration. The static term drops out at exactly zero velocity
    /// rather than taking the sign of positive zero.
    pub fn calculate(&self, velocity: f64, acceleration: f64) -> f64 {
        let static_v = if velocity == 0.0 {
            0.0
        } else {
            self.ks_v * velocity.signum()
        };

        static_v + self.kv_v * velocity + self.ka_v * acceleration
    }

    /// Calculate the feedforward voltage for a constant velocity.
    pub fn calculate_velocity(&self, velocity: f64) -> f64 {
        self.calculate(velocity, 0.0)
    }

    /// Maximum velocity achievable at the given acceleration without
    /// exceeding `max_voltage`. Assumes positive velocity.
    pub fn max_achievable_velocity(&self, max_voltage: f64, acceleration: f64) -> f64 {
        (max_voltage - self.ks_v - self.ka_v * acceleration) / self.kv_v
    }

    /// Minimum (most negative) velocity achievable at the given acceleration
    /// without exceeding `max_voltage` in magnitude.
    pub fn min_achievable_velocity(&self, max_voltage: f64, acceleration: f64) -> f64 {
        (-max_voltage + self.ks_v - self.ka_v * acceleration) / self.kv_v
    }

    /// Maximum acceleration achievable at the given velocity without
    /// exceeding `max_voltage`.
    pub fn max_achievable_acceleration(&self, max_voltage: f64, velocity: f64) -> f64 {
        (max_voltage - self.ks_v * velocity.signum() - self.kv_v * velocity) / self.ka_v
    }

    /// Minimum (most negative) acceleration achievable at the given velocity
    /// without exceeding `max_voltage` in magnitude.
    pub fn min_achievable_acceleration(&self, max_voltage: f64, velocity: f64) -> f64 {
        self.max_achievable_acceleration(-max_voltage, velocity)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use util::maths::epsilon_eq;

    #[test]
    fn test_calculate() {
        let ff = SimpleMotorFeedforward::new(0.5, 2.0, 1.0);

        assert!(epsilon_eq(ff.calculate(2.0, 1.0), 0.5 + 4.0 + 1.0, 1e-9));
        assert!(epsilon_eq(ff.calculate(-2.0, -1.0), -0.5 - 4.0 - 1.0, 1e-9));
    }

    #[test]
    fn test_zero_velocity_has_no_static_term() {
        let ff = SimpleMotorFeedforward::new(0.5, 2.0, 1.0);

        assert_eq!(ff.calculate(0.0, 0.0), 0.0);
        assert_eq!(ff.calculate(-0.0, 0.0), 0.0);
    }

    #[test]
    fn test_achievable_velocity_inverts_model() {
        let ff = SimpleMotorFeedforward::new(0.5, 2.0, 1.0);

        let v = ff.max_achievable_velocity(12.0, 1.0);
        assert!(epsilon_eq(ff.calculate(v, 1.0), 12.0, 1e-9));
    }

    #[test]
    fn test_achievable_acceleration_inverts_model() {
        let ff = SimpleMotorFeedforward::new(0.5, 2.0, 2.0);

        let a = ff.max_achievable_acceleration(12.0, 1.5);
        assert!(epsilon_eq(ff.calculate(1.5, a), 12.0, 1e-9));

        let a_min = ff.min_achievable_acceleration(12.0, 1.5);
        assert!(epsilon_eq(ff.calculate(1.5, a_min), -12.0, 1e-9));
    }

    #[test]
    fn test_invalid_ka_falls_back() {
        let ff = SimpleMotorFeedforward::new(0.5, 2.0, -1.0);
        assert_eq!(ff.ka_v(), 1.0);
    }
}
