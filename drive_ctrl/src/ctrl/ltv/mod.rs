//! # Linear time-varying trajectory trackers
//!
//! These controllers linearize the drivetrain model about a sweep of
//! operating velocities at construction, solve a discrete LQR problem at
//! each point, and store the resulting state-feedback gains in a
//! velocity-indexed table. At runtime a gain is interpolated from the table
//! and applied to the robot-frame pose error, so no Riccati solve ever runs
//! inside the control period.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod diff_drive;
mod lqr;
mod unicycle;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use diff_drive::*;
pub use lqr::*;
pub use unicycle::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::DMatrix;
use thiserror::Error;

// Internal
use util::maths::inverse_interpolate;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Velocity step between gain table entries, in m/s.
pub(crate) const GAIN_TABLE_STEP_MS: f64 = 0.01;

/// Floor applied to lookup velocities. The linearization is singular at
/// exactly zero velocity, so the table starts just above it.
pub(crate) const MIN_LOOKUP_VELOCITY_MS: f64 = 1e-4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while synthesising LTV controller gains.
#[derive(Debug, Error)]
pub enum LtvError {
    #[error("The Riccati iteration did not converge")]
    DareNotConverged,

    #[error("The LQR cost inversion produced a singular matrix")]
    SingularCostMatrix,

    #[error("Invalid controller parameter: {0}")]
    InvalidParameter(String),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A velocity-indexed table of state-feedback gain matrices.
///
/// Entries are stored in ascending velocity order. Lookups piecewise-
/// linearly interpolate between the bracketing entries and clamp at the
/// table's ends rather than extrapolate.
#[derive(Debug, Clone)]
pub(crate) struct GainTable {
    velocities_ms: Vec<f64>,
    gains: Vec<DMatrix<f64>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GainTable {
    /// Build a table by evaluating `synthesise` at each velocity of the
    /// sweep `[MIN_LOOKUP_VELOCITY_MS, max_velocity_ms]` in steps of
    /// [`GAIN_TABLE_STEP_MS`].
    pub(crate) fn build<F>(max_velocity_ms: f64, mut synthesise: F) -> Result<Self, LtvError>
    where
        F: FnMut(f64) -> Result<DMatrix<f64>, LtvError>,
    {
        if !max_velocity_ms.is_finite() || max_velocity_ms <= 0.0 {
            return Err(LtvError::InvalidParameter(format!(
                "max velocity {} m/s must be positive",
                max_velocity_ms
            )));
        }

        let mut velocities_ms = Vec::new();
        let mut gains = Vec::new();

        let mut velocity_ms = MIN_LOOKUP_VELOCITY_MS;
        while velocity_ms < max_velocity_ms {
            velocities_ms.push(velocity_ms);
            gains.push(synthesise(velocity_ms)?);
            velocity_ms += GAIN_TABLE_STEP_MS;
        }

        velocities_ms.push(max_velocity_ms);
        gains.push(synthesise(max_velocity_ms)?);

        Ok(Self {
            velocities_ms,
            gains,
        })
    }

    /// Interpolate the gain at the given velocity magnitude, clamped to the
    /// table's ends.
    pub(crate) fn lookup(&self, velocity_ms: f64) -> DMatrix<f64> {
        let velocity_ms = velocity_ms.abs().max(MIN_LOOKUP_VELOCITY_MS);

        if velocity_ms <= self.velocities_ms[0] {
            return self.gains[0].clone();
        }
        if velocity_ms >= *self.velocities_ms.last().unwrap() {
            return self.gains.last().unwrap().clone();
        }

        let upper = self
            .velocities_ms
            .partition_point(|&v| v < velocity_ms);
        let lower = upper - 1;

        let t = inverse_interpolate(
            self.velocities_ms[lower],
            self.velocities_ms[upper],
            velocity_ms,
        );

        &self.gains[lower] * (1.0 - t) + &self.gains[upper] * t
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn linear_table() -> GainTable {
        // Gain equal to the velocity, so interpolation is easy to check
        GainTable::build(1.0, |v| Ok(DMatrix::from_row_slice(1, 1, &[v]))).unwrap()
    }

    #[test]
    fn test_lookup_interpolates() {
        let table = linear_table();
        let k = table.lookup(0.5);
        assert!((k[(0, 0)] - 0.5).abs() < 1e-9);

        let k = table.lookup(0.255);
        assert!((k[(0, 0)] - 0.255).abs() < 1e-9);
    }

    #[test]
    fn test_lookup_clamps_at_ends() {
        let table = linear_table();

        // Above the sweep maximum
        let k = table.lookup(5.0);
        assert!((k[(0, 0)] - 1.0).abs() < 1e-9);

        // Below the floor, including exactly zero
        let k = table.lookup(0.0);
        assert!((k[(0, 0)] - MIN_LOOKUP_VELOCITY_MS).abs() < 1e-9);
    }

    #[test]
    fn test_lookup_uses_magnitude() {
        let table = linear_table();
        let k = table.lookup(-0.5);
        assert!((k[(0, 0)] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_build_rejects_bad_max_velocity() {
        assert!(GainTable::build(0.0, |_| Ok(DMatrix::zeros(1, 1))).is_err());
        assert!(GainTable::build(f64::NAN, |_| Ok(DMatrix::zeros(1, 1))).is_err());
    }
}
