//! # Motion profile module
//!
//! Provides the trapezoidal motion profile: a velocity-vs-time profile with
//! at most three phases (accelerate, cruise, decelerate) bounded by a maximum
//! velocity and acceleration.
//!
//! The profile is evaluated in closed form rather than by simulation, so
//! advancing it is deterministic and bounded-time, and the intended use is to
//! filter a changing reference once per control period:
//!
//! ```
//! use drive_ctrl::profile::{ProfileState, TrapezoidConstraints, TrapezoidProfile};
//!
//! let mut profile = TrapezoidProfile::new(TrapezoidConstraints::new(1.75, 0.75));
//! let mut setpoint = ProfileState::new(0.0, 0.0);
//! let goal = ProfileState::new(5.0, 0.0);
//!
//! for _ in 0..10 {
//!     setpoint = profile.calculate(0.02, &setpoint, &goal);
//! }
//! ```

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod trapezoid;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use trapezoid::*;
