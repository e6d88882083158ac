//! # Control module
//!
//! Feedback controllers which turn a reference (setpoint, motion profile
//! goal, or trajectory state) plus the current measurement into an output
//! command.
//!
//! [`PidController`] and [`ProfiledPidController`] are scalar primitives
//! usable standalone. The path tracking controllers ([`RamseteController`],
//! [`LtvUnicycleController`], [`LtvDifferentialDriveController`]) share one
//! contract: called once per control period with the current pose and the
//! reference trajectory state, they emit chassis speeds (or wheel voltages
//! for the LTV differential drive), with feedback computed on the current
//! pose error only - no hidden integral state.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod feedforward;
mod ltv;
mod pid;
mod profiled_pid;
mod ramsete;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use feedforward::*;
pub use ltv::*;
pub use pid::*;
pub use profiled_pid::*;
pub use ramsete::*;
