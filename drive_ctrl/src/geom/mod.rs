//! # Geometry module
//!
//! Planar geometry value types used throughout the drive control library.
//!
//! All types here are small, immutable values which are cheap to copy. Poses
//! form a group under composition, and [`Twist2d`] provides the link between
//! velocity commands and pose changes via the exponential map, which is also
//! what trajectory sampling uses to interpolate between states.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod pose;
mod rotation;
mod translation;
mod twist;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use pose::*;
pub use rotation::*;
pub use translation::*;
pub use twist::*;
