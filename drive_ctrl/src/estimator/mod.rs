//! # Estimator module
//!
//! Support for fusing delayed measurements into a state estimator. The
//! filter itself lives with the caller; this module only records its
//! history and replays it when an old measurement arrives.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod latency;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use latency::*;
