//! # Drive control library
//!
//! This library provides the trajectory planning and feedback control core
//! used to drive wheeled robots (differential, mecanum, and swerve) along
//! planned paths within their actuation limits.
//!
//! The main building blocks, leaf first:
//!
//! - [`geom`] - planar pose/rotation/twist value types used throughout.
//! - [`kinematics`] - stateless chassis-to-wheel conversions per drivetrain
//!   topology, with desaturation of over-limit wheel commands.
//! - [`profile`] - the closed form trapezoidal motion profile.
//! - [`traj`] - trajectories, the trajectory constraint family, and the time
//!   parameterizer which turns a geometric path into a timed trajectory.
//! - [`ctrl`] - feedback controllers: PID, profiled PID, Ramsete, and the
//!   linear time-varying (LTV) unicycle/differential drive controllers.
//! - [`estimator`] - the Kalman filter latency compensator used to fuse
//!   delayed external measurements into a running observer.
//!
//! Everything here is synchronous and bounded-time, designed to be called
//! once per fixed control period from a single control loop thread.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod ctrl;
pub mod estimator;
pub mod geom;
pub mod kinematics;
pub mod profile;
pub mod traj;
