//! Time parameterization of geometric paths

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::{Deserialize, Serialize};

// Internal
use crate::geom::Pose2d;

use super::constraint::TrajectoryConstraint;
use super::{Trajectory, TrajectoryError, TrajectoryState};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Path samples closer together than this are treated as coincident.
const MIN_SEGMENT_LENGTH_M: f64 = 1e-6;

/// Slack on acceleration comparisons during the passes.
const ACCEL_EPSILON: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A sample of a geometric path: where the robot is and how sharply the
/// path bends there. Time and velocity are assigned by the parameterizer.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct PathPoint {
    /// Pose at this sample
    pub pose: Pose2d,

    /// Signed curvature at this sample
    pub curvature_radpm: f64,
}

/// Global limits and endpoint conditions for [`time_parameterize`].
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct ParameterizeConfig {
    /// Velocity at the first path point
    pub start_velocity_ms: f64,

    /// Velocity at the last path point
    pub end_velocity_ms: f64,

    /// Global velocity cap
    pub max_velocity_ms: f64,

    /// Global acceleration cap, applied in both directions
    pub max_acceleration_mss: f64,

    /// Drive the path backwards (negated velocities and accelerations)
    pub reversed: bool,
}

/// Per-point working state of the parameterization passes.
#[derive(Debug, Copy, Clone)]
struct ConstrainedState {
    pose: Pose2d,
    curvature_radpm: f64,

    /// Arc length from the start of the path
    distance_m: f64,

    max_velocity_ms: f64,
    min_acceleration_mss: f64,
    max_acceleration_mss: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ParameterizeConfig {
    fn default() -> Self {
        Self {
            start_velocity_ms: 0.0,
            end_velocity_ms: 0.0,
            max_velocity_ms: 1.0,
            max_acceleration_mss: 1.0,
            reversed: false,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the fastest velocity profile along `path` that honours the global
/// limits of `config` and every constraint in `constraints`, and integrate
/// it into a time-ordered [`Trajectory`].
///
/// A forward pass propagates the accelerating limit from the start and a
/// backward pass the braking limit from the end; each point keeps the
/// tighter of the two plus whatever the constraints allow there. The passes
/// are deterministic and never simulate, so the same path and limits always
/// produce the same trajectory.
///
/// Fails if any constraint reports an empty acceleration interval, which
/// means the path cannot be driven at all at that point.
pub fn time_parameterize(
    path: &[PathPoint],
    constraints: &[&dyn TrajectoryConstraint],
    config: &ParameterizeConfig,
) -> Result<Trajectory, TrajectoryError> {
    if path.is_empty() {
        return Err(TrajectoryError::EmptyTrajectory);
    }
    if !config.max_velocity_ms.is_finite() || config.max_velocity_ms <= 0.0 {
        return Err(TrajectoryError::InvalidConfig(format!(
            "max velocity {} m/s must be positive",
            config.max_velocity_ms
        )));
    }
    if !config.max_acceleration_mss.is_finite() || config.max_acceleration_mss <= 0.0 {
        return Err(TrajectoryError::InvalidConfig(format!(
            "max acceleration {} m/s^2 must be positive",
            config.max_acceleration_mss
        )));
    }

    let mut constrained = forward_pass(path, constraints, config)?;
    backward_pass(&mut constrained, constraints, config)?;
    integrate_time(&constrained, config)
}

/// Sample a straight line between two poses at roughly `spacing_m`
/// intervals, with zero curvature throughout. The headings are blended
/// between the endpoints, so for a drivable path both should already point
/// along the line.
///
/// A spacing that is not strictly positive and finite falls back to a
/// single segment, endpoints only.
pub fn straight_path(start: &Pose2d, end: &Pose2d, spacing_m: f64) -> Vec<PathPoint> {
    let distance_m = start.translation.distance_to_m(&end.translation);

    let num_segments = if spacing_m.is_finite() && spacing_m > 0.0 {
        ((distance_m / spacing_m).ceil() as usize).max(1)
    } else {
        warn!(
            "Straight path spacing of {} m is not positive, using the endpoints only",
            spacing_m
        );
        1
    };

    (0..=num_segments)
        .map(|i| {
            let t = i as f64 / num_segments as f64;
            PathPoint {
                pose: start.interpolate(end, t),
                curvature_radpm: 0.0,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Propagate the accelerating limit forwards from the start velocity.
fn forward_pass(
    path: &[PathPoint],
    constraints: &[&dyn TrajectoryConstraint],
    config: &ParameterizeConfig,
) -> Result<Vec<ConstrainedState>, TrajectoryError> {
    let mut constrained = Vec::with_capacity(path.len());

    let mut predecessor = ConstrainedState {
        pose: path[0].pose,
        curvature_radpm: path[0].curvature_radpm,
        distance_m: 0.0,
        max_velocity_ms: config.start_velocity_ms.abs(),
        min_acceleration_mss: -config.max_acceleration_mss,
        max_acceleration_mss: config.max_acceleration_mss,
    };

    for (index, point) in path.iter().enumerate() {
        let ds_m = point
            .pose
            .translation
            .distance_to_m(&predecessor.pose.translation);

        let mut state = ConstrainedState {
            pose: point.pose,
            curvature_radpm: point.curvature_radpm,
            distance_m: predecessor.distance_m + ds_m,
            max_velocity_ms: 0.0,
            min_acceleration_mss: 0.0,
            max_acceleration_mss: 0.0,
        };

        loop {
            // Fastest this point can be reached from the predecessor under
            // its accelerating limit, capped globally
            state.max_velocity_ms = (predecessor.max_velocity_ms * predecessor.max_velocity_ms
                + 2.0 * predecessor.max_acceleration_mss * ds_m)
                .sqrt()
                .min(config.max_velocity_ms);

            state.min_acceleration_mss = -config.max_acceleration_mss;
            state.max_acceleration_mss = config.max_acceleration_mss;

            for constraint in constraints {
                state.max_velocity_ms = state.max_velocity_ms.min(constraint.max_velocity_ms(
                    &state.pose,
                    state.curvature_radpm,
                    state.max_velocity_ms,
                ));
            }

            enforce_acceleration_limits(constraints, config.reversed, &mut state, index)?;

            if ds_m < MIN_SEGMENT_LENGTH_M {
                break;
            }

            // If the velocity change over this segment needs more
            // acceleration than this point allows, the predecessor has to
            // accelerate less; rerun with its limit tightened
            let actual_acceleration_mss = (state.max_velocity_ms * state.max_velocity_ms
                - predecessor.max_velocity_ms * predecessor.max_velocity_ms)
                / (2.0 * ds_m);

            if state.max_acceleration_mss < actual_acceleration_mss - ACCEL_EPSILON {
                predecessor.max_acceleration_mss = state.max_acceleration_mss;
            } else {
                if actual_acceleration_mss > predecessor.min_acceleration_mss {
                    predecessor.max_acceleration_mss = actual_acceleration_mss;
                }
                break;
            }
        }

        constrained.push(state);
        predecessor = state;
    }

    Ok(constrained)
}

/// Propagate the braking limit backwards from the end velocity, tightening
/// the forward pass where needed.
fn backward_pass(
    constrained: &mut [ConstrainedState],
    constraints: &[&dyn TrajectoryConstraint],
    config: &ParameterizeConfig,
) -> Result<(), TrajectoryError> {
    let last = constrained[constrained.len() - 1];

    let mut successor = ConstrainedState {
        pose: last.pose,
        curvature_radpm: last.curvature_radpm,
        distance_m: last.distance_m,
        max_velocity_ms: config.end_velocity_ms.abs(),
        min_acceleration_mss: -config.max_acceleration_mss,
        max_acceleration_mss: config.max_acceleration_mss,
    };

    for index in (0..constrained.len()).rev() {
        let state = &mut constrained[index];
        // Negative: we walk against the path direction
        let ds_m = state.distance_m - successor.distance_m;

        loop {
            // Fastest this point may be while still able to brake to the
            // successor's velocity
            let new_max_velocity_ms = (successor.max_velocity_ms * successor.max_velocity_ms
                + 2.0 * successor.min_acceleration_mss * ds_m)
                .sqrt();

            if new_max_velocity_ms >= state.max_velocity_ms {
                break;
            }
            state.max_velocity_ms = new_max_velocity_ms;

            enforce_acceleration_limits(constraints, config.reversed, state, index)?;

            if ds_m > -MIN_SEGMENT_LENGTH_M {
                break;
            }

            let actual_acceleration_mss = (state.max_velocity_ms * state.max_velocity_ms
                - successor.max_velocity_ms * successor.max_velocity_ms)
                / (2.0 * ds_m);

            if state.min_acceleration_mss > actual_acceleration_mss + ACCEL_EPSILON {
                successor.min_acceleration_mss = state.min_acceleration_mss;
            } else {
                successor.min_acceleration_mss = actual_acceleration_mss;
                break;
            }
        }

        successor = *state;
    }

    Ok(())
}

/// Intersect the acceleration intervals of every constraint into the
/// state's interval. An empty intersection is a hard failure.
fn enforce_acceleration_limits(
    constraints: &[&dyn TrajectoryConstraint],
    reversed: bool,
    state: &mut ConstrainedState,
    index: usize,
) -> Result<(), TrajectoryError> {
    let factor = if reversed { -1.0 } else { 1.0 };

    for constraint in constraints {
        let min_max = constraint.min_max_acceleration(
            &state.pose,
            state.curvature_radpm,
            state.max_velocity_ms * factor,
        );

        if min_max.min_acceleration_mss > min_max.max_acceleration_mss {
            return Err(TrajectoryError::InfeasibleConstraints {
                index,
                min_mss: min_max.min_acceleration_mss,
                max_mss: min_max.max_acceleration_mss,
            });
        }

        state.min_acceleration_mss = state.min_acceleration_mss.max(if reversed {
            -min_max.max_acceleration_mss
        } else {
            min_max.min_acceleration_mss
        });
        state.max_acceleration_mss = state.max_acceleration_mss.min(if reversed {
            -min_max.min_acceleration_mss
        } else {
            min_max.max_acceleration_mss
        });
    }

    if state.min_acceleration_mss > state.max_acceleration_mss {
        return Err(TrajectoryError::InfeasibleConstraints {
            index,
            min_mss: state.min_acceleration_mss,
            max_mss: state.max_acceleration_mss,
        });
    }

    Ok(())
}

/// Integrate the constrained velocities into timestamps.
fn integrate_time(
    constrained: &[ConstrainedState],
    config: &ParameterizeConfig,
) -> Result<Trajectory, TrajectoryError> {
    let mut states: Vec<TrajectoryState> = Vec::with_capacity(constrained.len());

    let mut time_s = 0.0;
    let mut distance_m = 0.0;
    let mut velocity_ms = 0.0;

    for (index, state) in constrained.iter().enumerate() {
        let ds_m = state.distance_m - distance_m;

        let acceleration_mss = if ds_m > MIN_SEGMENT_LENGTH_M {
            (state.max_velocity_ms * state.max_velocity_ms - velocity_ms * velocity_ms)
                / (2.0 * ds_m)
        } else {
            0.0
        };

        let mut dt_s = 0.0;
        if index > 0 {
            states[index - 1].acceleration_mss = if config.reversed {
                -acceleration_mss
            } else {
                acceleration_mss
            };

            if acceleration_mss.abs() > ACCEL_EPSILON {
                dt_s = (state.max_velocity_ms - velocity_ms) / acceleration_mss;
            } else if velocity_ms.abs() > ACCEL_EPSILON {
                dt_s = ds_m / velocity_ms;
            } else {
                return Err(TrajectoryError::MalformedProfile(format!(
                    "point {} is unreachable, zero velocity and zero acceleration over {} m",
                    index, ds_m
                )));
            }
        }

        velocity_ms = state.max_velocity_ms;
        distance_m = state.distance_m;
        time_s += dt_s;

        states.push(TrajectoryState {
            time_s,
            velocity_ms: if config.reversed {
                -velocity_ms
            } else {
                velocity_ms
            },
            acceleration_mss: if config.reversed {
                -acceleration_mss
            } else {
                acceleration_mss
            },
            pose: state.pose,
            curvature_radpm: state.curvature_radpm,
        });
    }

    Trajectory::new(states)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
