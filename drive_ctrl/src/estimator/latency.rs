//! Kalman filter latency compensation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum number of retained snapshots. At a 20 ms control period this
/// keeps six seconds of history, far beyond any realistic sensor latency.
const MAX_SNAPSHOTS: usize = 300;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// An observer whose internal state can be captured and restored, so the
/// compensator can rewind it and replay its update steps.
pub trait LatencyObserver {
    /// The full internal state of the observer, state estimate and error
    /// covariance included.
    type State: Clone;

    /// The control inputs applied over one period.
    type Inputs: Clone;

    /// The local (low-latency) measurement used in the correct step.
    type LocalMeasurement: Clone;

    /// Capture the current internal state.
    fn state(&self) -> Self::State;

    /// Restore a previously captured internal state.
    fn set_state(&mut self, state: &Self::State);

    /// Run the predict step over `dt_s` with the given inputs.
    fn predict(&mut self, inputs: &Self::Inputs, dt_s: f64);

    /// Run the correct step with the given local measurement.
    fn correct(&mut self, inputs: &Self::Inputs, measurement: &Self::LocalMeasurement);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One recorded filter cycle.
#[derive(Clone)]
struct ObserverSnapshot<O: LatencyObserver> {
    time_s: f64,
    state: O::State,
    inputs: O::Inputs,
    local_measurement: O::LocalMeasurement,
}

/// Replays a delayed global measurement into an observer's history.
///
/// Every filter cycle the caller records a snapshot of the observer with
/// [`add_observer_state`](Self::add_observer_state). When a delayed
/// measurement arrives,
/// [`apply_past_global_measurement`](Self::apply_past_global_measurement)
/// rewinds the observer to the snapshot nearest the measurement's
/// timestamp, applies the correction there, and replays every later cycle
/// from its recorded inputs and local measurements, leaving the live
/// estimate as if the measurement had never been late.
#[derive(Clone)]
pub struct LatencyCompensator<O: LatencyObserver> {
    snapshots: Vec<ObserverSnapshot<O>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<O: LatencyObserver> LatencyCompensator<O> {
    /// Create an empty compensator.
    pub fn new() -> Self {
        Self {
            snapshots: Vec::with_capacity(MAX_SNAPSHOTS),
        }
    }

    /// Forget all recorded history.
    pub fn reset(&mut self) {
        self.snapshots.clear();
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True if no snapshots are retained.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Record the observer's state along with the inputs and local
    /// measurement of the cycle that just ran. Call once per filter cycle,
    /// with monotonically increasing timestamps. The oldest snapshot is
    /// evicted once the ring is full.
    pub fn add_observer_state(
        &mut self,
        observer: &O,
        inputs: O::Inputs,
        local_measurement: O::LocalMeasurement,
        time_s: f64,
    ) {
        self.snapshots.push(ObserverSnapshot {
            time_s,
            state: observer.state(),
            inputs,
            local_measurement,
        });

        if self.snapshots.len() > MAX_SNAPSHOTS {
            self.snapshots.remove(0);
        }
    }

    /// Fuse a global measurement taken at `time_s` into the observer.
    ///
    /// `global_correct` runs the observer's correct step for the
    /// measurement; it receives the inputs that were recorded at the
    /// snapshot where the correction lands. A measurement older than the
    /// entire retained history is dropped, since no state exists to
    /// correct.
    pub fn apply_past_global_measurement<F>(
        &mut self,
        observer: &mut O,
        nominal_dt_s: f64,
        time_s: f64,
        global_correct: F,
    ) where
        F: FnOnce(&mut O, &O::Inputs),
    {
        if self.snapshots.is_empty() {
            debug!("No observer snapshots recorded, ignoring global measurement");
            return;
        }

        if time_s < self.snapshots[0].time_s {
            debug!(
                "Global measurement at {} s predates the retained history, dropping it",
                time_s
            );
            return;
        }

        // Nearest snapshot by timestamp
        let upper = self.snapshots.partition_point(|s| s.time_s < time_s);
        let closest = if upper == 0 {
            0
        } else if upper == self.snapshots.len() {
            upper - 1
        } else if time_s - self.snapshots[upper - 1].time_s
            <= self.snapshots[upper].time_s - time_s
        {
            upper - 1
        } else {
            upper
        };

        // Rewind to the chosen snapshot, correct there, and regenerate
        // every later snapshot by replaying its recorded cycle
        let mut last_time_s = self.snapshots[closest].time_s - nominal_dt_s;

        let mut global_correct = Some(global_correct);
        for i in closest..self.snapshots.len() {
            let snapshot_time_s = self.snapshots[i].time_s;

            if i == closest {
                observer.set_state(&self.snapshots[i].state);
            }

            let inputs = self.snapshots[i].inputs.clone();
            let local_measurement = self.snapshots[i].local_measurement.clone();

            observer.predict(&inputs, snapshot_time_s - last_time_s);
            observer.correct(&inputs, &local_measurement);

            if i == closest {
                // Unwrap is safe, the closure is taken exactly once
                (global_correct.take().unwrap())(observer, &inputs);
            }

            self.snapshots[i].state = observer.state();
            last_time_s = snapshot_time_s;
        }
    }
}

impl<O: LatencyObserver> Default for LatencyCompensator<O> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
