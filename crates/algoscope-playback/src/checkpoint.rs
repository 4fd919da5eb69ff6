//! Periodic state snapshots for fast seeking.
//!
//! A snapshot is taken after every `interval`-th step. Seeking clones the
//! nearest snapshot at or before the target and folds the few steps in
//! between, which gives exactly what a full fold from the start would.

use algoscope_trace::{fold_into, Fold, Step};
use tracing::debug;

use crate::{PlaybackError, Result};

/// Snapshots of a fold at indices `0, interval, 2 * interval, ...`.
#[derive(Debug, Clone)]
pub struct Checkpoints<S> {
    interval: usize,
    states: Vec<S>,
}

impl<S: Fold + Clone> Checkpoints<S> {
    /// Fold `steps` once, keeping a snapshot after every `interval`-th step.
    pub fn build(steps: &[Step<S::Kind>], interval: usize) -> Result<Self> {
        if interval == 0 {
            return Err(PlaybackError::InvalidCheckpointInterval(interval));
        }
        let mut states = Vec::with_capacity(steps.len() / interval + 1);
        let mut state = S::default();
        for (index, step) in steps.iter().enumerate() {
            state.apply(step);
            if index % interval == 0 {
                states.push(state.clone());
            }
        }
        debug!(steps = steps.len(), interval, snapshots = states.len(), "checkpoints built");
        Ok(Self { interval, states })
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Number of snapshots held.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The state after `steps[index]`, with the same clamping as
    /// [`reconstruct`](algoscope_trace::reconstruct).
    ///
    /// `steps` must be the log these checkpoints were built from.
    pub fn state_at(&self, steps: &[Step<S::Kind>], index: usize) -> S {
        let Some(last) = steps.len().checked_sub(1) else {
            return S::default();
        };
        let index = index.min(last);
        let slot = (index / self.interval).min(self.states.len().saturating_sub(1));
        let Some(snapshot) = self.states.get(slot) else {
            return S::default();
        };
        let mut state = snapshot.clone();
        fold_into(&mut state, &steps[slot * self.interval + 1..=index]);
        state
    }
}
