//! Reconstruction: a pure left fold over a step log.

use crate::Step;

/// A visual state that can be rebuilt from a family's steps.
///
/// `apply` must be deterministic and total: the same prior state and the
/// same step always give the same resulting state.
pub trait Fold: Default {
    /// The family's step kind.
    type Kind;

    /// Apply one step's transition.
    fn apply(&mut self, step: &Step<Self::Kind>);
}

/// Rebuild the state after `steps[index]` has been applied.
///
/// Starts from `S::default()` every call and reads nothing past `index`.
/// An index past the end is clamped to the final step; an empty log yields
/// the default state.
pub fn reconstruct<S: Fold>(steps: &[Step<S::Kind>], index: usize) -> S {
    let mut state = S::default();
    if let Some(last) = steps.len().checked_sub(1) {
        fold_into(&mut state, &steps[..=index.min(last)]);
    }
    state
}

/// Rebuild the state after the whole log.
pub fn reconstruct_final<S: Fold>(steps: &[Step<S::Kind>]) -> S {
    reconstruct(steps, steps.len().saturating_sub(1))
}

/// Apply `steps` to an existing state, in order.
pub fn fold_into<S: Fold>(state: &mut S, steps: &[Step<S::Kind>]) {
    for step in steps {
        state.apply(step);
    }
}
