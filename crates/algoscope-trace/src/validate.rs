//! Log validators.
//!
//! Reconstruction trusts the log. These checks exist so tests can prove a
//! generator never produces a log the reconstructor would have to guess
//! about.

use crate::{Fold, Id, Result, Step, TraceError};

/// Step kinds that can end a log.
pub trait Terminal {
    /// Whether this kind is a terminal marker.
    fn is_terminal(&self) -> bool;
}

/// Entry and retraction markers (pick/unpick, call/return).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Enter(Id),
    Retract(Id),
}

/// Step kinds that may open or close a branch.
pub trait Retraction {
    /// The marker this step carries, if any.
    fn marker(&self) -> Option<Marker>;
}

/// Step kinds that point at entities which must already exist.
pub trait Referencing {
    /// Ids that must be present in the state folded so far.
    fn referenced_ids(&self) -> Vec<Id>;
}

/// Visual states that can answer whether an entity exists.
pub trait Registry {
    /// Whether `id` is known to this state.
    fn knows(&self, id: Id) -> bool;
}

/// Guard for `Fold::apply` in debug builds: every id `kind` names must
/// already be known to `state`.
///
/// # Panics
///
/// In debug builds, if a referenced id is absent.
#[track_caller]
pub fn debug_assert_known<S: Registry, K: Referencing>(state: &S, kind: &K) {
    if cfg!(debug_assertions) {
        if let Some(id) = kind.referenced_ids().into_iter().find(|&id| !state.knows(id)) {
            panic!("step references unknown id {id}");
        }
    }
}

/// Check the log is non-empty and ends in a terminal step.
pub fn validate_terminal<K: Terminal>(steps: &[Step<K>]) -> Result<()> {
    match steps.last() {
        None => Err(TraceError::Empty),
        Some(step) if step.kind.is_terminal() => Ok(()),
        Some(_) => Err(TraceError::MissingTerminal {
            last: steps.len() - 1,
        }),
    }
}

/// Check entry/retraction markers nest like balanced parentheses.
///
/// Returns the ids still open at the end, innermost last. When
/// `allow_open` is false any open entry is an error; backtracking searches
/// that stop on an accepted path pass `true`.
pub fn validate_balance<K: Retraction>(steps: &[Step<K>], allow_open: bool) -> Result<Vec<Id>> {
    let mut open: Vec<Id> = Vec::new();
    for (index, step) in steps.iter().enumerate() {
        match step.kind.marker() {
            Some(Marker::Enter(id)) => open.push(id),
            Some(Marker::Retract(id)) => {
                if open.last() != Some(&id) {
                    return Err(TraceError::UnbalancedRetraction {
                        index,
                        id,
                        expected: open.last().copied(),
                    });
                }
                open.pop();
            }
            None => {}
        }
    }
    if !allow_open && !open.is_empty() {
        return Err(TraceError::DanglingEntry { ids: open });
    }
    Ok(open)
}

/// Check every referenced id exists in the state folded up to that step.
pub fn validate_references<S>(steps: &[Step<S::Kind>]) -> Result<()>
where
    S: Fold + Registry,
    S::Kind: Referencing,
{
    let mut state = S::default();
    for (index, step) in steps.iter().enumerate() {
        if let Some(id) = step
            .kind
            .referenced_ids()
            .into_iter()
            .find(|&id| !state.knows(id))
        {
            return Err(TraceError::UnknownId { index, id });
        }
        state.apply(step);
    }
    Ok(())
}
