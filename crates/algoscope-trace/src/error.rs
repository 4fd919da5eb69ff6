//! Error types for algoscope-trace.

use thiserror::Error;

use crate::Id;

/// Result type for step-log validation.
pub type Result<T> = std::result::Result<T, TraceError>;

/// Defects a step log can exhibit. These are generator bugs, reported by
/// the validators so tests can catch them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// The log has no steps at all.
    #[error("step log is empty")]
    Empty,

    /// The last step is not a terminal step.
    #[error("step log does not end in a terminal step (last index {last})")]
    MissingTerminal { last: usize },

    /// A step refers to an id the folded state does not know.
    #[error("step {index} references unknown id {id}")]
    UnknownId { index: usize, id: Id },

    /// A retraction does not close the innermost open entry.
    #[error("step {index} retracts {id} but the innermost open entry is {expected:?}")]
    UnbalancedRetraction {
        index: usize,
        id: Id,
        expected: Option<Id>,
    },

    /// Entries still open when the log ended.
    #[error("entries left open at end of log: {ids:?}")]
    DanglingEntry { ids: Vec<Id> },
}
