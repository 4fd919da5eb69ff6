//! Algoscope Step Traces
//!
//! Deterministic algorithm traces that can be replayed to any point.
//!
//! # Model
//!
//! A generator runs a real algorithm and yields a [`Step`] at each semantic
//! point (after a compare, after a swap, after a branch pick). The steps are
//! drained eagerly into a [`StepLog`], which is immutable from then on.
//! A family's visual state implements [`Fold`]; [`reconstruct`] rebuilds the
//! state at any index by folding the log from the start, so seeking forward
//! and backward never drifts from what the log says.
//!
//! ```text
//! inputs → generator → StepLog → [index] → reconstruct → visual state
//! ```
//!
//! # Composition
//!
//! Generators take `&mut impl Emit<K>`. A recursive generator hands the same
//! sink to its children and gets their result back as an ordinary return
//! value, so nested production lands in one ordered stream.

mod emit;
mod entity;
mod error;
mod fold;
mod id;
mod pointer;
mod step;
mod validate;

pub use emit::{record, record_with, Emit, ForEach, Recorder, StepLog};
pub use entity::{Block, Highlight, HighlightMode, TreeNode};
pub use error::{Result, TraceError};
pub use fold::{fold_into, reconstruct, reconstruct_final, Fold};
pub use id::{Id, IdAllocator, DERIVED_BIT};
pub use pointer::{Pointer, Pointers};
pub use step::Step;
pub use validate::{
    debug_assert_known, validate_balance, validate_references, validate_terminal, Marker,
    Referencing, Registry, Retraction, Terminal,
};
