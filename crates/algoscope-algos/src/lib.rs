//! Algoscope Algorithm Families
//!
//! Step-emitting generators and their visual-state reconstructors.
//!
//! # Families
//!
//! | Module | Generators |
//! |---|---|
//! | [`array`] | bubble, selection, insertion, merge and quick sort; linear and binary search; min/max |
//! | [`list`] | traversal, reversal, Floyd cycle detection, middle node, remove n-th from end |
//! | [`interval`] | merge, insert, gaps, activity selection, minimum rooms |
//! | [`window`] | max-sum and min-length windows, longest distinct run, two-sum, palindrome, container |
//! | [`graph`] | BFS, DFS, Kahn topological sort |
//! | [`backtrack`] | subsets, permutations, combination sum, keypad letters |
//! | [`board`] | N-Queens, Sudoku, rat in a maze |
//! | [`recursion`] | factorial, Fibonacci (plain and memoized), fast power |
//! | [`bits`] | parity, popcount, power-of-two test, single-bit edits, shifts |
//!
//! Every module follows one shape: an `XxxStep` kind enum, an `XxxState`
//! implementing [`Fold`](algoscope_trace::Fold), a `reconstruct_xxx`
//! function and one generator per algorithm returning a
//! [`StepLog`](algoscope_trace::StepLog).
//!
//! Every log opens with `init` and closes with a terminal step. Degenerate
//! input never yields an empty log: it gets `init`, an explanatory verdict
//! and `done`.

pub mod array;
pub mod backtrack;
pub mod bits;
pub mod board;
pub mod graph;
pub mod interval;
pub mod list;
pub mod recursion;
pub mod tree;
pub mod window;

pub use array::{ArrayState, ArrayStep};
pub use backtrack::{BacktrackState, BacktrackStep};
pub use bits::{BitWidth, Bits, BitsState, BitsStep};
pub use board::{Board, BoardState, BoardStep};
pub use graph::{Graph, GraphState, GraphStep};
pub use interval::{Interval, IntervalState, IntervalStep};
pub use list::{LinkedList, ListState, ListStep};
pub use recursion::{RecursionState, RecursionStep};
pub use tree::{CallTree, TreeBuilder};
pub use window::{WindowState, WindowStep};
