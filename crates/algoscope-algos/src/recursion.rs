//! Recursion family: call trees for factorial, Fibonacci (plain and
//! memoized) and fast exponentiation.
//!
//! Each call opens a tree node and returns through a matching `return`
//! step, so calls and returns nest exactly like the real stack. Memo hits
//! are leaves that never open a frame.

use std::collections::BTreeMap;

use algoscope_trace::{
    debug_assert_known, reconstruct, record, Emit, Fold, Highlight, HighlightMode, Id, Marker,
    Referencing, Registry, Retraction, Step, StepLog, Terminal, TreeNode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tree::{CallTree, TreeBuilder};

/// Steps of the recursion family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RecursionStep {
    Init { name: String },
    Call { node: TreeNode, arg: i64 },
    /// `value` is `None` when the true result does not fit in an `i64`.
    Return { node: Id, value: Option<i64> },
    MemoHit { node: TreeNode, arg: i64, value: i64 },
    /// `None` when the input has no defined result.
    Done { result: Option<i64> },
}

impl Terminal for RecursionStep {
    fn is_terminal(&self) -> bool {
        matches!(self, RecursionStep::Done { .. })
    }
}

impl Retraction for RecursionStep {
    fn marker(&self) -> Option<Marker> {
        match self {
            RecursionStep::Call { node, .. } => Some(Marker::Enter(node.id)),
            RecursionStep::Return { node, .. } => Some(Marker::Retract(*node)),
            _ => None,
        }
    }
}

impl Referencing for RecursionStep {
    fn referenced_ids(&self) -> Vec<Id> {
        match self {
            RecursionStep::Call { node, .. } | RecursionStep::MemoHit { node, .. } => {
                node.parent.into_iter().collect()
            }
            RecursionStep::Return { node, .. } => vec![*node],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameStatus {
    Running,
    Returned,
    Memoized,
}

/// What the renderer shows next to one call-tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub arg: i64,
    pub value: Option<i64>,
    pub status: FrameStatus,
}

/// Visual state of the recursion family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecursionState {
    pub name: String,
    pub tree: CallTree,
    pub frames: BTreeMap<Id, Frame>,
    /// Open calls, outermost first.
    pub stack: Vec<Id>,
    /// Memo table as it would look at this point, by argument.
    pub memo: BTreeMap<i64, i64>,
    pub highlight: Option<Highlight>,
    pub result: Option<i64>,
    pub finished: bool,
}

impl RecursionState {
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Registry for RecursionState {
    fn knows(&self, id: Id) -> bool {
        self.tree.contains(id)
    }
}

impl Fold for RecursionState {
    type Kind = RecursionStep;

    fn apply(&mut self, step: &Step<RecursionStep>) {
        debug_assert_known(self, &step.kind);
        self.highlight = None;
        match &step.kind {
            RecursionStep::Init { name } => {
                *self = Self::default();
                self.name = name.clone();
            }
            RecursionStep::Call { node, arg } => {
                self.tree.insert(node.clone());
                self.frames.insert(
                    node.id,
                    Frame {
                        arg: *arg,
                        value: None,
                        status: FrameStatus::Running,
                    },
                );
                self.stack.push(node.id);
                self.highlight = Some(Highlight::new([node.id], HighlightMode::Active));
            }
            RecursionStep::Return { node, value } => {
                if let Some(frame) = self.frames.get_mut(node) {
                    frame.value = *value;
                    frame.status = FrameStatus::Returned;
                    if let Some(value) = value {
                        self.memo.insert(frame.arg, *value);
                    }
                }
                self.stack.pop();
            }
            RecursionStep::MemoHit { node, arg, value } => {
                self.tree.insert(node.clone());
                self.frames.insert(
                    node.id,
                    Frame {
                        arg: *arg,
                        value: Some(*value),
                        status: FrameStatus::Memoized,
                    },
                );
                self.highlight = Some(Highlight::new([node.id], HighlightMode::Found));
            }
            RecursionStep::Done { result } => {
                self.result = *result;
                self.finished = true;
            }
        }
    }
}

/// Rebuild the recursion state after `steps[index]`.
pub fn reconstruct_recursion(steps: &[Step<RecursionStep>], index: usize) -> RecursionState {
    reconstruct(steps, index)
}

/// Call-tree plumbing shared by every recursive producer.
struct Calls {
    tree: TreeBuilder,
}

impl Calls {
    fn new() -> Self {
        Self {
            tree: TreeBuilder::new(),
        }
    }

    fn node(&mut self, parent: Option<Id>, label: String) -> TreeNode {
        match parent {
            Some(parent) => self.tree.child(parent, label),
            None => self.tree.root(label),
        }
    }

    fn call(&mut self, out: &mut impl Emit<RecursionStep>, parent: Option<Id>, label: String, arg: i64) -> Id {
        let node = self.node(parent, label.clone());
        let id = node.id;
        out.emit(
            Step::new(RecursionStep::Call { node, arg })
                .lines([1])
                .explain(format!("Call {}", label)),
        );
        id
    }

    fn ret(
        &self,
        out: &mut impl Emit<RecursionStep>,
        node: Id,
        value: Option<i64>,
        line: u32,
        text: String,
    ) -> Option<i64> {
        out.emit(
            Step::new(RecursionStep::Return { node, value })
                .lines([line])
                .explain(text),
        );
        value
    }
}

fn init(out: &mut impl Emit<RecursionStep>, name: String) {
    out.emit(Step::new(RecursionStep::Init { name: name.clone() }).explain(format!("Evaluate {}", name)));
}

fn done(out: &mut impl Emit<RecursionStep>, result: Option<i64>, text: String) {
    out.emit(Step::new(RecursionStep::Done { result }).explain(text));
}

/// Close a log whose input has a result, which may have left the `i64` range.
fn finish(out: &mut impl Emit<RecursionStep>, expr: String, result: Option<i64>) {
    match result {
        Some(value) => done(out, result, format!("{} = {}", expr, value)),
        None => {
            debug!(%expr, "result overflowed");
            done(out, None, format!("{} exceeds the 64-bit integer range", expr));
        }
    }
}

fn overflowed(expr: String) -> String {
    format!("{} does not fit in 64 bits", expr)
}

/// `n!` with one call per factor. Negative `n` has no result.
pub fn factorial(n: i64) -> StepLog<RecursionStep> {
    fn fact(
        out: &mut impl Emit<RecursionStep>,
        calls: &mut Calls,
        parent: Option<Id>,
        n: i64,
    ) -> Option<i64> {
        let node = calls.call(out, parent, format!("fact({})", n), n);
        if n <= 1 {
            return calls.ret(out, node, Some(1), 2, format!("Base case: fact({}) = 1", n));
        }
        let value = fact(out, calls, Some(node), n - 1).and_then(|rest| n.checked_mul(rest));
        let text = match value {
            Some(value) => format!("fact({}) = {} x fact({}) = {}", n, n, n - 1, value),
            None => overflowed(format!("fact({})", n)),
        };
        calls.ret(out, node, value, 3, text)
    }

    record("factorial", |out| {
        init(out, format!("{}!", n));
        if n < 0 {
            done(out, None, "Factorial is not defined for negative numbers".to_string());
            return;
        }
        let mut calls = Calls::new();
        let result = fact(out, &mut calls, None, n);
        finish(out, format!("{}!", n), result);
    })
}

/// Naive two-branch Fibonacci.
pub fn fibonacci(n: i64) -> StepLog<RecursionStep> {
    fn fib(
        out: &mut impl Emit<RecursionStep>,
        calls: &mut Calls,
        parent: Option<Id>,
        n: i64,
    ) -> Option<i64> {
        let node = calls.call(out, parent, format!("fib({})", n), n);
        if n < 2 {
            return calls.ret(out, node, Some(n), 2, format!("Base case: fib({}) = {}", n, n));
        }
        // An overflowed first branch already decides the sum; skip the second.
        let value = match fib(out, calls, Some(node), n - 1) {
            Some(a) => fib(out, calls, Some(node), n - 2).and_then(|b| a.checked_add(b)),
            None => None,
        };
        let text = match value {
            Some(value) => format!("fib({}) = fib({}) + fib({}) = {}", n, n - 1, n - 2, value),
            None => overflowed(format!("fib({})", n)),
        };
        calls.ret(out, node, value, 3, text)
    }

    record("fibonacci", |out| {
        init(out, format!("fib({})", n));
        if n < 0 {
            done(out, None, "Fibonacci is not defined for negative indices".to_string());
            return;
        }
        let mut calls = Calls::new();
        let result = fib(out, &mut calls, None, n);
        finish(out, format!("fib({})", n), result);
    })
}

/// Fibonacci with a memo table. A repeated argument becomes a `memo-hit`
/// leaf instead of a new subtree.
pub fn fibonacci_memo(n: i64) -> StepLog<RecursionStep> {
    fn fib(
        out: &mut impl Emit<RecursionStep>,
        calls: &mut Calls,
        memo: &mut BTreeMap<i64, i64>,
        parent: Option<Id>,
        n: i64,
    ) -> Option<i64> {
        if let Some(&value) = memo.get(&n) {
            let node = calls.node(parent, format!("fib({})", n));
            out.emit(
                Step::new(RecursionStep::MemoHit { node, arg: n, value })
                    .lines([2])
                    .explain(format!("fib({}) = {} is already known", n, value)),
            );
            return Some(value);
        }
        let node = calls.call(out, parent, format!("fib({})", n), n);
        let value = if n < 2 {
            calls.ret(out, node, Some(n), 3, format!("Base case: fib({}) = {}", n, n))
        } else {
            let value = match fib(out, calls, memo, Some(node), n - 1) {
                Some(a) => fib(out, calls, memo, Some(node), n - 2).and_then(|b| a.checked_add(b)),
                None => None,
            };
            let text = match value {
                Some(value) => format!("Store fib({}) = {}", n, value),
                None => overflowed(format!("fib({})", n)),
            };
            calls.ret(out, node, value, 4, text)
        };
        memo.insert(n, value?);
        value
    }

    record("fibonacci-memo", |out| {
        init(out, format!("fib({}) with memo", n));
        if n < 0 {
            done(out, None, "Fibonacci is not defined for negative indices".to_string());
            return;
        }
        let mut calls = Calls::new();
        let mut memo = BTreeMap::new();
        let result = fib(out, &mut calls, &mut memo, None, n);
        debug!(n, entries = memo.len(), "memo table filled");
        finish(out, format!("fib({})", n), result);
    })
}

/// `base^exp` by repeated squaring: one call per halving of `exp`.
pub fn power(base: i64, exp: i64) -> StepLog<RecursionStep> {
    fn pow(
        out: &mut impl Emit<RecursionStep>,
        calls: &mut Calls,
        parent: Option<Id>,
        base: i64,
        exp: i64,
    ) -> Option<i64> {
        let label = format!("pow({},{})", base, exp);
        let node = calls.call(out, parent, label.clone(), exp);
        if exp == 0 {
            return calls.ret(out, node, Some(1), 2, "Anything to the power 0 is 1".to_string());
        }
        let half = pow(out, calls, Some(node), base, exp / 2);
        let square = half.and_then(|h| h.checked_mul(h));
        let (value, line, text) = if exp % 2 == 0 {
            (square, 3, format!("{} is even: square pow({},{})", exp, base, exp / 2))
        } else {
            (
                square.and_then(|sq| sq.checked_mul(base)),
                4,
                format!("{} is odd: square pow({},{}) and multiply by {}", exp, base, exp / 2, base),
            )
        };
        let text = match value {
            Some(_) => text,
            None => overflowed(label),
        };
        calls.ret(out, node, value, line, text)
    }

    record("power", |out| {
        init(out, format!("{}^{}", base, exp));
        if exp < 0 {
            done(out, None, "Negative exponents are not supported".to_string());
            return;
        }
        let mut calls = Calls::new();
        let result = pow(out, &mut calls, None, base, exp);
        finish(out, format!("{}^{}", base, exp), result);
    })
}
