//! Sliding-window and two-pointer family.
//!
//! Every log ends with an explicit `found` or `not-found` verdict before
//! `done`. The window is tracked as `start` plus `len`, so `start <= end + 1`
//! holds by construction and an empty window is just `len == 0`.

use std::collections::{BTreeMap, HashMap};

use algoscope_trace::{
    debug_assert_known, reconstruct, record, Block, Emit, Fold, Highlight, HighlightMode, Id,
    Referencing, Registry, Step, StepLog, Terminal,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Steps of the window family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WindowStep {
    Init { blocks: Vec<Block> },
    /// The window's last slot becomes `end`; `value` is the tracked
    /// aggregate (sum or length) afterwards.
    Expand { end: usize, value: i64 },
    /// The window's first slot becomes `start`.
    Shrink { start: usize, value: i64 },
    /// A new best window.
    Best { start: usize, len: usize, value: i64 },
    /// Two-pointer positions.
    Pointers { left: usize, right: usize },
    Highlight { ids: Vec<Id>, mode: HighlightMode },
    Found { ids: Vec<Id>, value: i64 },
    NotFound,
    Done,
}

impl Terminal for WindowStep {
    fn is_terminal(&self) -> bool {
        matches!(self, WindowStep::Done)
    }
}

impl Referencing for WindowStep {
    fn referenced_ids(&self) -> Vec<Id> {
        match self {
            WindowStep::Highlight { ids, .. } | WindowStep::Found { ids, .. } => ids.clone(),
            _ => Vec::new(),
        }
    }
}

/// A contiguous run of slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: usize,
    pub len: usize,
}

impl Window {
    /// One past the last slot.
    pub fn end_exclusive(&self) -> usize {
        self.start + self.len
    }
}

/// The best window recorded so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestWindow {
    pub window: Window,
    pub value: i64,
}

/// How a window or two-pointer search ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowOutcome {
    Found { ids: Vec<Id>, value: i64 },
    NotFound,
}

/// Visual state of the window family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowState {
    /// Blocks in slot order.
    pub blocks: Vec<Block>,
    pub window: Window,
    pub value: i64,
    pub best: Option<BestWindow>,
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub highlight: Option<Highlight>,
    pub outcome: Option<WindowOutcome>,
    pub finished: bool,
}

impl WindowState {
    /// Ids inside the current window.
    pub fn window_ids(&self) -> Vec<Id> {
        let end = self.window.end_exclusive().min(self.blocks.len());
        let start = self.window.start.min(end);
        self.blocks[start..end].iter().map(|b| b.id).collect()
    }
}

impl Registry for WindowState {
    fn knows(&self, id: Id) -> bool {
        self.blocks.iter().any(|b| b.id == id)
    }
}

impl Fold for WindowState {
    type Kind = WindowStep;

    fn apply(&mut self, step: &Step<WindowStep>) {
        debug_assert_known(self, &step.kind);
        self.highlight = None;
        match &step.kind {
            WindowStep::Init { blocks } => {
                *self = Self::default();
                self.blocks = blocks.clone();
            }
            WindowStep::Expand { end, value } => {
                self.window.len = (end + 1).saturating_sub(self.window.start);
                self.value = *value;
            }
            WindowStep::Shrink { start, value } => {
                let end = self.window.end_exclusive();
                self.window.start = *start;
                self.window.len = end.saturating_sub(*start);
                self.value = *value;
            }
            WindowStep::Best { start, len, value } => {
                self.best = Some(BestWindow {
                    window: Window {
                        start: *start,
                        len: *len,
                    },
                    value: *value,
                });
            }
            WindowStep::Pointers { left, right } => {
                self.left = Some(*left);
                self.right = Some(*right);
            }
            WindowStep::Highlight { ids, mode } => {
                self.highlight = Some(Highlight::new(ids.iter().copied(), *mode));
            }
            WindowStep::Found { ids, value } => {
                self.outcome = Some(WindowOutcome::Found {
                    ids: ids.clone(),
                    value: *value,
                });
                self.highlight = Some(Highlight::new(ids.iter().copied(), HighlightMode::Found));
            }
            WindowStep::NotFound => {
                self.outcome = Some(WindowOutcome::NotFound);
            }
            WindowStep::Done => {
                self.finished = true;
            }
        }
    }
}

/// Rebuild the window state after `steps[index]`.
pub fn reconstruct_window(steps: &[Step<WindowStep>], index: usize) -> WindowState {
    reconstruct(steps, index)
}

fn init(blocks: &[Block], text: impl Into<String>) -> Step<WindowStep> {
    Step::new(WindowStep::Init {
        blocks: blocks.to_vec(),
    })
    .lines([1])
    .explain(text)
}

fn ids(blocks: &[Block]) -> Vec<Id> {
    blocks.iter().map(|b| b.id).collect()
}

fn not_found(out: &mut impl Emit<WindowStep>, text: impl Into<String>) {
    out.emit(Step::new(WindowStep::NotFound).explain(text));
    out.emit(Step::new(WindowStep::Done));
}

/// Close the log when a running aggregate leaves the `i64` range.
fn overflow(out: &mut impl Emit<WindowStep>, what: impl std::fmt::Display) {
    debug!(%what, "window aggregate overflowed");
    not_found(out, format!("{} does not fit in a 64-bit integer", what));
}

fn found(out: &mut impl Emit<WindowStep>, ids: Vec<Id>, value: i64, text: impl Into<String>) {
    out.emit(Step::new(WindowStep::Found { ids, value }).explain(text));
    out.emit(Step::new(WindowStep::Done));
}

/// Largest sum of `k` consecutive values.
pub fn max_sum_window(blocks: &[Block], k: usize) -> StepLog<WindowStep> {
    record("max-sum-window", |out| {
        let n = blocks.len();
        out.emit(init(blocks, format!("Find the largest sum of {} consecutive values", k)));
        if k == 0 || k > n {
            debug!(k, n, "window size out of range");
            not_found(out, format!("A window of {} does not fit in {} values", k, n));
            return;
        }

        let mut sum: i64 = 0;
        for (end, block) in blocks[..k].iter().enumerate() {
            let Some(next) = sum.checked_add(block.value) else {
                return overflow(out, format!("{} + {}", sum, block.value));
            };
            sum = next;
            out.emit(
                Step::new(WindowStep::Expand { end, value: sum })
                    .lines([2])
                    .explain(format!("Add {}, sum is {}", block.value, sum)),
            );
        }
        let mut best = (0, sum);
        out.emit(Step::new(WindowStep::Best { start: 0, len: k, value: sum }).lines([3]));

        for end in k..n {
            let Some(next) = sum.checked_add(blocks[end].value) else {
                return overflow(out, format!("{} + {}", sum, blocks[end].value));
            };
            sum = next;
            out.emit(
                Step::new(WindowStep::Expand { end, value: sum })
                    .lines([4])
                    .explain(format!("Slide right: add {}", blocks[end].value)),
            );
            let start = end + 1 - k;
            let Some(next) = sum.checked_sub(blocks[start - 1].value) else {
                return overflow(out, format!("{} - {}", sum, blocks[start - 1].value));
            };
            sum = next;
            out.emit(
                Step::new(WindowStep::Shrink { start, value: sum })
                    .lines([5])
                    .explain(format!("Drop {}, sum is {}", blocks[start - 1].value, sum)),
            );
            if sum > best.1 {
                best = (start, sum);
                out.emit(
                    Step::new(WindowStep::Best { start, len: k, value: sum })
                        .lines([6])
                        .explain(format!("New best sum {}", sum)),
                );
            }
        }
        let (start, value) = best;
        found(
            out,
            ids(&blocks[start..start + k]),
            value,
            format!("Largest sum is {}", value),
        );
    })
}

/// Shortest run whose sum is at least `target` (values assumed non-negative).
pub fn min_length_window(blocks: &[Block], target: i64) -> StepLog<WindowStep> {
    record("min-length-window", |out| {
        out.emit(init(blocks, format!("Find the shortest run summing to at least {}", target)));
        let mut start = 0;
        let mut sum: i64 = 0;
        let mut best: Option<(usize, usize, i64)> = None;

        for (end, block) in blocks.iter().enumerate() {
            let Some(next) = sum.checked_add(block.value) else {
                return overflow(out, format!("{} + {}", sum, block.value));
            };
            sum = next;
            out.emit(
                Step::new(WindowStep::Expand { end, value: sum })
                    .lines([2])
                    .explain(format!("Add {}, sum is {}", block.value, sum)),
            );
            while start <= end && sum >= target {
                let len = end + 1 - start;
                if best.map_or(true, |(_, best_len, _)| len < best_len) {
                    best = Some((start, len, sum));
                    out.emit(
                        Step::new(WindowStep::Best { start, len, value: sum })
                            .lines([4])
                            .explain(format!("Length {} reaches the target", len)),
                    );
                }
                let Some(next) = sum.checked_sub(blocks[start].value) else {
                    return overflow(out, format!("{} - {}", sum, blocks[start].value));
                };
                sum = next;
                start += 1;
                out.emit(
                    Step::new(WindowStep::Shrink { start, value: sum })
                        .lines([5])
                        .explain(format!("Drop {} to try a shorter run", blocks[start - 1].value)),
                );
            }
        }
        match best {
            Some((start, len, value)) => found(
                out,
                ids(&blocks[start..start + len]),
                value,
                format!("Shortest run has length {}", len),
            ),
            None => not_found(out, format!("No run reaches {}", target)),
        }
    })
}

/// Longest run without a repeated value.
pub fn longest_distinct_window(blocks: &[Block]) -> StepLog<WindowStep> {
    record("longest-distinct-window", |out| {
        out.emit(init(blocks, "Find the longest run with no repeated value"));
        if blocks.is_empty() {
            not_found(out, "The array is empty");
            return;
        }
        let mut last_seen: HashMap<i64, usize> = HashMap::new();
        let mut start = 0;
        let mut best: (usize, usize) = (0, 0);

        for (end, block) in blocks.iter().enumerate() {
            if let Some(&seen) = last_seen.get(&block.value).filter(|&&i| i >= start) {
                out.emit(
                    Step::new(WindowStep::Highlight {
                        ids: vec![blocks[seen].id, block.id],
                        mode: HighlightMode::Rejected,
                    })
                    .lines([3])
                    .explain(format!("{} repeats", block.value)),
                );
                start = seen + 1;
                out.emit(
                    Step::new(WindowStep::Shrink {
                        start,
                        value: (end - start) as i64,
                    })
                    .lines([4])
                    .explain("Move the start past the earlier copy"),
                );
            }
            last_seen.insert(block.value, end);
            let len = end + 1 - start;
            out.emit(
                Step::new(WindowStep::Expand { end, value: len as i64 })
                    .lines([5])
                    .explain(format!("Take {}, window length {}", block.value, len)),
            );
            if len > best.1 {
                best = (start, len);
                out.emit(Step::new(WindowStep::Best {
                    start,
                    len,
                    value: len as i64,
                }));
            }
        }
        let (start, len) = best;
        found(
            out,
            ids(&blocks[start..start + len]),
            len as i64,
            format!("Longest distinct run has length {}", len),
        );
    })
}

/// Pair summing to `target`, by two pointers closing in on a value-sorted
/// copy of the input.
pub fn two_sum(blocks: &[Block], target: i64) -> StepLog<WindowStep> {
    record("two-sum", |out| {
        let mut sorted = blocks.to_vec();
        sorted.sort_by_key(|b| b.value);
        out.emit(init(&sorted, format!("Find two values adding to {}", target)));
        if sorted.len() < 2 {
            not_found(out, "Need at least two values");
            return;
        }

        let (mut left, mut right) = (0, sorted.len() - 1);
        out.emit(Step::new(WindowStep::Pointers { left, right }).lines([2]));
        while left < right {
            let (a, b) = (&sorted[left], &sorted[right]);
            // Widened so two large values can still be compared to the target.
            let sum = i128::from(a.value) + i128::from(b.value);
            let target_wide = i128::from(target);
            out.emit(
                Step::new(WindowStep::Highlight {
                    ids: vec![a.id, b.id],
                    mode: HighlightMode::Compare,
                })
                .lines([3])
                .explain(format!("{} + {} = {}", a.value, b.value, sum))
                .pointer("left", a.id)
                .pointer("right", b.id),
            );
            if sum == target_wide {
                found(
                    out,
                    vec![a.id, b.id],
                    target,
                    format!("{} + {} = {}", a.value, b.value, target),
                );
                return;
            }
            if sum < target_wide {
                left += 1;
            } else {
                right -= 1;
            }
            out.emit(
                Step::new(WindowStep::Pointers { left, right })
                    .lines([if sum < target_wide { 4 } else { 5 }])
                    .explain(if sum < target_wide {
                        "Too small, move left up"
                    } else {
                        "Too large, move right down"
                    }),
            );
        }
        not_found(out, format!("No pair adds to {}", target));
    })
}

/// Whether the values read the same both ways.
pub fn is_palindrome(blocks: &[Block]) -> StepLog<WindowStep> {
    record("is-palindrome", |out| {
        out.emit(init(blocks, "Compare values from both ends"));
        let (mut left, mut right) = (0, blocks.len().saturating_sub(1));
        if !blocks.is_empty() {
            out.emit(Step::new(WindowStep::Pointers { left, right }).lines([2]));
        }
        while left < right {
            let (a, b) = (&blocks[left], &blocks[right]);
            out.emit(
                Step::new(WindowStep::Highlight {
                    ids: vec![a.id, b.id],
                    mode: HighlightMode::Compare,
                })
                .lines([3])
                .explain(format!("Compare {} and {}", a.value, b.value)),
            );
            if a.value != b.value {
                not_found(out, format!("{} differs from {}: not a palindrome", a.value, b.value));
                return;
            }
            left += 1;
            right -= 1;
            out.emit(Step::new(WindowStep::Pointers { left, right }).lines([4]));
        }
        found(out, ids(blocks), blocks.len() as i64, "Reads the same both ways");
    })
}

/// Two heights that hold the most water between them.
pub fn container_with_most_water(blocks: &[Block]) -> StepLog<WindowStep> {
    record("container-with-most-water", |out| {
        out.emit(init(blocks, "Find the two walls that hold the most water"));
        if blocks.len() < 2 {
            not_found(out, "Need at least two walls");
            return;
        }
        let (mut left, mut right) = (0, blocks.len() - 1);
        let mut best: Option<(usize, usize, i64)> = None;
        out.emit(Step::new(WindowStep::Pointers { left, right }).lines([2]));
        while left < right {
            let (a, b) = (&blocks[left], &blocks[right]);
            let height = a.value.min(b.value);
            let width = (right - left) as i64;
            let Some(area) = height.checked_mul(width) else {
                return overflow(out, format!("{} * {}", height, width));
            };
            out.emit(
                Step::new(WindowStep::Highlight {
                    ids: vec![a.id, b.id],
                    mode: HighlightMode::Compare,
                })
                .lines([3])
                .explain(format!("Walls {} and {} hold {}", a.value, b.value, area)),
            );
            if best.map_or(true, |(_, _, value)| area > value) {
                best = Some((left, right, area));
                out.emit(
                    Step::new(WindowStep::Best {
                        start: left,
                        len: right - left + 1,
                        value: area,
                    })
                    .lines([4]),
                );
            }
            if a.value < b.value {
                left += 1;
            } else {
                right -= 1;
            }
            out.emit(
                Step::new(WindowStep::Pointers { left, right })
                    .lines([5])
                    .explain("Move the shorter wall inward"),
            );
        }
        let mut ids_by_slot = BTreeMap::new();
        if let Some((l, r, area)) = best {
            ids_by_slot.insert(l, blocks[l].id);
            ids_by_slot.insert(r, blocks[r].id);
            found(
                out,
                ids_by_slot.into_values().collect(),
                area,
                format!("Most water is {}", area),
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoscope_trace::{reconstruct_final, validate_references, validate_terminal};

    fn final_state(steps: &[Step<WindowStep>]) -> WindowState {
        reconstruct_final(steps)
    }

    fn assert_window_valid(steps: &[Step<WindowStep>], n: usize) {
        for i in 0..steps.len() {
            let state = reconstruct_window(steps, i);
            assert!(state.window.len <= n, "step {} len {}", i, state.window.len);
            assert!(state.window.end_exclusive() <= n, "step {} overruns", i);
        }
    }

    fn found_value(state: &WindowState) -> Option<i64> {
        match &state.outcome {
            Some(WindowOutcome::Found { value, .. }) => Some(*value),
            _ => None,
        }
    }

    #[test]
    fn max_sum_of_three() {
        let blocks = Block::from_values(&[2, 1, 5, 1, 3, 2]);
        let steps = max_sum_window(&blocks, 3);
        assert!(validate_terminal(&steps).is_ok());
        assert!(validate_references::<WindowState>(&steps).is_ok());
        assert_window_valid(&steps, blocks.len());
        let state = final_state(&steps);
        assert_eq!(found_value(&state), Some(9));
        assert_eq!(state.best.map(|b| b.window.start), Some(2));
    }

    #[test]
    fn window_larger_than_input_is_not_found() {
        let steps = max_sum_window(&Block::from_values(&[1, 2]), 3);
        assert!(validate_terminal(&steps).is_ok());
        assert_eq!(final_state(&steps).outcome, Some(WindowOutcome::NotFound));
    }

    #[test]
    fn min_length_reaching_target() {
        let blocks = Block::from_values(&[2, 3, 1, 2, 4, 3]);
        let steps = min_length_window(&blocks, 7);
        assert_window_valid(&steps, blocks.len());
        let state = final_state(&steps);
        assert_eq!(state.best.map(|b| b.window.len), Some(2));
        assert_eq!(found_value(&state), Some(7));

        let steps = min_length_window(&blocks, 100);
        assert_eq!(final_state(&steps).outcome, Some(WindowOutcome::NotFound));
    }

    #[test]
    fn longest_distinct_run() {
        let blocks = Block::from_values(&[1, 2, 1, 3, 4, 3]);
        let steps = longest_distinct_window(&blocks);
        assert_window_valid(&steps, blocks.len());
        assert_eq!(found_value(&final_state(&steps)), Some(4));
    }

    #[test]
    fn two_sum_finds_pair() {
        let steps = two_sum(&Block::from_values(&[1, 2, 3, 4]), 5);
        assert!(validate_references::<WindowState>(&steps).is_ok());
        let found_step = steps
            .iter()
            .find_map(|s| match &s.kind {
                WindowStep::Found { ids, value } => Some((ids.clone(), *value)),
                _ => None,
            })
            .unwrap();
        assert_eq!(found_step.1, 5);
        let state = final_state(&steps);
        let sum: i64 = found_step
            .0
            .iter()
            .map(|id| state.blocks.iter().find(|b| b.id == *id).unwrap().value)
            .sum();
        assert_eq!(sum, 5);
    }

    #[test]
    fn two_sum_missing_pair() {
        let state = final_state(&two_sum(&Block::from_values(&[1, 2, 3]), 10));
        assert_eq!(state.outcome, Some(WindowOutcome::NotFound));
        let state = final_state(&two_sum(&Block::from_values(&[5]), 5));
        assert_eq!(state.outcome, Some(WindowOutcome::NotFound));
    }

    #[test]
    fn palindromes() {
        assert!(matches!(
            final_state(&is_palindrome(&Block::from_values(&[1, 2, 3, 2, 1]))).outcome,
            Some(WindowOutcome::Found { .. })
        ));
        assert_eq!(
            final_state(&is_palindrome(&Block::from_values(&[1, 2, 3]))).outcome,
            Some(WindowOutcome::NotFound)
        );
        assert!(matches!(
            final_state(&is_palindrome(&[])).outcome,
            Some(WindowOutcome::Found { .. })
        ));
    }

    #[test]
    fn most_water() {
        let blocks = Block::from_values(&[1, 8, 6, 2, 5, 4, 8, 3, 7]);
        let state = final_state(&container_with_most_water(&blocks));
        assert_eq!(found_value(&state), Some(49));
    }

    #[test]
    fn running_sum_overflow_ends_not_found() {
        let logs = [
            max_sum_window(&Block::from_values(&[i64::MAX, 1]), 2),
            max_sum_window(&Block::from_values(&[1, 2, i64::MAX]), 2),
            min_length_window(&Block::from_values(&[1, i64::MAX]), i64::MAX),
            container_with_most_water(&Block::from_values(&[i64::MAX, 0, i64::MAX])),
        ];
        for steps in &logs {
            assert!(validate_terminal(steps).is_ok());
            assert_eq!(final_state(steps).outcome, Some(WindowOutcome::NotFound));
            let verdict = &steps[steps.len() - 2];
            assert!(verdict.explanation().contains("64-bit"), "{}", verdict.explanation());
        }
    }

    #[test]
    fn two_sum_with_extreme_values() {
        let blocks = Block::from_values(&[i64::MAX, -1, i64::MAX]);
        let state = final_state(&two_sum(&blocks, i64::MAX - 1));
        assert_eq!(found_value(&state), Some(i64::MAX - 1));

        let state = final_state(&two_sum(&blocks, 1));
        assert_eq!(state.outcome, Some(WindowOutcome::NotFound));
    }
}
