//! Array family: comparison sorts and searches over [`Block`]s.
//!
//! The visual state is a slot order (slot → id). Positions change only via
//! `swap` and `move`, values only via `overwrite`.

use std::collections::{BTreeMap, BTreeSet};

use algoscope_trace::{
    debug_assert_known, reconstruct, record, Block, Emit, Fold, Highlight, HighlightMode, Id,
    Referencing, Registry, Step, StepLog, Terminal,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Steps of the array family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ArrayStep {
    /// Complete starting array, in slot order.
    Init { blocks: Vec<Block> },
    /// Two blocks are compared.
    Compare { a: Id, b: Id },
    /// Two blocks exchange slots.
    Swap { a: Id, b: Id },
    /// A block is lifted out and reinserted at slot `to`; blocks in between shift.
    Move { id: Id, to: usize },
    /// A block's value changes.
    Overwrite { id: Id, value: i64 },
    /// Blocks have reached their final slot.
    MarkSorted { ids: Vec<Id> },
    /// Transient emphasis.
    Highlight { ids: Vec<Id>, mode: HighlightMode },
    /// The search target was found.
    Found { id: Id },
    /// The search ended without a match.
    NotFound,
    /// End of the log.
    Done,
}

impl Terminal for ArrayStep {
    fn is_terminal(&self) -> bool {
        matches!(self, ArrayStep::Done)
    }
}

impl Referencing for ArrayStep {
    fn referenced_ids(&self) -> Vec<Id> {
        match self {
            ArrayStep::Compare { a, b } | ArrayStep::Swap { a, b } => vec![*a, *b],
            ArrayStep::Move { id, .. }
            | ArrayStep::Overwrite { id, .. }
            | ArrayStep::Found { id } => vec![*id],
            ArrayStep::MarkSorted { ids } | ArrayStep::Highlight { ids, .. } => ids.clone(),
            ArrayStep::Init { .. } | ArrayStep::NotFound | ArrayStep::Done => Vec::new(),
        }
    }
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchOutcome {
    Found(Id),
    NotFound,
}

/// Visual state of the array family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayState {
    /// Block registry by id.
    pub blocks: BTreeMap<Id, Block>,
    /// Slot order: `order[slot]` is the id shown in that slot.
    pub order: Vec<Id>,
    pub highlight: Option<Highlight>,
    pub sorted: BTreeSet<Id>,
    pub outcome: Option<SearchOutcome>,
    pub finished: bool,
}

impl ArrayState {
    /// Slot currently holding `id`.
    pub fn position(&self, id: Id) -> Option<usize> {
        self.order.iter().position(|&x| x == id)
    }

    /// Id → slot map, derived from the slot order.
    pub fn positions(&self) -> BTreeMap<Id, usize> {
        self.order
            .iter()
            .enumerate()
            .map(|(slot, &id)| (id, slot))
            .collect()
    }

    /// Values in slot order.
    pub fn values(&self) -> Vec<i64> {
        self.order
            .iter()
            .filter_map(|id| self.blocks.get(id).map(|b| b.value))
            .collect()
    }
}

impl Registry for ArrayState {
    fn knows(&self, id: Id) -> bool {
        self.blocks.contains_key(&id)
    }
}

impl Fold for ArrayState {
    type Kind = ArrayStep;

    fn apply(&mut self, step: &Step<ArrayStep>) {
        debug_assert_known(self, &step.kind);
        self.highlight = None;
        match &step.kind {
            ArrayStep::Init { blocks } => {
                *self = Self::default();
                self.order = blocks.iter().map(|b| b.id).collect();
                self.blocks = blocks.iter().map(|b| (b.id, b.clone())).collect();
            }
            ArrayStep::Compare { a, b } => {
                self.highlight = Some(Highlight::new([*a, *b], HighlightMode::Compare));
            }
            ArrayStep::Swap { a, b } => {
                if let (Some(i), Some(j)) = (self.position(*a), self.position(*b)) {
                    self.order.swap(i, j);
                }
                self.highlight = Some(Highlight::new([*a, *b], HighlightMode::Active));
            }
            ArrayStep::Move { id, to } => {
                if let Some(from) = self.position(*id) {
                    self.order.remove(from);
                    let to = (*to).min(self.order.len());
                    self.order.insert(to, *id);
                }
                self.highlight = Some(Highlight::new([*id], HighlightMode::Active));
            }
            ArrayStep::Overwrite { id, value } => {
                if let Some(block) = self.blocks.get_mut(id) {
                    block.value = *value;
                }
                self.highlight = Some(Highlight::new([*id], HighlightMode::Active));
            }
            ArrayStep::MarkSorted { ids } => {
                self.sorted.extend(ids.iter().copied());
            }
            ArrayStep::Highlight { ids, mode } => {
                self.highlight = Some(Highlight::new(ids.iter().copied(), *mode));
            }
            ArrayStep::Found { id } => {
                self.outcome = Some(SearchOutcome::Found(*id));
                self.highlight = Some(Highlight::new([*id], HighlightMode::Found));
            }
            ArrayStep::NotFound => {
                self.outcome = Some(SearchOutcome::NotFound);
            }
            ArrayStep::Done => {
                self.finished = true;
            }
        }
    }
}

/// Rebuild the array state after `steps[index]`.
pub fn reconstruct_array(steps: &[Step<ArrayStep>], index: usize) -> ArrayState {
    reconstruct(steps, index)
}

fn init(blocks: &[Block], text: impl Into<String>) -> Step<ArrayStep> {
    Step::new(ArrayStep::Init {
        blocks: blocks.to_vec(),
    })
    .lines([1])
    .explain(text)
}

fn compare(a: &Block, b: &Block, line: u32) -> Step<ArrayStep> {
    Step::new(ArrayStep::Compare { a: a.id, b: b.id })
        .lines([line])
        .explain(format!("Compare {} with {}", a.value, b.value))
}

fn swap(a: &Block, b: &Block, line: u32) -> Step<ArrayStep> {
    Step::new(ArrayStep::Swap { a: a.id, b: b.id })
        .lines([line])
        .explain(format!("Swap {} and {}", a.value, b.value))
}

fn mark_sorted(ids: Vec<Id>) -> Step<ArrayStep> {
    Step::new(ArrayStep::MarkSorted { ids })
}

fn done(text: impl Into<String>) -> Step<ArrayStep> {
    Step::new(ArrayStep::Done).explain(text)
}

/// Bubble sort: adjacent compare-and-swap passes, stopping early once a
/// pass makes no swap.
pub fn bubble_sort(blocks: &[Block]) -> StepLog<ArrayStep> {
    record("bubble-sort", |out| {
        let mut arr = blocks.to_vec();
        let n = arr.len();
        out.emit(init(&arr, "Start bubble sort"));

        for pass in 0..n {
            let mut swapped = false;
            for j in 0..n - pass - 1 {
                out.emit(compare(&arr[j], &arr[j + 1], 3).pointer("j", arr[j].id));
                if arr[j].value > arr[j + 1].value {
                    out.emit(swap(&arr[j], &arr[j + 1], 4));
                    arr.swap(j, j + 1);
                    swapped = true;
                }
            }
            let settled = n - pass - 1;
            if swapped {
                out.emit(mark_sorted(vec![arr[settled].id]).lines([5]).explain(format!(
                    "{} has bubbled into its final slot",
                    arr[settled].value
                )));
            } else {
                out.emit(
                    mark_sorted(arr[..=settled].iter().map(|b| b.id).collect())
                        .lines([6])
                        .explain("No swaps in this pass, the rest is already sorted"),
                );
                break;
            }
        }
        out.emit(done("Array is sorted"));
    })
}

/// Selection sort: pick the minimum of the unsorted suffix and swap it to
/// the front of that suffix.
pub fn selection_sort(blocks: &[Block]) -> StepLog<ArrayStep> {
    record("selection-sort", |out| {
        let mut arr = blocks.to_vec();
        let n = arr.len();
        out.emit(init(&arr, "Start selection sort"));

        for i in 0..n {
            let mut min = i;
            out.emit(
                Step::new(ArrayStep::Highlight {
                    ids: vec![arr[i].id],
                    mode: HighlightMode::Candidate,
                })
                .lines([2])
                .explain(format!("Assume {} is the minimum", arr[i].value))
                .pointer("min", arr[i].id),
            );
            for j in i + 1..n {
                out.emit(compare(&arr[j], &arr[min], 4).pointer("j", arr[j].id));
                if arr[j].value < arr[min].value {
                    min = j;
                    out.emit(
                        Step::new(ArrayStep::Highlight {
                            ids: vec![arr[min].id],
                            mode: HighlightMode::Candidate,
                        })
                        .lines([5])
                        .explain(format!("New minimum {}", arr[min].value))
                        .pointer("min", arr[min].id),
                    );
                }
            }
            if min != i {
                out.emit(swap(&arr[i], &arr[min], 6));
                arr.swap(i, min);
            }
            out.emit(mark_sorted(vec![arr[i].id]).lines([7]));
        }
        out.emit(done("Array is sorted"));
    })
}

/// Insertion sort: walk each block left past larger neighbours, then move
/// it into the gap.
pub fn insertion_sort(blocks: &[Block]) -> StepLog<ArrayStep> {
    record("insertion-sort", |out| {
        let mut arr = blocks.to_vec();
        let n = arr.len();
        out.emit(init(&arr, "Start insertion sort"));

        for i in 1..n {
            let key = arr[i].clone();
            out.emit(
                Step::new(ArrayStep::Highlight {
                    ids: vec![key.id],
                    mode: HighlightMode::Active,
                })
                .lines([2])
                .explain(format!("Insert {} into the sorted prefix", key.value))
                .pointer("key", key.id),
            );
            let mut slot = i;
            while slot > 0 {
                out.emit(compare(&arr[slot - 1], &key, 3));
                if arr[slot - 1].value > key.value {
                    slot -= 1;
                } else {
                    break;
                }
            }
            if slot != i {
                out.emit(
                    Step::new(ArrayStep::Move { id: key.id, to: slot })
                        .lines([4])
                        .explain(format!("Move {} to slot {}", key.value, slot)),
                );
                let moved = arr.remove(i);
                arr.insert(slot, moved);
            }
        }
        out.emit(mark_sorted(arr.iter().map(|b| b.id).collect()));
        out.emit(done("Array is sorted"));
    })
}

/// Merge sort, merging in place: the smaller head of the right run is moved
/// in front of the left run's head, which keeps the sort stable.
pub fn merge_sort(blocks: &[Block]) -> StepLog<ArrayStep> {
    record("merge-sort", |out| {
        let mut arr = blocks.to_vec();
        out.emit(init(&arr, "Start merge sort"));
        let n = arr.len();
        sort_range(out, &mut arr, 0, n);
        out.emit(mark_sorted(arr.iter().map(|b| b.id).collect()));
        out.emit(done("Array is sorted"));
    })
}

fn sort_range(out: &mut impl Emit<ArrayStep>, arr: &mut Vec<Block>, lo: usize, hi: usize) {
    if hi - lo < 2 {
        return;
    }
    let mid = lo + (hi - lo) / 2;
    out.emit(
        Step::new(ArrayStep::Highlight {
            ids: arr[lo..hi].iter().map(|b| b.id).collect(),
            mode: HighlightMode::Candidate,
        })
        .lines([2])
        .explain(format!("Split slots {}..{} at {}", lo, hi, mid)),
    );
    sort_range(out, arr, lo, mid);
    sort_range(out, arr, mid, hi);
    merge_runs(out, arr, lo, mid, hi);
}

fn merge_runs(out: &mut impl Emit<ArrayStep>, arr: &mut Vec<Block>, lo: usize, mid: usize, hi: usize) {
    let (mut left, mut right, mut mid) = (lo, mid, mid);
    while left < mid && right < hi {
        out.emit(compare(&arr[left], &arr[right], 5));
        if arr[right].value < arr[left].value {
            out.emit(
                Step::new(ArrayStep::Move {
                    id: arr[right].id,
                    to: left,
                })
                .lines([6])
                .explain(format!(
                    "{} is smaller, place it before {}",
                    arr[right].value, arr[left].value
                )),
            );
            let moved = arr.remove(right);
            arr.insert(left, moved);
            mid += 1;
            right += 1;
        }
        left += 1;
    }
}

/// Quick sort with the Lomuto partition scheme (last element as pivot).
pub fn quick_sort(blocks: &[Block]) -> StepLog<ArrayStep> {
    record("quick-sort", |out| {
        let mut arr = blocks.to_vec();
        out.emit(init(&arr, "Start quick sort"));
        if !arr.is_empty() {
            let hi = arr.len() - 1;
            quick_range(out, &mut arr, 0, hi);
        }
        out.emit(done("Array is sorted"));
    })
}

fn quick_range(out: &mut impl Emit<ArrayStep>, arr: &mut [Block], lo: usize, hi: usize) {
    if lo == hi {
        out.emit(mark_sorted(vec![arr[lo].id]).explain(format!(
            "{} is alone in its range, so it is in place",
            arr[lo].value
        )));
        return;
    }
    let pivot = partition(out, arr, lo, hi);
    if pivot > lo {
        quick_range(out, arr, lo, pivot - 1);
    }
    if pivot < hi {
        quick_range(out, arr, pivot + 1, hi);
    }
}

fn partition(out: &mut impl Emit<ArrayStep>, arr: &mut [Block], lo: usize, hi: usize) -> usize {
    let pivot = arr[hi].clone();
    out.emit(
        Step::new(ArrayStep::Highlight {
            ids: vec![pivot.id],
            mode: HighlightMode::Active,
        })
        .lines([2])
        .explain(format!("Pivot is {}", pivot.value))
        .pointer("pivot", pivot.id),
    );
    let mut store = lo;
    for j in lo..hi {
        out.emit(compare(&arr[j], &pivot, 4).pointer("j", arr[j].id));
        if arr[j].value < pivot.value {
            if store != j {
                out.emit(swap(&arr[store], &arr[j], 5));
                arr.swap(store, j);
            }
            store += 1;
        }
    }
    if store != hi {
        out.emit(swap(&arr[store], &arr[hi], 6));
        arr.swap(store, hi);
    }
    out.emit(mark_sorted(vec![pivot.id]).lines([7]).explain(format!(
        "Pivot {} is in its final slot {}",
        pivot.value, store
    )));
    store
}

/// Linear search for `target`.
pub fn linear_search(blocks: &[Block], target: i64) -> StepLog<ArrayStep> {
    record("linear-search", |out| {
        out.emit(init(blocks, format!("Search for {} left to right", target)));
        for (i, block) in blocks.iter().enumerate() {
            out.emit(
                Step::new(ArrayStep::Highlight {
                    ids: vec![block.id],
                    mode: HighlightMode::Active,
                })
                .lines([2])
                .explain(format!("Slot {} holds {}", i, block.value))
                .pointer("i", block.id),
            );
            if block.value == target {
                out.emit(
                    Step::new(ArrayStep::Found { id: block.id })
                        .lines([3])
                        .explain(format!("Found {} at slot {}", target, i)),
                );
                out.emit(done("Search finished"));
                return;
            }
        }
        out.emit(
            Step::new(ArrayStep::NotFound)
                .lines([4])
                .explain(format!("{} is not in the array", target)),
        );
        out.emit(done("Search finished"));
    })
}

/// Binary search for `target`. The input is sorted by value before `init`,
/// since the search is only meaningful on a sorted array.
pub fn binary_search(blocks: &[Block], target: i64) -> StepLog<ArrayStep> {
    record("binary-search", |out| {
        let mut arr = blocks.to_vec();
        arr.sort_by_key(|b| b.value);
        out.emit(init(&arr, format!("Binary search for {} in the sorted array", target)));

        let (mut lo, mut hi) = (0usize, arr.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            out.emit(
                Step::new(ArrayStep::Highlight {
                    ids: vec![arr[mid].id],
                    mode: HighlightMode::Active,
                })
                .lines([3])
                .explain(format!("Middle value is {}", arr[mid].value))
                .pointer("lo", arr[lo].id)
                .pointer("mid", arr[mid].id)
                .pointer("hi", arr[hi - 1].id),
            );
            if arr[mid].value == target {
                out.emit(
                    Step::new(ArrayStep::Found { id: arr[mid].id })
                        .lines([4])
                        .explain(format!("Found {} at slot {}", target, mid)),
                );
                out.emit(done("Search finished"));
                return;
            }
            let discarded: Vec<Id> = if arr[mid].value < target {
                let ids = arr[lo..=mid].iter().map(|b| b.id).collect();
                lo = mid + 1;
                ids
            } else {
                let ids = arr[mid..hi].iter().map(|b| b.id).collect();
                hi = mid;
                ids
            };
            out.emit(
                Step::new(ArrayStep::Highlight {
                    ids: discarded,
                    mode: HighlightMode::Rejected,
                })
                .lines([5])
                .explain(if lo > mid {
                    format!("{} < {}, discard the left half", arr[mid].value, target)
                } else {
                    format!("{} > {}, discard the right half", arr[mid].value, target)
                }),
            );
        }
        out.emit(
            Step::new(ArrayStep::NotFound)
                .lines([6])
                .explain(format!("{} is not in the array", target)),
        );
        out.emit(done("Search finished"));
    })
}

/// Find the smallest value.
pub fn find_min(blocks: &[Block]) -> StepLog<ArrayStep> {
    extreme("find-min", blocks, |candidate, best| candidate < best)
}

/// Find the largest value.
pub fn find_max(blocks: &[Block]) -> StepLog<ArrayStep> {
    extreme("find-max", blocks, |candidate, best| candidate > best)
}

fn extreme(name: &'static str, blocks: &[Block], better: fn(i64, i64) -> bool) -> StepLog<ArrayStep> {
    let what = if name == "find-min" { "minimum" } else { "maximum" };
    record(name, |out| {
        out.emit(init(blocks, format!("Scan for the {}", what)));
        let Some(first) = blocks.first() else {
            debug!(algorithm = name, "empty input");
            out.emit(
                Step::new(ArrayStep::NotFound).explain(format!("The array is empty, it has no {}", what)),
            );
            out.emit(done("Nothing to scan"));
            return;
        };

        let mut best = first;
        out.emit(
            Step::new(ArrayStep::Highlight {
                ids: vec![best.id],
                mode: HighlightMode::Candidate,
            })
            .lines([1])
            .explain(format!("Start with {}", best.value))
            .pointer("best", best.id),
        );
        for block in &blocks[1..] {
            out.emit(compare(block, best, 2));
            if better(block.value, best.value) {
                best = block;
                out.emit(
                    Step::new(ArrayStep::Highlight {
                        ids: vec![best.id],
                        mode: HighlightMode::Candidate,
                    })
                    .lines([3])
                    .explain(format!("New {} {}", what, best.value))
                    .pointer("best", best.id),
                );
            }
        }
        out.emit(
            Step::new(ArrayStep::Found { id: best.id })
                .lines([4])
                .explain(format!("The {} is {}", what, best.value)),
        );
        out.emit(done("Scan finished"));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoscope_trace::{reconstruct_final, validate_references, validate_terminal};

    type Sorter = fn(&[Block]) -> StepLog<ArrayStep>;

    const SORTERS: [(&str, Sorter); 5] = [
        ("bubble", bubble_sort),
        ("selection", selection_sort),
        ("insertion", insertion_sort),
        ("merge", merge_sort),
        ("quick", quick_sort),
    ];

    fn final_state(steps: &[Step<ArrayStep>]) -> ArrayState {
        reconstruct_final(steps)
    }

    #[test]
    fn bubble_sort_three_blocks() {
        let blocks = vec![Block::new(1, 3), Block::new(2, 1), Block::new(3, 2)];
        let steps = bubble_sort(&blocks);
        let state = final_state(&steps);
        assert_eq!(state.values(), vec![1, 2, 3]);
        assert_eq!(state.order, vec![Id(2), Id(3), Id(1)]);
        assert!(state.highlight.is_none());
        assert!(state.finished);
    }

    #[test]
    fn every_sorter_sorts() {
        let inputs: [&[i64]; 6] = [
            &[],
            &[4],
            &[5, 4, 3, 2, 1],
            &[1, 2, 3, 4, 5],
            &[3, 1, 3, 2, 1, 3],
            &[9, -2, 7, 0, 7, -5, 12, 1],
        ];
        for (name, sorter) in SORTERS {
            for values in inputs {
                let steps = sorter(&Block::from_values(values));
                let state = final_state(&steps);
                let mut expected = values.to_vec();
                expected.sort();
                assert_eq!(state.values(), expected, "{} sort of {:?}", name, values);
                assert_eq!(state.sorted.len(), values.len(), "{} marks all sorted", name);
                assert!(validate_terminal(&steps).is_ok());
                assert!(validate_references::<ArrayState>(&steps).is_ok(), "{}", name);
            }
        }
    }

    #[test]
    fn merge_sort_is_stable() {
        let blocks = vec![Block::new(1, 2), Block::new(2, 1), Block::new(3, 2), Block::new(4, 1)];
        let state = final_state(&merge_sort(&blocks));
        assert_eq!(state.order, vec![Id(2), Id(4), Id(1), Id(3)]);
    }

    #[test]
    fn sorted_input_bubble_stops_after_one_pass() {
        let steps = bubble_sort(&Block::from_values(&[1, 2, 3, 4]));
        let swaps = steps
            .iter()
            .filter(|s| matches!(s.kind, ArrayStep::Swap { .. }))
            .count();
        let compares = steps
            .iter()
            .filter(|s| matches!(s.kind, ArrayStep::Compare { .. }))
            .count();
        assert_eq!(swaps, 0);
        assert_eq!(compares, 3);
    }

    #[test]
    fn linear_search_finds_first_match() {
        let blocks = Block::from_values(&[4, 8, 15, 8]);
        let state = final_state(&linear_search(&blocks, 8));
        assert_eq!(state.outcome, Some(SearchOutcome::Found(Id(2))));

        let state = final_state(&linear_search(&blocks, 16));
        assert_eq!(state.outcome, Some(SearchOutcome::NotFound));
    }

    #[test]
    fn binary_search_on_unsorted_input() {
        let blocks = Block::from_values(&[23, 4, 42, 15, 8, 16]);
        let steps = binary_search(&blocks, 15);
        let state = final_state(&steps);
        assert_eq!(state.outcome, Some(SearchOutcome::Found(Id(4))));
        assert!(validate_references::<ArrayState>(&steps).is_ok());

        let state = final_state(&binary_search(&blocks, 5));
        assert_eq!(state.outcome, Some(SearchOutcome::NotFound));
    }

    #[test]
    fn min_and_max() {
        let blocks = Block::from_values(&[7, -3, 12, 0]);
        assert_eq!(
            final_state(&find_min(&blocks)).outcome,
            Some(SearchOutcome::Found(Id(2)))
        );
        assert_eq!(
            final_state(&find_max(&blocks)).outcome,
            Some(SearchOutcome::Found(Id(3)))
        );
    }

    #[test]
    fn min_of_empty_array_ends_not_found() {
        let steps = find_min(&[]);
        assert!(validate_terminal(&steps).is_ok());
        let state = final_state(&steps);
        assert_eq!(state.outcome, Some(SearchOutcome::NotFound));
        assert!(steps.iter().any(|s| s.explanation().contains("empty")));
    }

    #[test]
    fn compare_highlight_is_transient() {
        let steps = bubble_sort(&Block::from_values(&[2, 1]));
        let compare_at = steps
            .iter()
            .position(|s| matches!(s.kind, ArrayStep::Compare { .. }))
            .unwrap();
        let during = reconstruct_array(&steps, compare_at);
        assert_eq!(during.highlight.map(|h| h.mode), Some(HighlightMode::Compare));
        let after = reconstruct_array(&steps, compare_at + 2);
        assert_ne!(after.highlight.map(|h| h.mode), Some(HighlightMode::Compare));
    }

    #[test]
    fn step_json_shape() {
        let steps = bubble_sort(&Block::from_values(&[2, 1]));
        let json = serde_json::to_string(&steps[2]).unwrap();
        assert!(json.starts_with(r#"{"type":"swap""#), "{}", json);
        let parsed: Step<ArrayStep> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, steps[2]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unknown id #99")]
    fn swap_with_unknown_block_is_rejected() {
        let steps = vec![
            Step::new(ArrayStep::Init {
                blocks: Block::from_values(&[5, 6]),
            }),
            Step::new(ArrayStep::Swap { a: Id(1), b: Id(99) }),
        ];
        reconstruct_array(&steps, 1);
    }
}
