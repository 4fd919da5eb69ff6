//! Interval family: merging, insertion, gaps, greedy scheduling and a
//! sweep-line room count.
//!
//! Merged and gap intervals get ids from [`Id::derive`] over their source
//! ids, so replaying a log always produces the same ids.

use std::collections::BTreeSet;

use algoscope_trace::{
    debug_assert_known, reconstruct, record, Emit, Fold, Highlight, HighlightMode, Id, Referencing,
    Registry, Step, StepLog, Terminal,
};
use serde::{Deserialize, Serialize};

/// Whether an interval came from the input or marks free space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntervalKind {
    #[default]
    Normal,
    Gap,
}

impl IntervalKind {
    fn is_normal(&self) -> bool {
        matches!(self, IntervalKind::Normal)
    }
}

/// A closed range `[start, end]` with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub id: Id,
    pub start: i64,
    pub end: i64,
    #[serde(default, skip_serializing_if = "IntervalKind::is_normal")]
    pub kind: IntervalKind,
}

impl Interval {
    /// Create an interval; the bounds are ordered if given backwards.
    pub fn new(id: u64, start: i64, end: i64) -> Self {
        Self {
            id: Id(id),
            start: start.min(end),
            end: start.max(end),
            kind: IntervalKind::Normal,
        }
    }

    /// Intervals with ids `1..=n` from `(start, end)` pairs.
    pub fn from_pairs(pairs: &[(i64, i64)]) -> Vec<Self> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, &(start, end))| Self::new(i as u64 + 1, start, end))
            .collect()
    }

    /// Whether the two closed ranges share at least one point.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    fn merged_with(&self, other: &Interval) -> Interval {
        Interval {
            id: Id::derive("merge", &[self.id, other.id]),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            kind: IntervalKind::Normal,
        }
    }

    fn gap_to(&self, next: &Interval) -> Interval {
        Interval {
            id: Id::derive("gap", &[self.id, next.id]),
            start: self.end,
            end: next.start,
            kind: IntervalKind::Gap,
        }
    }

    fn span(&self) -> String {
        format!("[{}, {}]", self.start, self.end)
    }
}

/// Steps of the interval family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum IntervalStep {
    Init { intervals: Vec<Interval> },
    /// Display order changes to `order`.
    Sort { order: Vec<Id> },
    Compare { a: Id, b: Id },
    /// `sources` are replaced by `into`, at the first source's position.
    Merge { sources: Vec<Id>, into: Interval },
    /// A new interval is inserted at position `at`.
    Insert { interval: Interval, at: usize },
    Select { id: Id },
    Reject { id: Id },
    /// Free space between two busy intervals.
    Gap { interval: Interval },
    /// The sweep line reaches `at` with `active` intervals open.
    Sweep { at: i64, active: usize },
    Highlight { ids: Vec<Id>, mode: HighlightMode },
    Done,
}

impl Terminal for IntervalStep {
    fn is_terminal(&self) -> bool {
        matches!(self, IntervalStep::Done)
    }
}

impl Referencing for IntervalStep {
    fn referenced_ids(&self) -> Vec<Id> {
        match self {
            IntervalStep::Sort { order: ids }
            | IntervalStep::Merge { sources: ids, .. }
            | IntervalStep::Highlight { ids, .. } => ids.clone(),
            IntervalStep::Compare { a, b } => vec![*a, *b],
            IntervalStep::Select { id } | IntervalStep::Reject { id } => vec![*id],
            IntervalStep::Init { .. }
            | IntervalStep::Insert { .. }
            | IntervalStep::Gap { .. }
            | IntervalStep::Sweep { .. }
            | IntervalStep::Done => Vec::new(),
        }
    }
}

/// Visual state of the interval family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalState {
    /// Intervals in display order.
    pub intervals: Vec<Interval>,
    pub gaps: Vec<Interval>,
    pub selected: BTreeSet<Id>,
    pub rejected: BTreeSet<Id>,
    /// The interval being grown or the last one accepted; `None` before the
    /// first.
    pub current: Option<Id>,
    pub sweep: Option<i64>,
    pub active: usize,
    /// Largest `active` seen so far.
    pub peak: usize,
    pub highlight: Option<Highlight>,
    pub finished: bool,
}

impl IntervalState {
    fn index_of(&self, id: Id) -> Option<usize> {
        self.intervals.iter().position(|i| i.id == id)
    }

    /// `(start, end)` pairs in display order.
    pub fn spans(&self) -> Vec<(i64, i64)> {
        self.intervals.iter().map(|i| (i.start, i.end)).collect()
    }
}

impl Registry for IntervalState {
    fn knows(&self, id: Id) -> bool {
        self.index_of(id).is_some() || self.gaps.iter().any(|g| g.id == id)
    }
}

impl Fold for IntervalState {
    type Kind = IntervalStep;

    fn apply(&mut self, step: &Step<IntervalStep>) {
        debug_assert_known(self, &step.kind);
        self.highlight = None;
        match &step.kind {
            IntervalStep::Init { intervals } => {
                *self = Self::default();
                self.intervals = intervals.clone();
            }
            IntervalStep::Sort { order } => {
                let mut rest = std::mem::take(&mut self.intervals);
                for id in order {
                    if let Some(pos) = rest.iter().position(|i| i.id == *id) {
                        self.intervals.push(rest.remove(pos));
                    }
                }
                self.intervals.extend(rest);
            }
            IntervalStep::Compare { a, b } => {
                self.highlight = Some(Highlight::new([*a, *b], HighlightMode::Compare));
            }
            IntervalStep::Merge { sources, into } => {
                let at = sources
                    .iter()
                    .filter_map(|id| self.index_of(*id))
                    .min()
                    .unwrap_or(self.intervals.len());
                self.intervals.retain(|i| !sources.contains(&i.id));
                self.intervals.insert(at.min(self.intervals.len()), *into);
                self.current = Some(into.id);
                self.highlight = Some(Highlight::new([into.id], HighlightMode::Active));
            }
            IntervalStep::Insert { interval, at } => {
                self.intervals
                    .insert((*at).min(self.intervals.len()), *interval);
                self.highlight = Some(Highlight::new([interval.id], HighlightMode::Active));
            }
            IntervalStep::Select { id } => {
                self.selected.insert(*id);
                self.current = Some(*id);
                self.highlight = Some(Highlight::new([*id], HighlightMode::Found));
            }
            IntervalStep::Reject { id } => {
                self.rejected.insert(*id);
                self.highlight = Some(Highlight::new([*id], HighlightMode::Rejected));
            }
            IntervalStep::Gap { interval } => {
                self.gaps.push(*interval);
            }
            IntervalStep::Sweep { at, active } => {
                self.sweep = Some(*at);
                self.active = *active;
                self.peak = self.peak.max(*active);
            }
            IntervalStep::Highlight { ids, mode } => {
                if let [id] = ids.as_slice() {
                    if *mode == HighlightMode::Active {
                        self.current = Some(*id);
                    }
                }
                self.highlight = Some(Highlight::new(ids.iter().copied(), *mode));
            }
            IntervalStep::Done => {
                self.finished = true;
            }
        }
    }
}

/// Rebuild the interval state after `steps[index]`.
pub fn reconstruct_intervals(steps: &[Step<IntervalStep>], index: usize) -> IntervalState {
    reconstruct(steps, index)
}

fn init(intervals: &[Interval], text: impl Into<String>) -> Step<IntervalStep> {
    Step::new(IntervalStep::Init {
        intervals: intervals.to_vec(),
    })
    .lines([1])
    .explain(text)
}

fn sort_by_start(out: &mut impl Emit<IntervalStep>, intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by_key(|i| (i.start, i.end, i.id));
    out.emit(
        Step::new(IntervalStep::Sort {
            order: sorted.iter().map(|i| i.id).collect(),
        })
        .lines([2])
        .explain("Sort by start"),
    );
    sorted
}

/// One left-to-right pass over start-sorted intervals, folding each overlap
/// into the running interval. Returns the merged list.
fn merge_pass(out: &mut impl Emit<IntervalStep>, sorted: &[Interval]) -> Vec<Interval> {
    let mut merged: Vec<Interval> = Vec::new();
    let mut current: Option<Interval> = None;
    for next in sorted {
        let Some(cur) = current else {
            out.emit(
                Step::new(IntervalStep::Highlight {
                    ids: vec![next.id],
                    mode: HighlightMode::Active,
                })
                .lines([3])
                .explain(format!("Start with {}", next.span())),
            );
            current = Some(*next);
            continue;
        };
        out.emit(
            Step::new(IntervalStep::Compare { a: cur.id, b: next.id })
                .lines([4])
                .explain(format!("Does {} overlap {}?", cur.span(), next.span())),
        );
        if next.start <= cur.end {
            let grown = cur.merged_with(next);
            out.emit(
                Step::new(IntervalStep::Merge {
                    sources: vec![cur.id, next.id],
                    into: grown,
                })
                .lines([5])
                .explain(format!("Overlap: merge into {}", grown.span())),
            );
            current = Some(grown);
        } else {
            out.emit(
                Step::new(IntervalStep::Highlight {
                    ids: vec![next.id],
                    mode: HighlightMode::Active,
                })
                .lines([6])
                .explain(format!("No overlap: {} starts a new run", next.span())),
            );
            merged.push(cur);
            current = Some(*next);
        }
    }
    merged.extend(current);
    merged
}

/// Merge every overlapping pair into a single interval.
pub fn merge_intervals(intervals: &[Interval]) -> StepLog<IntervalStep> {
    record("merge-intervals", |out| {
        out.emit(init(intervals, "Merge overlapping intervals"));
        let sorted = sort_by_start(out, intervals);
        let merged = merge_pass(out, &sorted);
        out.emit(Step::new(IntervalStep::Done).explain(format!("{} intervals after merging", merged.len())));
    })
}

/// Insert `new` into `intervals`, then merge whatever it now overlaps.
pub fn insert_interval(intervals: &[Interval], new: Interval) -> StepLog<IntervalStep> {
    record("insert-interval", |out| {
        out.emit(init(intervals, format!("Insert {}", new.span())));
        let mut sorted = sort_by_start(out, intervals);
        let at = sorted
            .iter()
            .position(|i| (i.start, i.end) > (new.start, new.end))
            .unwrap_or(sorted.len());
        out.emit(
            Step::new(IntervalStep::Insert { interval: new, at })
                .lines([3])
                .explain(format!("{} goes at position {}", new.span(), at)),
        );
        sorted.insert(at, new);
        let merged = merge_pass(out, &sorted);
        out.emit(Step::new(IntervalStep::Done).explain(format!("{} intervals after inserting", merged.len())));
    })
}

/// Merge busy intervals, then report the free gaps between them.
pub fn find_gaps(intervals: &[Interval]) -> StepLog<IntervalStep> {
    record("find-gaps", |out| {
        out.emit(init(intervals, "Find the free time between intervals"));
        let sorted = sort_by_start(out, intervals);
        let merged = merge_pass(out, &sorted);
        let mut gaps = 0;
        for pair in merged.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            if left.end < right.start {
                let gap = left.gap_to(right);
                out.emit(
                    Step::new(IntervalStep::Gap { interval: gap })
                        .lines([7])
                        .explain(format!("Free between {} and {}", left.end, right.start)),
                );
                gaps += 1;
            }
        }
        out.emit(Step::new(IntervalStep::Done).explain(if gaps == 0 {
            "No free time".to_string()
        } else {
            format!("Found {} gaps", gaps)
        }));
    })
}

/// Greedy activity selection: take intervals by earliest end, skipping any
/// that start before the last taken one ends.
pub fn select_activities(intervals: &[Interval]) -> StepLog<IntervalStep> {
    record("select-activities", |out| {
        out.emit(init(intervals, "Pick the most non-overlapping intervals"));
        let mut by_end = intervals.to_vec();
        by_end.sort_by_key(|i| (i.end, i.start, i.id));
        out.emit(
            Step::new(IntervalStep::Sort {
                order: by_end.iter().map(|i| i.id).collect(),
            })
            .lines([2])
            .explain("Sort by end"),
        );

        let mut last: Option<Interval> = None;
        let mut taken = 0;
        for candidate in &by_end {
            match last {
                Some(prev) if candidate.start < prev.end => {
                    out.emit(Step::new(IntervalStep::Compare {
                        a: prev.id,
                        b: candidate.id,
                    }));
                    out.emit(
                        Step::new(IntervalStep::Reject { id: candidate.id })
                            .lines([5])
                            .explain(format!(
                                "{} starts before {} ends",
                                candidate.span(),
                                prev.span()
                            )),
                    );
                }
                Some(prev) => {
                    out.emit(Step::new(IntervalStep::Compare {
                        a: prev.id,
                        b: candidate.id,
                    }));
                    out.emit(
                        Step::new(IntervalStep::Select { id: candidate.id })
                            .lines([4])
                            .explain(format!("{} starts after {} ends", candidate.span(), prev.span())),
                    );
                    last = Some(*candidate);
                    taken += 1;
                }
                None => {
                    out.emit(
                        Step::new(IntervalStep::Select { id: candidate.id })
                            .lines([3])
                            .explain(format!("Nothing taken yet, take {}", candidate.span())),
                    );
                    last = Some(*candidate);
                    taken += 1;
                }
            }
        }
        out.emit(Step::new(IntervalStep::Done).explain(format!("Selected {} intervals", taken)));
    })
}

/// Minimum number of rooms: sweep start/end events in time order, ends
/// before starts at the same instant, and track the most open at once.
pub fn min_rooms(intervals: &[Interval]) -> StepLog<IntervalStep> {
    record("min-rooms", |out| {
        out.emit(init(intervals, "Count overlapping intervals with a sweep line"));
        // Rank at equal times: ends first, then starts, then the ends of
        // zero-length intervals (which must follow their own start).
        let mut events: Vec<(i64, u8, Id, bool)> = intervals
            .iter()
            .flat_map(|i| {
                let end_rank = if i.start == i.end { 2 } else { 0 };
                [(i.start, 1, i.id, true), (i.end, end_rank, i.id, false)]
            })
            .collect();
        events.sort();

        let (mut active, mut peak) = (0usize, 0usize);
        for (at, _, id, is_start) in events {
            if is_start {
                active += 1;
            } else {
                active -= 1;
            }
            peak = peak.max(active);
            out.emit(
                Step::new(IntervalStep::Sweep { at, active })
                    .lines([if is_start { 3 } else { 4 }])
                    .explain(format!(
                        "At {} an interval {}, {} open",
                        at,
                        if is_start { "opens" } else { "closes" },
                        active
                    ))
                    .pointer("event", id),
            );
        }
        out.emit(Step::new(IntervalStep::Done).explain(format!("{} rooms needed", peak)));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoscope_trace::{reconstruct_final, validate_references, validate_terminal};

    fn final_state(steps: &[Step<IntervalStep>]) -> IntervalState {
        reconstruct_final(steps)
    }

    fn check(steps: &[Step<IntervalStep>]) {
        assert!(validate_terminal(steps).is_ok());
        assert!(validate_references::<IntervalState>(steps).is_ok());
    }

    #[test]
    fn merge_overlapping() {
        let input = Interval::from_pairs(&[(8, 10), (1, 3), (2, 6), (15, 18)]);
        let steps = merge_intervals(&input);
        check(&steps);
        assert_eq!(final_state(&steps).spans(), vec![(1, 6), (8, 10), (15, 18)]);
    }

    #[test]
    fn merge_touching_and_nested() {
        let input = Interval::from_pairs(&[(1, 4), (4, 5), (2, 3)]);
        assert_eq!(final_state(&merge_intervals(&input)).spans(), vec![(1, 5)]);
    }

    #[test]
    fn merge_is_idempotent() {
        let input = Interval::from_pairs(&[(5, 7), (1, 3), (2, 4), (6, 9), (12, 12)]);
        let first = final_state(&merge_intervals(&input));
        let again_steps = merge_intervals(&first.intervals);
        assert!(!again_steps
            .iter()
            .any(|s| matches!(s.kind, IntervalStep::Merge { .. })));
        assert_eq!(final_state(&again_steps).intervals, first.intervals);
    }

    #[test]
    fn merged_ids_are_derived_and_stable() {
        let input = Interval::from_pairs(&[(1, 3), (2, 4)]);
        let a = final_state(&merge_intervals(&input));
        let b = final_state(&merge_intervals(&input));
        assert_eq!(a.intervals[0].id, b.intervals[0].id);
        assert!(a.intervals[0].id.is_derived());
    }

    #[test]
    fn insert_merges_neighbours() {
        let input = Interval::from_pairs(&[(1, 2), (3, 5), (6, 7), (8, 10), (12, 16)]);
        let steps = insert_interval(&input, Interval::new(100, 4, 8));
        check(&steps);
        assert_eq!(final_state(&steps).spans(), vec![(1, 2), (3, 10), (12, 16)]);
    }

    #[test]
    fn gaps_between_busy_runs() {
        let input = Interval::from_pairs(&[(1, 3), (6, 7), (2, 4), (9, 12)]);
        let steps = find_gaps(&input);
        check(&steps);
        let state = final_state(&steps);
        let gaps: Vec<_> = state.gaps.iter().map(|g| (g.start, g.end)).collect();
        assert_eq!(gaps, vec![(4, 6), (7, 9)]);
        assert!(state.gaps.iter().all(|g| g.kind == IntervalKind::Gap));
    }

    #[test]
    fn activity_selection() {
        let input = Interval::from_pairs(&[(1, 4), (3, 5), (0, 6), (5, 7), (3, 9), (5, 9), (6, 10), (8, 11)]);
        let steps = select_activities(&input);
        check(&steps);
        let state = final_state(&steps);
        let expected: BTreeSet<Id> = [Id(1), Id(4), Id(8)].into_iter().collect();
        assert_eq!(state.selected, expected);
        assert_eq!(state.selected.len() + state.rejected.len(), input.len());
    }

    #[test]
    fn no_current_before_first_selection() {
        let steps = select_activities(&Interval::from_pairs(&[(1, 2)]));
        assert_eq!(reconstruct_intervals(&steps, 1).current, None);
        assert_eq!(final_state(&steps).current, Some(Id(1)));
    }

    #[test]
    fn rooms_from_sweep() {
        let input = Interval::from_pairs(&[(0, 30), (5, 10), (15, 20)]);
        let steps = min_rooms(&input);
        check(&steps);
        assert_eq!(final_state(&steps).peak, 2);

        let back_to_back = Interval::from_pairs(&[(1, 5), (5, 8)]);
        assert_eq!(final_state(&min_rooms(&back_to_back)).peak, 1);

        let instant = Interval::from_pairs(&[(3, 3), (3, 6)]);
        let state = final_state(&min_rooms(&instant));
        assert_eq!(state.peak, 2);
        assert_eq!(state.active, 0);
    }

    #[test]
    fn empty_input_still_terminates() {
        for steps in [merge_intervals(&[]), find_gaps(&[]), select_activities(&[]), min_rooms(&[])] {
            check(&steps);
            assert!(final_state(&steps).finished);
        }
    }
}
