//! Linked-list family.
//!
//! Cycles are legal inputs. Every walk is bounded by a visited-id set (or by
//! the two-speed meeting argument), never by waiting for `next` to become
//! null.

use std::collections::{BTreeMap, BTreeSet};

use algoscope_trace::{
    debug_assert_known, reconstruct, record, Emit, Fold, Highlight, HighlightMode, Id, Referencing,
    Registry, Step, StepLog, Terminal,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A list node: a value plus an optional link to another node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListNode {
    pub id: Id,
    pub value: i64,
    pub next: Option<Id>,
}

/// Input to the list generators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedList {
    pub nodes: Vec<ListNode>,
    pub head: Option<Id>,
}

impl LinkedList {
    /// A straight chain with ids `1..=n`.
    pub fn from_values(values: &[i64]) -> Self {
        let nodes: Vec<ListNode> = values
            .iter()
            .enumerate()
            .map(|(i, &value)| ListNode {
                id: Id(i as u64 + 1),
                value,
                next: (i + 1 < values.len()).then(|| Id(i as u64 + 2)),
            })
            .collect();
        let head = nodes.first().map(|n| n.id);
        Self { nodes, head }
    }

    /// A chain whose tail links back to the node at index `entry`.
    pub fn with_cycle(values: &[i64], entry: usize) -> Self {
        let mut list = Self::from_values(values);
        if entry < list.nodes.len() {
            let target = list.nodes[entry].id;
            if let Some(tail) = list.nodes.last_mut() {
                tail.next = Some(target);
            }
        }
        list
    }

    /// Look up a node.
    pub fn node(&self, id: Id) -> Option<&ListNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Successor of `id`.
    pub fn next_of(&self, id: Id) -> Option<Id> {
        self.node(id).and_then(|n| n.next)
    }

    fn value_of(&self, id: Id) -> i64 {
        self.node(id).map_or(0, |n| n.value)
    }

    /// Ids reachable from the head, stopping at the first revisit.
    pub fn walk(&self) -> Vec<Id> {
        walk_from(self.head, |id| self.next_of(id))
    }

    /// Whether following `next` from the head ever revisits a node.
    pub fn has_cycle(&self) -> bool {
        let chain = self.walk();
        chain
            .last()
            .and_then(|&last| self.next_of(last))
            .is_some()
    }
}

fn walk_from(head: Option<Id>, next_of: impl Fn(Id) -> Option<Id>) -> Vec<Id> {
    let mut seen = BTreeSet::new();
    let mut chain = Vec::new();
    let mut current = head;
    while let Some(id) = current {
        if !seen.insert(id) {
            break;
        }
        chain.push(id);
        current = next_of(id);
    }
    chain
}

/// Steps of the list family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ListStep {
    Init { nodes: Vec<ListNode>, head: Option<Id> },
    /// A node is visited.
    Visit { id: Id },
    /// A named pointer (curr, prev, slow, fast, ...) moves.
    Advance { pointer: String, to: Option<Id> },
    /// A node's `next` link is rewritten.
    Relink { id: Id, next: Option<Id> },
    SetHead { id: Option<Id> },
    /// A node is unlinked and dropped.
    Remove { id: Id },
    /// The two-speed walk met inside a cycle.
    CycleFound { meet: Id },
    Found { id: Id },
    NotFound,
    Highlight { ids: Vec<Id>, mode: HighlightMode },
    Done,
}

impl Terminal for ListStep {
    fn is_terminal(&self) -> bool {
        matches!(self, ListStep::Done)
    }
}

impl Referencing for ListStep {
    fn referenced_ids(&self) -> Vec<Id> {
        match self {
            ListStep::Visit { id }
            | ListStep::Remove { id }
            | ListStep::CycleFound { meet: id }
            | ListStep::Found { id } => vec![*id],
            ListStep::Advance { to, .. } | ListStep::SetHead { id: to } => to.iter().copied().collect(),
            ListStep::Relink { id, next } => std::iter::once(*id).chain(*next).collect(),
            ListStep::Highlight { ids, .. } => ids.clone(),
            ListStep::Init { .. } | ListStep::NotFound | ListStep::Done => Vec::new(),
        }
    }
}

/// How a list search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListOutcome {
    Found(Id),
    NotFound,
}

/// Visual state of the list family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListState {
    pub nodes: BTreeMap<Id, ListNode>,
    pub head: Option<Id>,
    /// Named pointers and what they point at.
    pub pointers: BTreeMap<String, Option<Id>>,
    pub visited: BTreeSet<Id>,
    pub highlight: Option<Highlight>,
    /// Where the two-speed walk met, if it did.
    pub cycle_meet: Option<Id>,
    pub outcome: Option<ListOutcome>,
    pub finished: bool,
}

impl ListState {
    /// Ids in link order from the head, stopping at the first revisit.
    pub fn chain(&self) -> Vec<Id> {
        walk_from(self.head, |id| self.nodes.get(&id).and_then(|n| n.next))
    }

    /// Values in link order from the head.
    pub fn values(&self) -> Vec<i64> {
        self.chain()
            .iter()
            .filter_map(|id| self.nodes.get(id).map(|n| n.value))
            .collect()
    }

    /// Where a named pointer currently points.
    pub fn pointer(&self, name: &str) -> Option<Id> {
        self.pointers.get(name).copied().flatten()
    }
}

impl Registry for ListState {
    fn knows(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }
}

impl Fold for ListState {
    type Kind = ListStep;

    fn apply(&mut self, step: &Step<ListStep>) {
        debug_assert_known(self, &step.kind);
        self.highlight = None;
        match &step.kind {
            ListStep::Init { nodes, head } => {
                *self = Self::default();
                self.nodes = nodes.iter().map(|n| (n.id, n.clone())).collect();
                self.head = *head;
            }
            ListStep::Visit { id } => {
                self.visited.insert(*id);
                self.highlight = Some(Highlight::new([*id], HighlightMode::Active));
            }
            ListStep::Advance { pointer, to } => {
                self.pointers.insert(pointer.clone(), *to);
            }
            ListStep::Relink { id, next } => {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.next = *next;
                }
                self.highlight = Some(Highlight::new([*id], HighlightMode::Active));
            }
            ListStep::SetHead { id } => {
                self.head = *id;
            }
            ListStep::Remove { id } => {
                self.nodes.remove(id);
                self.visited.remove(id);
                for target in self.pointers.values_mut() {
                    if *target == Some(*id) {
                        *target = None;
                    }
                }
            }
            ListStep::CycleFound { meet } => {
                self.cycle_meet = Some(*meet);
                self.highlight = Some(Highlight::new([*meet], HighlightMode::Found));
            }
            ListStep::Found { id } => {
                self.outcome = Some(ListOutcome::Found(*id));
                self.highlight = Some(Highlight::new([*id], HighlightMode::Found));
            }
            ListStep::NotFound => {
                self.outcome = Some(ListOutcome::NotFound);
            }
            ListStep::Highlight { ids, mode } => {
                self.highlight = Some(Highlight::new(ids.iter().copied(), *mode));
            }
            ListStep::Done => {
                self.finished = true;
            }
        }
    }
}

/// Rebuild the list state after `steps[index]`.
pub fn reconstruct_list(steps: &[Step<ListStep>], index: usize) -> ListState {
    reconstruct(steps, index)
}

fn init(list: &LinkedList, text: impl Into<String>) -> Step<ListStep> {
    Step::new(ListStep::Init {
        nodes: list.nodes.clone(),
        head: list.head,
    })
    .lines([1])
    .explain(text)
}

fn advance(pointer: &str, to: Option<Id>) -> Step<ListStep> {
    Step::new(ListStep::Advance {
        pointer: pointer.to_string(),
        to,
    })
}

fn done(text: impl Into<String>) -> Step<ListStep> {
    Step::new(ListStep::Done).explain(text)
}

/// Visit every reachable node once.
pub fn traverse(list: &LinkedList) -> StepLog<ListStep> {
    record("list-traverse", |out| {
        out.emit(init(list, "Walk the list from the head"));
        let mut seen = BTreeSet::new();
        let mut current = list.head;
        while let Some(id) = current {
            if !seen.insert(id) {
                out.emit(
                    Step::new(ListStep::Highlight {
                        ids: vec![id],
                        mode: HighlightMode::Rejected,
                    })
                    .lines([4])
                    .explain(format!(
                        "Node {} was already visited: the list loops back here",
                        list.value_of(id)
                    )),
                );
                break;
            }
            out.emit(advance("curr", Some(id)).lines([2]));
            out.emit(
                Step::new(ListStep::Visit { id })
                    .lines([3])
                    .explain(format!("Visit {}", list.value_of(id))),
            );
            current = list.next_of(id);
        }
        out.emit(done(format!("Visited {} nodes", seen.len())));
    })
}

/// Reverse the links in place with `prev` / `curr` pointers.
///
/// On a cyclic list only the acyclic run up to the first revisit is
/// reversed.
pub fn reverse(list: &LinkedList) -> StepLog<ListStep> {
    record("list-reverse", |out| {
        out.emit(init(list, "Reverse the list by turning each link around"));
        let mut next_of: BTreeMap<Id, Option<Id>> = list.nodes.iter().map(|n| (n.id, n.next)).collect();
        let mut seen = BTreeSet::new();
        let mut prev: Option<Id> = None;
        let mut current = list.head;
        out.emit(advance("prev", None).lines([2]));
        out.emit(advance("curr", current).lines([2]));

        while let Some(id) = current {
            if !seen.insert(id) {
                out.emit(
                    Step::new(ListStep::Highlight {
                        ids: vec![id],
                        mode: HighlightMode::Rejected,
                    })
                    .explain("Reached an already reversed node, the list had a cycle"),
                );
                break;
            }
            let next = next_of.get(&id).copied().flatten();
            out.emit(advance("next", next).lines([4]).explain(match next {
                Some(n) => format!("Remember the next node {}", list.value_of(n)),
                None => "This is the last node".to_string(),
            }));
            out.emit(
                Step::new(ListStep::Relink { id, next: prev })
                    .lines([5])
                    .explain(format!("Point {} back at the previous node", list.value_of(id))),
            );
            next_of.insert(id, prev);
            prev = Some(id);
            current = next;
            out.emit(advance("prev", prev).lines([6]));
            out.emit(advance("curr", current).lines([7]));
        }
        out.emit(
            Step::new(ListStep::SetHead { id: prev })
                .lines([8])
                .explain("The old tail is the new head"),
        );
        out.emit(done("List reversed"));
    })
}

/// Floyd's cycle detection: `slow` moves one hop and `fast` two hops per
/// round. If they meet, a second phase walks from the head and the meeting
/// point at equal speed to find where the cycle starts.
pub fn detect_cycle(list: &LinkedList) -> StepLog<ListStep> {
    record("detect-cycle", |out| {
        out.emit(init(list, "Race a slow and a fast pointer"));
        let Some(head) = list.head else {
            out.emit(Step::new(ListStep::NotFound).explain("The list is empty, so it has no cycle"));
            out.emit(done("No cycle"));
            return;
        };
        let (mut slow, mut fast) = (head, Some(head));
        out.emit(advance("slow", Some(slow)).lines([1]));
        out.emit(advance("fast", fast).lines([1]));

        loop {
            let Some(hop_from) = fast.filter(|&f| list.next_of(f).is_some()) else {
                out.emit(
                    Step::new(ListStep::NotFound)
                        .lines([6])
                        .explain("Fast pointer reached the end: no cycle"),
                );
                out.emit(done("No cycle"));
                return;
            };
            slow = list.next_of(slow).unwrap_or(slow);
            out.emit(advance("slow", Some(slow)).lines([3]).explain("Slow moves one hop"));
            let first_hop = list.next_of(hop_from);
            out.emit(advance("fast", first_hop).lines([4]).explain("Fast moves its first hop"));
            fast = first_hop.and_then(|f| list.next_of(f));
            out.emit(advance("fast", fast).lines([4]).explain("Fast moves its second hop"));

            if fast == Some(slow) {
                out.emit(
                    Step::new(ListStep::CycleFound { meet: slow })
                        .lines([5])
                        .explain(format!("Cycle detected: pointers met at {}", list.value_of(slow))),
                );
                break;
            }
            out.emit(
                Step::new(ListStep::Highlight {
                    ids: std::iter::once(slow).chain(fast).collect(),
                    mode: HighlightMode::Compare,
                })
                .explain("Pointers have not met yet"),
            );
        }

        let (mut from_head, mut from_meet) = (head, slow);
        out.emit(advance("slow", Some(from_head)).lines([7]).explain("Restart slow at the head"));
        while from_head != from_meet {
            from_head = list.next_of(from_head).unwrap_or(from_head);
            from_meet = list.next_of(from_meet).unwrap_or(from_meet);
            out.emit(advance("slow", Some(from_head)).lines([8]));
            out.emit(advance("fast", Some(from_meet)).lines([8]));
        }
        out.emit(
            Step::new(ListStep::Found { id: from_head })
                .lines([9])
                .explain(format!("The cycle starts at {}", list.value_of(from_head))),
        );
        out.emit(done("Cycle detected"));
    })
}

/// Find the middle node (the second of two middles on even lengths).
pub fn find_middle(list: &LinkedList) -> StepLog<ListStep> {
    record("find-middle", |out| {
        out.emit(init(list, "Find the middle with slow and fast pointers"));
        let Some(head) = list.head else {
            out.emit(Step::new(ListStep::NotFound).explain("The list is empty, it has no middle"));
            out.emit(done("No middle"));
            return;
        };
        let (mut slow, mut fast) = (head, Some(head));
        out.emit(advance("slow", Some(slow)).lines([1]));
        out.emit(advance("fast", fast).lines([1]));

        while let Some(hop_from) = fast.filter(|&f| list.next_of(f).is_some()) {
            slow = list.next_of(slow).unwrap_or(slow);
            out.emit(advance("slow", Some(slow)).lines([3]));
            fast = list.next_of(hop_from).and_then(|f| list.next_of(f));
            out.emit(advance("fast", fast).lines([4]));
            if fast == Some(slow) {
                debug!("find-middle input is cyclic");
                out.emit(
                    Step::new(ListStep::NotFound)
                        .explain("The pointers met: the list is cyclic and has no middle"),
                );
                out.emit(done("No middle"));
                return;
            }
        }
        out.emit(
            Step::new(ListStep::Found { id: slow })
                .lines([5])
                .explain(format!("Fast reached the end, so {} is the middle", list.value_of(slow))),
        );
        out.emit(done("Middle found"));
    })
}

/// Remove the `n`th node from the end (1-based) with a lead and a trail
/// pointer `n` hops apart.
pub fn remove_nth_from_end(list: &LinkedList, n: usize) -> StepLog<ListStep> {
    record("remove-nth-from-end", |out| {
        out.emit(init(list, format!("Remove node {} from the end", n)));
        if list.has_cycle() {
            out.emit(
                Step::new(ListStep::NotFound).explain("The list is cyclic, so it has no end to count from"),
            );
            out.emit(done("Nothing removed"));
            return;
        }
        let length = list.walk().len();
        if n == 0 || n > length {
            out.emit(Step::new(ListStep::NotFound).explain(format!(
                "The list has {} nodes, there is no node {} from the end",
                length, n
            )));
            out.emit(done("Nothing removed"));
            return;
        }

        let mut lead = list.head;
        out.emit(advance("lead", lead).lines([1]));
        for _ in 0..n {
            lead = lead.and_then(|id| list.next_of(id));
            out.emit(advance("lead", lead).lines([2]).explain("Lead moves ahead"));
        }

        let Some(mut trail) = list.head else {
            return;
        };
        if lead.is_none() {
            let new_head = list.next_of(trail);
            out.emit(
                Step::new(ListStep::SetHead { id: new_head })
                    .lines([3])
                    .explain(format!("Removing the head {}", list.value_of(trail))),
            );
            out.emit(Step::new(ListStep::Remove { id: trail }).lines([3]));
            out.emit(done("Node removed"));
            return;
        }

        out.emit(advance("trail", Some(trail)).lines([4]));
        while let Some(next_lead) = lead.and_then(|id| list.next_of(id)) {
            lead = Some(next_lead);
            trail = list.next_of(trail).unwrap_or(trail);
            out.emit(advance("lead", lead).lines([5]));
            out.emit(advance("trail", Some(trail)).lines([5]));
        }
        let Some(target) = list.next_of(trail) else {
            return;
        };
        out.emit(
            Step::new(ListStep::Highlight {
                ids: vec![target],
                mode: HighlightMode::Rejected,
            })
            .lines([6])
            .explain(format!("{} is the node to remove", list.value_of(target))),
        );
        out.emit(
            Step::new(ListStep::Relink {
                id: trail,
                next: list.next_of(target),
            })
            .lines([7])
            .explain("Skip over it"),
        );
        out.emit(Step::new(ListStep::Remove { id: target }).lines([7]));
        out.emit(done("Node removed"));
    })
}
