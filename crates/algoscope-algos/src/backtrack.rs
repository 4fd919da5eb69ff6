//! Backtracking family: subsets, permutations, combination sum and phone
//! keypad letter combinations.
//!
//! Each search is a recursive producer. A child branch writes its steps
//! straight into the parent's sink and hands its solution count back up,
//! so the log is one ordered stream while the recursion keeps ordinary
//! return values. Every `pick` is matched by an `unpick` once the branch
//! returns; a pruned candidate gets a failing `check` and nothing else.

use std::collections::BTreeMap;

use algoscope_trace::{
    debug_assert_known, reconstruct, record, Block, Emit, Fold, Highlight, HighlightMode, Id,
    Marker, Referencing, Registry, Retraction, Step, StepLog, Terminal, TreeNode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tree::{CallTree, TreeBuilder};

/// Letters printed on each phone key, indexed by digit.
pub const KEYPAD: [&str; 10] = [
    "", "", "abc", "def", "ghi", "jkl", "mno", "pqrs", "tuv", "wxyz",
];

/// Steps of the backtracking family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BacktrackStep {
    Init { items: Vec<Block> },
    AddNode { node: TreeNode },
    /// Whether `item` may extend the branch at `parent`.
    Check { parent: Id, item: Id, ok: bool },
    Pick { node: Id, item: Id },
    Unpick { node: Id, item: Id },
    /// The branch ending at `node` is a solution; `path` lists its items.
    Accept { node: Id, path: Vec<Id> },
    Done { count: usize },
}

impl Terminal for BacktrackStep {
    fn is_terminal(&self) -> bool {
        matches!(self, BacktrackStep::Done { .. })
    }
}

impl Retraction for BacktrackStep {
    fn marker(&self) -> Option<Marker> {
        match self {
            BacktrackStep::Pick { node, .. } => Some(Marker::Enter(*node)),
            BacktrackStep::Unpick { node, .. } => Some(Marker::Retract(*node)),
            _ => None,
        }
    }
}

impl Referencing for BacktrackStep {
    fn referenced_ids(&self) -> Vec<Id> {
        match self {
            BacktrackStep::AddNode { node } => node.parent.into_iter().collect(),
            BacktrackStep::Check { parent, item, .. } => vec![*parent, *item],
            BacktrackStep::Pick { node, item } | BacktrackStep::Unpick { node, item } => {
                vec![*node, *item]
            }
            BacktrackStep::Accept { node, path } => {
                std::iter::once(*node).chain(path.iter().copied()).collect()
            }
            BacktrackStep::Init { .. } | BacktrackStep::Done { .. } => Vec::new(),
        }
    }
}

/// One picked branch on the current path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    pub node: Id,
    pub item: Id,
}

/// Visual state of the backtracking family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktrackState {
    pub items: BTreeMap<Id, Block>,
    pub tree: CallTree,
    /// Picked branches from the root down.
    pub path: Vec<PathEntry>,
    pub active: Option<Id>,
    /// Accepted item paths, in discovery order.
    pub solutions: Vec<Vec<Id>>,
    pub highlight: Option<Highlight>,
    pub count: Option<usize>,
    pub finished: bool,
}

impl BacktrackState {
    /// Item ids on the current path.
    pub fn path_items(&self) -> Vec<Id> {
        self.path.iter().map(|e| e.item).collect()
    }

    /// Each solution spelled out by item label (or value when unlabelled).
    pub fn solution_labels(&self) -> Vec<String> {
        self.solutions
            .iter()
            .map(|path| {
                path.iter()
                    .filter_map(|id| self.items.get(id))
                    .map(item_label)
                    .collect::<Vec<_>>()
                    .join(if path.iter().all(|id| self.has_label(*id)) { "" } else { "," })
            })
            .collect()
    }

    /// Each solution as item values.
    pub fn solution_values(&self) -> Vec<Vec<i64>> {
        self.solutions
            .iter()
            .map(|path| {
                path.iter()
                    .filter_map(|id| self.items.get(id))
                    .map(|b| b.value)
                    .collect()
            })
            .collect()
    }

    fn has_label(&self, id: Id) -> bool {
        self.items.get(&id).is_some_and(|b| b.label.is_some())
    }
}

impl Registry for BacktrackState {
    fn knows(&self, id: Id) -> bool {
        self.tree.contains(id) || self.items.contains_key(&id)
    }
}

impl Fold for BacktrackState {
    type Kind = BacktrackStep;

    fn apply(&mut self, step: &Step<BacktrackStep>) {
        debug_assert_known(self, &step.kind);
        self.highlight = None;
        match &step.kind {
            BacktrackStep::Init { items } => {
                *self = Self::default();
                self.items = items.iter().map(|b| (b.id, b.clone())).collect();
            }
            BacktrackStep::AddNode { node } => {
                if node.is_root() {
                    self.active = Some(node.id);
                }
                self.tree.insert(node.clone());
            }
            BacktrackStep::Check { parent, item, ok } => {
                self.active = Some(*parent);
                let mode = if *ok {
                    HighlightMode::Candidate
                } else {
                    HighlightMode::Rejected
                };
                self.highlight = Some(Highlight::new([*item], mode));
            }
            BacktrackStep::Pick { node, item } => {
                self.path.push(PathEntry {
                    node: *node,
                    item: *item,
                });
                self.active = Some(*node);
            }
            BacktrackStep::Unpick { node, .. } => {
                self.path.pop();
                self.active = self.tree.get(*node).and_then(|n| n.parent);
            }
            BacktrackStep::Accept { node, path } => {
                self.active = Some(*node);
                self.solutions.push(path.clone());
                self.highlight = Some(Highlight::new(path.iter().copied(), HighlightMode::Found));
            }
            BacktrackStep::Done { count } => {
                self.count = Some(*count);
                self.finished = true;
            }
        }
    }
}

/// Rebuild the backtracking state after `steps[index]`.
pub fn reconstruct_backtrack(steps: &[Step<BacktrackStep>], index: usize) -> BacktrackState {
    reconstruct(steps, index)
}

fn item_label(block: &Block) -> String {
    block
        .label
        .clone()
        .unwrap_or_else(|| block.value.to_string())
}

/// Shared plumbing for one search: the node builder plus the current item
/// path.
struct Search {
    tree: TreeBuilder,
    path: Vec<Id>,
}

impl Search {
    fn start(out: &mut impl Emit<BacktrackStep>, items: &[Block], root_label: &str) -> (Self, Id) {
        let first = items.iter().map(|b| b.id.value()).max().unwrap_or(0) + 1;
        let mut tree = TreeBuilder::starting_at(first);
        let root = tree.root(root_label);
        let id = root.id;
        out.emit(Step::new(BacktrackStep::AddNode { node: root }).lines([1]));
        (
            Self {
                tree,
                path: Vec::new(),
            },
            id,
        )
    }

    fn check(&self, out: &mut impl Emit<BacktrackStep>, parent: Id, item: &Block, ok: bool, why: String) {
        out.emit(
            Step::new(BacktrackStep::Check {
                parent,
                item: item.id,
                ok,
            })
            .lines([2])
            .explain(why),
        );
    }

    fn pick(&mut self, out: &mut impl Emit<BacktrackStep>, parent: Id, item: &Block) -> Id {
        let node = self.tree.child(parent, item_label(item));
        let id = node.id;
        out.emit(Step::new(BacktrackStep::AddNode { node }));
        self.path.push(item.id);
        out.emit(
            Step::new(BacktrackStep::Pick { node: id, item: item.id })
                .lines([3])
                .explain(format!("Pick {}", item_label(item))),
        );
        id
    }

    fn unpick(&mut self, out: &mut impl Emit<BacktrackStep>, node: Id, item: &Block) {
        self.path.pop();
        out.emit(
            Step::new(BacktrackStep::Unpick { node, item: item.id })
                .lines([5])
                .explain(format!("Undo {}", item_label(item))),
        );
    }

    fn accept(&self, out: &mut impl Emit<BacktrackStep>, node: Id, text: String) -> usize {
        out.emit(
            Step::new(BacktrackStep::Accept {
                node,
                path: self.path.clone(),
            })
            .lines([4])
            .explain(text),
        );
        1
    }
}

fn finish(out: &mut impl Emit<BacktrackStep>, name: &str, count: usize) {
    debug!(algorithm = name, solutions = count, "search finished");
    out.emit(
        Step::new(BacktrackStep::Done { count })
            .explain(format!("Found {} solution{}", count, if count == 1 { "" } else { "s" })),
    );
}

/// Every subset, each accepted at the node where it is complete.
pub fn subsets(items: &[Block]) -> StepLog<BacktrackStep> {
    fn grow(
        out: &mut impl Emit<BacktrackStep>,
        search: &mut Search,
        items: &[Block],
        node: Id,
        start: usize,
    ) -> usize {
        let size = search.path.len();
        let mut count = search.accept(out, node, format!("Record a subset of size {}", size));
        for (offset, item) in items[start..].iter().enumerate() {
            search.check(out, node, item, true, format!("Try adding {}", item_label(item)));
            let child = search.pick(out, node, item);
            count += grow(out, search, items, child, start + offset + 1);
            search.unpick(out, child, item);
        }
        count
    }

    record("subsets", |out| {
        out.emit(
            Step::new(BacktrackStep::Init {
                items: items.to_vec(),
            })
            .explain("List every subset"),
        );
        let (mut search, root) = Search::start(out, items, "{}");
        let count = grow(out, &mut search, items, root, 0);
        finish(out, "subsets", count);
    })
}

/// Every ordering of the items. Items already on the path are rejected.
pub fn permutations(items: &[Block]) -> StepLog<BacktrackStep> {
    fn grow(
        out: &mut impl Emit<BacktrackStep>,
        search: &mut Search,
        items: &[Block],
        used: &mut [bool],
        node: Id,
    ) -> usize {
        if search.path.len() == items.len() {
            return search.accept(out, node, "Every item is placed".to_string());
        }
        let mut count = 0;
        for (i, item) in items.iter().enumerate() {
            if used[i] {
                search.check(out, node, item, false, format!("{} is already used", item_label(item)));
                continue;
            }
            search.check(out, node, item, true, format!("Place {} next", item_label(item)));
            let child = search.pick(out, node, item);
            used[i] = true;
            count += grow(out, search, items, used, child);
            used[i] = false;
            search.unpick(out, child, item);
        }
        count
    }

    record("permutations", |out| {
        out.emit(
            Step::new(BacktrackStep::Init {
                items: items.to_vec(),
            })
            .explain("List every ordering"),
        );
        let (mut search, root) = Search::start(out, items, "[]");
        let mut used = vec![false; items.len()];
        let count = grow(out, &mut search, items, &mut used, root);
        finish(out, "permutations", count);
    })
}

/// Multisets of item values (each item reusable) adding up to `target`.
///
/// Candidates are tried in ascending value order, so the first value that
/// overshoots ends the loop. Non-positive values are never picked.
pub fn combination_sum(items: &[Block], target: i64) -> StepLog<BacktrackStep> {
    fn grow(
        out: &mut impl Emit<BacktrackStep>,
        search: &mut Search,
        sorted: &[Block],
        node: Id,
        start: usize,
        remaining: i64,
    ) -> usize {
        if remaining == 0 {
            return search.accept(out, node, "The picks add up to the target".to_string());
        }
        let mut count = 0;
        for (offset, item) in sorted[start..].iter().enumerate() {
            if item.value <= 0 {
                search.check(out, node, item, false, format!("{} cannot make progress", item.value));
                continue;
            }
            if item.value > remaining {
                search.check(
                    out,
                    node,
                    item,
                    false,
                    format!("{} exceeds the remaining {}", item.value, remaining),
                );
                break;
            }
            search.check(
                out,
                node,
                item,
                true,
                format!("{} fits in the remaining {}", item.value, remaining),
            );
            let child = search.pick(out, node, item);
            count += grow(out, search, sorted, child, start + offset, remaining - item.value);
            search.unpick(out, child, item);
        }
        count
    }

    record("combination-sum", |out| {
        out.emit(
            Step::new(BacktrackStep::Init {
                items: items.to_vec(),
            })
            .explain(format!("Find combinations adding to {}", target)),
        );
        let mut sorted = items.to_vec();
        sorted.sort_by_key(|b| (b.value, b.id));
        let (mut search, root) = Search::start(out, items, &target.to_string());
        let count = if target < 0 {
            0
        } else {
            grow(out, &mut search, &sorted, root, 0, target)
        };
        finish(out, "combination-sum", count);
    })
}

/// Blocks for the letters behind each keypad digit, one group per digit.
/// Characters without letters are skipped.
pub fn keypad_groups(digits: &str) -> Vec<Vec<Block>> {
    let mut next = 1;
    digits
        .chars()
        .filter_map(|c| c.to_digit(10))
        .filter(|&d| !KEYPAD[d as usize].is_empty())
        .map(|d| {
            KEYPAD[d as usize]
                .chars()
                .map(|letter| {
                    let block = Block::labeled(next, d as i64, letter.to_string());
                    next += 1;
                    block
                })
                .collect()
        })
        .collect()
}

/// Every word the keypad `digits` can spell.
pub fn letter_combinations(digits: &str) -> StepLog<BacktrackStep> {
    fn grow(
        out: &mut impl Emit<BacktrackStep>,
        search: &mut Search,
        groups: &[Vec<Block>],
        node: Id,
    ) -> usize {
        let depth = search.path.len();
        let Some(group) = groups.get(depth) else {
            return search.accept(out, node, "One letter per digit".to_string());
        };
        let mut count = 0;
        for item in group {
            search.check(
                out,
                node,
                item,
                true,
                format!("Digit {} can be {}", item.value, item_label(item)),
            );
            let child = search.pick(out, node, item);
            count += grow(out, search, groups, child);
            search.unpick(out, child, item);
        }
        count
    }

    record("letter-combinations", |out| {
        let groups = keypad_groups(digits);
        let items: Vec<Block> = groups.iter().flatten().cloned().collect();
        out.emit(
            Step::new(BacktrackStep::Init {
                items: items.clone(),
            })
            .explain(format!("Spell every word for {:?}", digits)),
        );
        if groups.is_empty() {
            out.emit(
                Step::new(BacktrackStep::Done { count: 0 })
                    .explain("No digit carries letters"),
            );
            return;
        }
        let (mut search, root) = Search::start(out, &items, "\"\"");
        let count = grow(out, &mut search, &groups, root);
        finish(out, "letter-combinations", count);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoscope_trace::{reconstruct_final, validate_balance, validate_references, validate_terminal};
    use std::collections::BTreeSet;

    fn checked(steps: &[Step<BacktrackStep>]) -> BacktrackState {
        assert!(validate_terminal(steps).is_ok());
        assert!(validate_references::<BacktrackState>(steps).is_ok());
        assert_eq!(validate_balance(steps, false), Ok(Vec::new()));
        reconstruct_final(steps)
    }

    #[test]
    fn subsets_of_three() {
        let state = checked(&subsets(&Block::from_values(&[1, 2, 3])));
        assert_eq!(state.count, Some(8));
        let distinct: BTreeSet<Vec<i64>> = state.solution_values().into_iter().collect();
        assert_eq!(distinct.len(), 8);
        assert!(distinct.contains(&vec![]));
        assert!(distinct.contains(&vec![1, 3]));
        assert!(state.path.is_empty());
    }

    #[test]
    fn permutations_reject_used_items() {
        let steps = permutations(&Block::from_values(&[1, 2, 3]));
        let state = checked(&steps);
        assert_eq!(state.count, Some(6));
        assert_eq!(state.solution_values()[0], vec![1, 2, 3]);
        assert_eq!(state.solution_values()[5], vec![3, 2, 1]);

        // A failing check is never followed by a pick of the same item.
        for pair in steps.windows(2) {
            if let BacktrackStep::Check { item, ok: false, .. } = pair[0].kind {
                assert!(!matches!(pair[1].kind, BacktrackStep::Pick { item: picked, .. } if picked == item));
            }
        }
    }

    #[test]
    fn combination_sum_classic() {
        let state = checked(&combination_sum(&Block::from_values(&[2, 3, 6, 7]), 7));
        let mut found = state.solution_values();
        found.sort();
        assert_eq!(found, vec![vec![2, 2, 3], vec![7]]);
    }

    #[test]
    fn combination_sum_without_solution() {
        let state = checked(&combination_sum(&Block::from_values(&[4, 0, 5]), 3));
        assert_eq!(state.count, Some(0));
        assert!(state.solutions.is_empty());
    }

    #[test]
    fn letters_for_two_three() {
        let state = checked(&letter_combinations("23"));
        let words = state.solution_labels();
        assert_eq!(words.len(), 9);
        assert_eq!(words[0], "ad");
        assert_eq!(words[8], "cf");
    }

    #[test]
    fn letters_without_letter_digits() {
        let steps = letter_combinations("10");
        assert_eq!(steps.len(), 2);
        assert_eq!(reconstruct_final::<BacktrackState>(&steps).count, Some(0));
    }

    #[test]
    fn tree_nodes_persist_after_unpick() {
        let steps = subsets(&Block::from_values(&[1, 2]));
        let state: BacktrackState = reconstruct_final(&steps);
        // root plus one node per non-empty subset
        assert_eq!(state.tree.len(), 4);
        assert!(state.tree.nodes.keys().all(|id| id.value() > 2));
    }

    #[test]
    fn midway_path_matches_open_picks() {
        let steps = permutations(&Block::from_values(&[1, 2]));
        for i in 0..steps.len() {
            let state = reconstruct_backtrack(&steps, i);
            let open = validate_balance(&steps[..=i], true).unwrap();
            let nodes: Vec<Id> = state.path.iter().map(|e| e.node).collect();
            assert_eq!(nodes, open);
        }
    }
}
