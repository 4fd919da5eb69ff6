//! Graph traversal family: breadth-first, depth-first and Kahn's
//! topological sort.
//!
//! The graph only stores nodes and edges. Adjacency is derived on demand
//! and sorted by node id, so traversal order is a function of the input
//! alone.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use algoscope_trace::{
    debug_assert_known, reconstruct, record, Emit, Fold, Highlight, HighlightMode, Id, Referencing,
    Registry, Step, StepLog, Terminal,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: Id,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub from: Id,
    pub to: Id,
}

/// Input to the graph generators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
    pub directed: bool,
}

impl Graph {
    /// Nodes `1..=n` labelled by number, with the given edges.
    pub fn with_edges(n: u64, edges: &[(u64, u64)], directed: bool) -> Self {
        Self {
            nodes: (1..=n)
                .map(|i| GraphNode {
                    id: Id(i),
                    label: i.to_string(),
                })
                .collect(),
            edges: edges
                .iter()
                .map(|&(from, to)| Edge {
                    from: Id(from),
                    to: Id(to),
                })
                .collect(),
            directed,
        }
    }

    pub fn undirected(n: u64, edges: &[(u64, u64)]) -> Self {
        Self::with_edges(n, edges, false)
    }

    pub fn directed(n: u64, edges: &[(u64, u64)]) -> Self {
        Self::with_edges(n, edges, true)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Sorted, de-duplicated adjacency for every node.
    ///
    /// Edges naming unknown nodes are ignored.
    pub fn adjacency(&self) -> BTreeMap<Id, Vec<Id>> {
        let mut adjacency: BTreeMap<Id, BTreeSet<Id>> =
            self.nodes.iter().map(|n| (n.id, BTreeSet::new())).collect();
        for edge in &self.edges {
            if !self.contains(edge.from) || !self.contains(edge.to) {
                continue;
            }
            adjacency.entry(edge.from).or_default().insert(edge.to);
            if !self.directed {
                adjacency.entry(edge.to).or_default().insert(edge.from);
            }
        }
        adjacency
            .into_iter()
            .map(|(id, set)| (id, set.into_iter().collect()))
            .collect()
    }

    /// Sorted neighbours of one node.
    pub fn neighbors(&self, id: Id) -> Vec<Id> {
        self.adjacency().remove(&id).unwrap_or_default()
    }
}

/// Steps of the graph family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GraphStep {
    Init { graph: Graph },
    Enqueue { id: Id },
    Dequeue { id: Id },
    Push { id: Id },
    Pop { id: Id },
    ExploreEdge { from: Id, to: Id },
    VisitNode { id: Id, depth: usize },
    Indegree { id: Id, value: usize },
    Output { id: Id },
    CycleDetected { remaining: Vec<Id> },
    Highlight { ids: Vec<Id>, mode: HighlightMode },
    Done,
}

impl Terminal for GraphStep {
    fn is_terminal(&self) -> bool {
        matches!(self, GraphStep::Done)
    }
}

impl Referencing for GraphStep {
    fn referenced_ids(&self) -> Vec<Id> {
        match self {
            GraphStep::Enqueue { id }
            | GraphStep::Dequeue { id }
            | GraphStep::Push { id }
            | GraphStep::Pop { id }
            | GraphStep::VisitNode { id, .. }
            | GraphStep::Indegree { id, .. }
            | GraphStep::Output { id } => vec![*id],
            GraphStep::ExploreEdge { from, to } => vec![*from, *to],
            GraphStep::CycleDetected { remaining: ids } | GraphStep::Highlight { ids, .. } => {
                ids.clone()
            }
            GraphStep::Init { .. } | GraphStep::Done => Vec::new(),
        }
    }
}

/// Visual state of the graph family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphState {
    pub graph: Graph,
    /// Front of the queue first.
    pub queue: VecDeque<Id>,
    /// Top of the stack last.
    pub stack: Vec<Id>,
    /// Depth at which each node was visited.
    pub depth: BTreeMap<Id, usize>,
    pub visit_order: Vec<Id>,
    pub indegree: BTreeMap<Id, usize>,
    pub output: Vec<Id>,
    /// The edge under examination, cleared by the next step.
    pub exploring: Option<Edge>,
    pub cycle: Option<Vec<Id>>,
    pub highlight: Option<Highlight>,
    pub finished: bool,
}

impl GraphState {
    pub fn is_visited(&self, id: Id) -> bool {
        self.depth.contains_key(&id)
    }
}

impl Registry for GraphState {
    fn knows(&self, id: Id) -> bool {
        self.graph.contains(id)
    }
}

impl Fold for GraphState {
    type Kind = GraphStep;

    fn apply(&mut self, step: &Step<GraphStep>) {
        debug_assert_known(self, &step.kind);
        self.highlight = None;
        self.exploring = None;
        match &step.kind {
            GraphStep::Init { graph } => {
                *self = Self::default();
                self.graph = graph.clone();
            }
            GraphStep::Enqueue { id } => self.queue.push_back(*id),
            GraphStep::Dequeue { .. } => {
                self.queue.pop_front();
            }
            GraphStep::Push { id } => self.stack.push(*id),
            GraphStep::Pop { .. } => {
                self.stack.pop();
            }
            GraphStep::ExploreEdge { from, to } => {
                self.exploring = Some(Edge {
                    from: *from,
                    to: *to,
                });
            }
            GraphStep::VisitNode { id, depth } => {
                self.depth.insert(*id, *depth);
                self.visit_order.push(*id);
            }
            GraphStep::Indegree { id, value } => {
                self.indegree.insert(*id, *value);
            }
            GraphStep::Output { id } => self.output.push(*id),
            GraphStep::CycleDetected { remaining } => {
                self.cycle = Some(remaining.clone());
                self.highlight = Some(Highlight::new(
                    remaining.iter().copied(),
                    HighlightMode::Rejected,
                ));
            }
            GraphStep::Highlight { ids, mode } => {
                self.highlight = Some(Highlight::new(ids.iter().copied(), *mode));
            }
            GraphStep::Done => self.finished = true,
        }
    }
}

/// Rebuild the graph state after `steps[index]`.
pub fn reconstruct_graph(steps: &[Step<GraphStep>], index: usize) -> GraphState {
    reconstruct(steps, index)
}

fn init(graph: &Graph, text: impl Into<String>) -> Step<GraphStep> {
    Step::new(GraphStep::Init {
        graph: graph.clone(),
    })
    .lines([1])
    .explain(text)
}

fn missing_start(out: &mut impl Emit<GraphStep>, start: Id) {
    debug!(%start, "start node not in graph");
    out.emit(Step::new(GraphStep::Done).explain(format!("Node {} is not in the graph", start)));
}

/// Breadth-first search from `start`. Nodes are visited when discovered.
pub fn bfs(graph: &Graph, start: Id) -> StepLog<GraphStep> {
    record("bfs", |out| {
        out.emit(init(graph, format!("Breadth-first search from {}", start)));
        if !graph.contains(start) {
            missing_start(out, start);
            return;
        }
        let adjacency = graph.adjacency();
        let mut depth: BTreeMap<Id, usize> = BTreeMap::new();
        let mut queue = VecDeque::new();

        depth.insert(start, 0);
        out.emit(Step::new(GraphStep::VisitNode { id: start, depth: 0 }).lines([2]));
        queue.push_back(start);
        out.emit(
            Step::new(GraphStep::Enqueue { id: start })
                .lines([3])
                .explain(format!("Queue the start node {}", start)),
        );

        while let Some(u) = queue.pop_front() {
            let d = depth[&u];
            out.emit(
                Step::new(GraphStep::Dequeue { id: u })
                    .lines([4])
                    .explain(format!("Take {} from the front of the queue", u))
                    .pointer("current", u),
            );
            for &v in adjacency.get(&u).map(Vec::as_slice).unwrap_or_default() {
                let seen = depth.contains_key(&v);
                out.emit(
                    Step::new(GraphStep::ExploreEdge { from: u, to: v })
                        .lines([5])
                        .explain(if seen {
                            format!("{} was already visited", v)
                        } else {
                            format!("Discover {} from {}", v, u)
                        }),
                );
                if seen {
                    continue;
                }
                depth.insert(v, d + 1);
                out.emit(Step::new(GraphStep::VisitNode { id: v, depth: d + 1 }).lines([6]));
                queue.push_back(v);
                out.emit(Step::new(GraphStep::Enqueue { id: v }).lines([7]));
            }
        }
        out.emit(
            Step::new(GraphStep::Done)
                .explain(format!("Reached {} of {} nodes", depth.len(), graph.nodes.len())),
        );
    })
}

/// Depth-first search from `start` with an explicit stack.
///
/// A node may sit on the stack more than once; it is visited the first time
/// it is popped and skipped afterwards.
pub fn dfs(graph: &Graph, start: Id) -> StepLog<GraphStep> {
    record("dfs", |out| {
        out.emit(init(graph, format!("Depth-first search from {}", start)));
        if !graph.contains(start) {
            missing_start(out, start);
            return;
        }
        let adjacency = graph.adjacency();
        let mut visited: BTreeSet<Id> = BTreeSet::new();
        let mut stack: Vec<(Id, usize)> = vec![(start, 0)];
        out.emit(
            Step::new(GraphStep::Push { id: start })
                .lines([2])
                .explain(format!("Push the start node {}", start)),
        );

        while let Some((u, d)) = stack.pop() {
            let seen = !visited.insert(u);
            out.emit(
                Step::new(GraphStep::Pop { id: u })
                    .lines([3])
                    .explain(if seen {
                        format!("{} was already visited, skip it", u)
                    } else {
                        format!("Pop {} from the top of the stack", u)
                    }),
            );
            if seen {
                continue;
            }
            out.emit(Step::new(GraphStep::VisitNode { id: u, depth: d }).lines([4]));
            // Reverse so the smallest neighbour ends on top.
            for &v in adjacency
                .get(&u)
                .map(Vec::as_slice)
                .unwrap_or_default()
                .iter()
                .rev()
            {
                out.emit(Step::new(GraphStep::ExploreEdge { from: u, to: v }).lines([5]));
                if visited.contains(&v) {
                    continue;
                }
                stack.push((v, d + 1));
                out.emit(Step::new(GraphStep::Push { id: v }).lines([6]));
            }
        }
        out.emit(
            Step::new(GraphStep::Done)
                .explain(format!("Reached {} of {} nodes", visited.len(), graph.nodes.len())),
        );
    })
}

/// Kahn's algorithm. A cycle leaves nodes with positive indegree, which are
/// reported in a `cycle-detected` step.
pub fn topological_sort(graph: &Graph) -> StepLog<GraphStep> {
    record("topological-sort", |out| {
        out.emit(init(graph, "Order the nodes so every edge points forward"));
        if !graph.directed {
            out.emit(Step::new(GraphStep::Done).explain("Topological order needs a directed graph"));
            return;
        }
        let adjacency = graph.adjacency();
        let mut indegree: BTreeMap<Id, usize> = graph.nodes.iter().map(|n| (n.id, 0)).collect();
        for targets in adjacency.values() {
            for v in targets {
                if let Some(count) = indegree.get_mut(v) {
                    *count += 1;
                }
            }
        }
        for (&id, &value) in &indegree {
            out.emit(
                Step::new(GraphStep::Indegree { id, value })
                    .lines([2])
                    .explain(format!("{} has {} incoming edges", id, value)),
            );
        }

        let mut level: BTreeMap<Id, usize> = BTreeMap::new();
        let mut queue = VecDeque::new();
        for (&id, _) in indegree.iter().filter(|&(_, &v)| v == 0) {
            level.insert(id, 0);
            queue.push_back(id);
            out.emit(Step::new(GraphStep::Enqueue { id }).lines([3]));
        }

        let mut emitted = 0;
        while let Some(u) = queue.pop_front() {
            out.emit(Step::new(GraphStep::Dequeue { id: u }).lines([4]));
            let d = level.get(&u).copied().unwrap_or_default();
            out.emit(Step::new(GraphStep::VisitNode { id: u, depth: d }));
            out.emit(
                Step::new(GraphStep::Output { id: u })
                    .lines([5])
                    .explain(format!("{} has no remaining prerequisites", u)),
            );
            emitted += 1;
            for &v in adjacency.get(&u).map(Vec::as_slice).unwrap_or_default() {
                out.emit(Step::new(GraphStep::ExploreEdge { from: u, to: v }).lines([6]));
                let entry = level.entry(v).or_insert(0);
                *entry = (*entry).max(d + 1);
                let Some(count) = indegree.get_mut(&v) else {
                    continue;
                };
                *count -= 1;
                out.emit(Step::new(GraphStep::Indegree { id: v, value: *count }).lines([7]));
                if *count == 0 {
                    queue.push_back(v);
                    out.emit(Step::new(GraphStep::Enqueue { id: v }).lines([8]));
                }
            }
        }

        if emitted < graph.nodes.len() {
            let remaining: Vec<Id> = indegree
                .iter()
                .filter(|&(_, &count)| count > 0)
                .map(|(&id, _)| id)
                .collect();
            debug!(remaining = remaining.len(), "cycle blocks topological order");
            out.emit(
                Step::new(GraphStep::CycleDetected { remaining })
                    .lines([9])
                    .explain("Some nodes wait on each other: the graph has a cycle"),
            );
        }
        out.emit(Step::new(GraphStep::Done));
    })
}
