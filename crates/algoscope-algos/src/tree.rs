//! Append-only call tree shared by the recursion and backtracking
//! families.

use std::collections::BTreeMap;

use algoscope_trace::{Id, IdAllocator, TreeNode};
use serde::{Deserialize, Serialize};

/// Registry of every node a search has opened.
///
/// Nodes are never removed: a retracted branch stays so the explored tree
/// can still be drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTree {
    pub nodes: BTreeMap<Id, TreeNode>,
}

impl CallTree {
    pub fn insert(&mut self, node: TreeNode) {
        self.nodes.insert(node.id, node);
    }

    pub fn get(&self, id: Id) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct children of `id`, in id order.
    pub fn children(&self, id: Id) -> Vec<Id> {
        self.nodes
            .values()
            .filter(|n| n.parent == Some(id))
            .map(|n| n.id)
            .collect()
    }

    /// Ids from the root down to `id`, inclusive. Empty if `id` is unknown.
    pub fn path_to(&self, id: Id) -> Vec<Id> {
        let mut path = Vec::new();
        let mut cursor = self.nodes.get(&id);
        while let Some(node) = cursor {
            path.push(node.id);
            cursor = node.parent.and_then(|p| self.nodes.get(&p));
        }
        path.reverse();
        path
    }
}

/// Generator-side builder: allocates ids and tracks depth.
///
/// Each generator invocation owns one, so concurrent invocations never
/// share a counter.
#[derive(Debug)]
pub struct TreeBuilder {
    ids: IdAllocator,
    tree: CallTree,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Builder whose first node is `#1`.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Builder whose first node is `first`. Generators whose entities are
    /// numbered `1..=n` start above `n` so node and entity ids never clash.
    pub fn starting_at(first: u64) -> Self {
        Self {
            ids: IdAllocator::starting_at(first),
            tree: CallTree::default(),
        }
    }

    pub fn root(&mut self, label: impl Into<String>) -> TreeNode {
        let node = TreeNode::root(self.ids.next_id(), label);
        self.tree.insert(node.clone());
        node
    }

    /// Open a child of `parent`. An unknown parent yields a new root.
    pub fn child(&mut self, parent: Id, label: impl Into<String>) -> TreeNode {
        let id = self.ids.next_id();
        let node = match self.tree.get(parent) {
            Some(parent) => TreeNode::child_of(parent, id, label),
            None => TreeNode::root(id, label),
        };
        self.tree.insert(node.clone());
        node
    }

    pub fn tree(&self) -> &CallTree {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_allocates_and_links() {
        let mut builder = TreeBuilder::new();
        let root = builder.root("root");
        let a = builder.child(root.id, "a");
        let b = builder.child(a.id, "b");
        let c = builder.child(root.id, "c");

        assert_eq!(root.id, Id(1));
        assert_eq!(b.depth, 2);
        let tree = builder.tree();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.children(root.id), vec![a.id, c.id]);
        assert_eq!(tree.path_to(b.id), vec![root.id, a.id, b.id]);
        assert!(tree.path_to(Id(99)).is_empty());
    }

    #[test]
    fn separate_builders_do_not_share_ids() {
        let mut first = TreeBuilder::new();
        let mut second = TreeBuilder::new();
        assert_eq!(first.root("x").id, second.root("y").id);
    }

    #[test]
    fn offset_builder_skips_entity_ids() {
        let mut builder = TreeBuilder::starting_at(10);
        assert_eq!(builder.root("r").id, Id(10));
    }
}
