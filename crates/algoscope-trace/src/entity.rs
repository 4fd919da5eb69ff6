//! Passive value objects shared by every algorithm family.

use serde::{Deserialize, Serialize};

use crate::Id;

/// An array element.
///
/// Identity is permanent. Value and label change only through explicit
/// overwrite steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub id: Id,
    pub value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Block {
    /// Create an unlabeled block.
    pub fn new(id: u64, value: i64) -> Self {
        Self {
            id: Id(id),
            value,
            label: None,
        }
    }

    /// Create a labeled block.
    pub fn labeled(id: u64, value: i64, label: impl Into<String>) -> Self {
        Self {
            id: Id(id),
            value,
            label: Some(label.into()),
        }
    }

    /// Blocks for `values`, with ids `1..=n` in input order.
    pub fn from_values(values: &[i64]) -> Vec<Self> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| Self::new(i as u64 + 1, value))
            .collect()
    }
}

/// A node of a recursion or backtracking call tree.
///
/// Nodes are append-only: a retracted branch keeps its node so the renderer
/// can still draw the explored tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: Id,
    pub label: String,
    /// `None` marks the root.
    pub parent: Option<Id>,
    pub depth: usize,
}

impl TreeNode {
    /// Create a root node.
    pub fn root(id: Id, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            parent: None,
            depth: 0,
        }
    }

    /// Create a child of `parent`, one level deeper.
    pub fn child_of(parent: &TreeNode, id: Id, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            parent: Some(parent.id),
            depth: parent.depth + 1,
        }
    }

    /// Whether this node is the root of its tree.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// How a transient highlight should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightMode {
    /// Two entities being compared.
    Compare,
    /// The entity currently being worked on.
    Active,
    /// A match or answer.
    Found,
    /// A candidate that was ruled out.
    Rejected,
    /// Something under consideration.
    Candidate,
    /// Entities in their final position.
    Sorted,
}

/// A transient highlight: set by a highlighting step, cleared by the next
/// step that does not set one and by `done`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Highlight {
    pub ids: Vec<Id>,
    pub mode: HighlightMode,
}

impl Highlight {
    /// Create a highlight over `ids`.
    pub fn new(ids: impl IntoIterator<Item = Id>, mode: HighlightMode) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            mode,
        }
    }

    /// Whether `id` is highlighted.
    pub fn contains(&self, id: Id) -> bool {
        self.ids.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_values_assigns_sequential_ids() {
        let blocks = Block::from_values(&[5, 3, 9]);
        let ids: Vec<_> = blocks.iter().map(|b| b.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(blocks[1].value, 3);
    }

    #[test]
    fn child_depth_follows_parent() {
        let root = TreeNode::root(Id(0), "[]");
        let child = TreeNode::child_of(&root, Id(1), "[1]");
        assert!(root.is_root());
        assert_eq!(child.parent, Some(Id(0)));
        assert_eq!(child.depth, 1);
    }

    #[test]
    fn unlabeled_block_omits_label() {
        let json = serde_json::to_string(&Block::new(1, 4)).unwrap();
        assert!(!json.contains("label"));
    }

    #[test]
    fn highlight_mode_is_kebab_case() {
        let json = serde_json::to_string(&HighlightMode::Compare).unwrap();
        assert_eq!(json, "\"compare\"");
    }
}
