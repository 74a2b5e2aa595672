//! Entry tree structures for hierarchical display.

use serde::{Deserialize, Serialize};

use super::model::TreeEntry;

/// A node in a rendered subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryNode {
    /// The entry at this node.
    pub entry: TreeEntry,
    /// Tag names attached to the entry.
    pub tags: Vec<String>,
    /// Child nodes, ordered by name.
    pub children: Vec<EntryNode>,
}

impl EntryNode {
    /// Create a leaf node.
    pub fn leaf(entry: TreeEntry, tags: Vec<String>) -> Self {
        Self {
            entry,
            tags,
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(EntryNode::count).sum::<usize>()
    }
}
