//! Entry tree building for hierarchical display.

use std::collections::HashMap;
use std::sync::Arc;

use tagspace_core::error::AppError;
use tagspace_core::result::AppResult;
use tagspace_core::types::EntryId;
use tagspace_database::repositories::{EntryRepository, EntryTagRepository};
use tagspace_entity::entry::{EntryNode, TreeEntry};

/// Builds nested entry trees with tag names attached.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    /// Entry repository.
    entries: Arc<EntryRepository>,
    /// Entry-tag associations.
    links: Arc<EntryTagRepository>,
}

impl TreeBuilder {
    /// Creates a new tree builder.
    pub fn new(entries: Arc<EntryRepository>, links: Arc<EntryTagRepository>) -> Self {
        Self { entries, links }
    }

    /// Builds the subtree rooted at `id`, at most `max_depth` levels deep.
    pub async fn build(&self, id: EntryId, max_depth: Option<usize>) -> AppResult<EntryNode> {
        let root = self
            .entries
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Entry {id} not found")))?;
        let descendants = self.entries.find_descendants(id).await?;

        let mut tags: HashMap<EntryId, Vec<String>> = HashMap::new();
        for entry in std::iter::once(&root).chain(descendants.iter()) {
            let names = self
                .links
                .list_tags(entry.id)
                .await?
                .into_iter()
                .map(|t| t.name)
                .collect();
            tags.insert(entry.id, names);
        }

        let mut by_parent: HashMap<EntryId, Vec<TreeEntry>> = HashMap::new();
        for entry in descendants {
            if let Some(parent) = entry.parent_id {
                by_parent.entry(parent).or_default().push(entry);
            }
        }

        Ok(assemble(root, &mut by_parent, &mut tags, max_depth.unwrap_or(usize::MAX)))
    }
}

fn assemble(
    entry: TreeEntry,
    by_parent: &mut HashMap<EntryId, Vec<TreeEntry>>,
    tags: &mut HashMap<EntryId, Vec<String>>,
    depth_left: usize,
) -> EntryNode {
    let mut node = EntryNode::leaf(entry, Vec::new());
    node.tags = tags.remove(&node.entry.id).unwrap_or_default();
    if depth_left == 0 {
        return node;
    }
    if let Some(children) = by_parent.remove(&node.entry.id) {
        node.children = children
            .into_iter()
            .map(|child| assemble(child, by_parent, tags, depth_left - 1))
            .collect();
    }
    node
}
