//! Entry CRUD, moves and recycle restore.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use tagspace_core::error::AppError;
use tagspace_core::result::AppResult;
use tagspace_core::types::EntryId;
use tagspace_database::repositories::{EntryRepository, EntryTagRepository};
use tagspace_entity::entry::{EntryNode, TreeEntry};
use tagspace_entity::tag::Tag;

use super::tree::TreeBuilder;
use crate::sync::RecycleManager;

/// An entry with its virtual path and tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryDetail {
    /// The entry row.
    pub entry: TreeEntry,
    /// `/`-joined names from the top level.
    pub virtual_path: String,
    /// Tags attached to the entry.
    pub tags: Vec<Tag>,
    /// Whether the entry sits inside the recycle bin.
    pub recycled: bool,
}

/// Manages user-driven entry operations.
#[derive(Debug, Clone)]
pub struct EntryService {
    /// Entry repository.
    entries: Arc<EntryRepository>,
    /// Entry-tag associations.
    links: Arc<EntryTagRepository>,
    /// Recycle bin, for restore and protection checks.
    recycler: Arc<RecycleManager>,
    /// Tree builder.
    trees: TreeBuilder,
}

impl EntryService {
    /// Creates a new entry service.
    pub fn new(
        entries: Arc<EntryRepository>,
        links: Arc<EntryTagRepository>,
        recycler: Arc<RecycleManager>,
    ) -> Self {
        let trees = TreeBuilder::new(entries.clone(), links.clone());
        Self {
            entries,
            links,
            recycler,
            trees,
        }
    }

    /// Gets an entry by ID.
    pub async fn get(&self, id: EntryId) -> AppResult<TreeEntry> {
        self.entries
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Entry {id} not found")))
    }

    /// Lists the children of a directory, or the top level for `None`.
    pub async fn list(&self, parent_id: Option<EntryId>) -> AppResult<Vec<TreeEntry>> {
        if let Some(parent) = parent_id {
            let dir = self.get(parent).await?;
            if !dir.is_dir {
                return Err(AppError::validation(format!("'{}' is not a directory", dir.name)));
            }
        }
        self.entries.list_children(parent_id).await
    }

    /// Builds the subtree below an entry.
    pub async fn tree(&self, id: EntryId, max_depth: Option<usize>) -> AppResult<EntryNode> {
        self.trees.build(id, max_depth).await
    }

    /// Gets an entry with its path and tags.
    pub async fn show(&self, id: EntryId) -> AppResult<EntryDetail> {
        let chain = self.entries.find_ancestors(id).await?;
        let Some(entry) = chain.last().cloned() else {
            return Err(AppError::not_found(format!("Entry {id} not found")));
        };
        let recycled = chain
            .first()
            .is_some_and(|top| top.is_root() && top.name == self.recycler.dir_name());
        let virtual_path = chain
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join("/");
        let tags = self.links.list_tags(id).await?;

        Ok(EntryDetail {
            entry,
            virtual_path,
            tags,
            recycled,
        })
    }

    /// Sets or clears the description. Empty text clears it.
    pub async fn describe(&self, id: EntryId, description: Option<&str>) -> AppResult<TreeEntry> {
        let description = description.map(str::trim).filter(|d| !d.is_empty());
        self.entries.describe(id, description).await
    }

    /// Moves an entry under a new parent, optionally renaming it.
    pub async fn move_entry(
        &self,
        id: EntryId,
        new_parent_id: Option<EntryId>,
        new_name: Option<&str>,
    ) -> AppResult<TreeEntry> {
        let entry = self.get(id).await?;
        self.ensure_not_bin(&entry)?;
        if let Some(parent) = new_parent_id {
            self.ensure_valid_parent(id, parent).await?;
        }

        let name = new_name.unwrap_or(&entry.name);
        let moved = self.entries.move_rename(id, new_parent_id, name).await?;
        info!(entry_id = %id, name = %moved.name, "Moved entry");
        Ok(moved)
    }

    /// Renames an entry in place.
    pub async fn rename(&self, id: EntryId, new_name: &str) -> AppResult<TreeEntry> {
        let entry = self.get(id).await?;
        self.ensure_not_bin(&entry)?;
        let renamed = self.entries.rename(id, new_name).await?;
        info!(entry_id = %id, from = %entry.name, to = %renamed.name, "Renamed entry");
        Ok(renamed)
    }

    /// Moves a recycled entry back into the live tree.
    ///
    /// Keeps the recycled name when `new_name` is `None`. A sibling with
    /// the same name in the target is a conflict.
    pub async fn restore(
        &self,
        id: EntryId,
        parent_id: Option<EntryId>,
        new_name: Option<&str>,
    ) -> AppResult<TreeEntry> {
        let entry = self.get(id).await?;
        if !self.recycler.contains(id).await? {
            return Err(AppError::validation(format!(
                "Entry '{}' is not in the recycle bin",
                entry.name
            )));
        }
        self.ensure_not_bin(&entry)?;
        if let Some(parent) = parent_id {
            if self.recycler.contains(parent).await? {
                return Err(AppError::validation(
                    "Cannot restore into the recycle bin",
                ));
            }
            self.ensure_valid_parent(id, parent).await?;
        }

        let name = new_name.unwrap_or(&entry.name);
        let restored = self.entries.move_rename(id, parent_id, name).await?;
        info!(entry_id = %id, name = %restored.name, "Restored entry");
        Ok(restored)
    }

    /// Permanently deletes an entry, its subtree and their tag links.
    pub async fn delete(&self, id: EntryId) -> AppResult<()> {
        if !self.entries.delete(id).await? {
            return Err(AppError::not_found(format!("Entry {id} not found")));
        }
        info!(entry_id = %id, "Deleted entry");
        Ok(())
    }

    fn ensure_not_bin(&self, entry: &TreeEntry) -> AppResult<()> {
        if entry.is_root() && entry.name == self.recycler.dir_name() {
            return Err(AppError::validation(
                "The recycle directory cannot be moved or renamed",
            ));
        }
        Ok(())
    }

    /// The target must be an existing directory that is not `id` itself or
    /// one of its descendants.
    async fn ensure_valid_parent(&self, id: EntryId, parent: EntryId) -> AppResult<()> {
        let chain = self.entries.find_ancestors(parent).await?;
        let Some(target) = chain.last() else {
            return Err(AppError::not_found(format!("Entry {parent} not found")));
        };
        if !target.is_dir {
            return Err(AppError::validation(format!(
                "'{}' is not a directory",
                target.name
            )));
        }
        if chain.iter().any(|e| e.id == id) {
            return Err(AppError::validation(
                "Cannot move an entry into itself or its descendants",
            ));
        }
        Ok(())
    }
}
