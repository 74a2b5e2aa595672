//! Recycle bin management.
//!
//! Entries whose real file disappeared are never deleted by a sync. They
//! are moved, with their subtree, tags and description, into a freshly
//! named container under the top-level recycle directory.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use tagspace_core::config::SyncConfig;
use tagspace_core::error::{AppError, ErrorKind};
use tagspace_core::result::AppResult;
use tagspace_core::types::EntryId;
use tagspace_database::repositories::entry::{self as entry_queries, EntryRepository};
use tagspace_entity::entry::TreeEntry;

use super::naming::next_recycle_name;

/// Result of a single recycle operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecycledEntry {
    /// The entry after the move; its name is unchanged.
    pub entry: TreeEntry,
    /// The generated container it now lives in.
    pub slot: TreeEntry,
}

/// A generated container with its content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecycleSlot {
    /// The container directory.
    pub slot: TreeEntry,
    /// Entries moved into it.
    pub contents: Vec<TreeEntry>,
}

/// Moves vanished entries into the recycle directory.
#[derive(Debug)]
pub struct RecycleManager {
    /// Entry repository.
    entries: Arc<EntryRepository>,
    /// Top-level recycle directory name.
    dir_name: String,
    /// Group width of generated container names.
    name_width: usize,
    /// Serializes name generation within this process.
    lock: Mutex<()>,
}

impl RecycleManager {
    /// Creates a new recycle manager.
    pub fn new(entries: Arc<EntryRepository>, config: &SyncConfig) -> Self {
        Self {
            entries,
            dir_name: config.recycle_dir_name.clone(),
            name_width: config.recycle_name_width.max(1),
            lock: Mutex::new(()),
        }
    }

    /// Name of the top-level recycle directory.
    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }

    /// Move an entry into a new container under the recycle directory.
    ///
    /// Finding the recycle directory, choosing the next container name,
    /// creating the container and moving the entry commit as one
    /// transaction.
    pub async fn recycle(&self, id: EntryId) -> AppResult<RecycledEntry> {
        let _guard = self.lock.lock().await;
        let mut tx = self.entries.begin().await?;

        let entry = entry_queries::fetch(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Entry {id} not found")))?;

        let bin = entry_queries::get_or_create_dir(&mut tx, None, &self.dir_name).await?;
        if bin.id == entry.id {
            return Err(AppError::validation(
                "The recycle directory cannot be recycled",
            ));
        }

        let max = entry_queries::max_child_name(&mut *tx, bin.id).await?;
        let slot_name = next_recycle_name(max.as_deref(), self.name_width);
        let slot = entry_queries::get_or_create_dir(&mut tx, Some(bin.id), &slot_name).await?;
        let moved = entry_queries::set_parent(&mut *tx, id, Some(slot.id)).await?;
        entry_queries::touch(&mut *tx, slot.id).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit recycle", e)
        })?;

        info!(
            entry_id = %id,
            name = %moved.name,
            slot = %slot_name,
            "Recycled entry"
        );

        Ok(RecycledEntry { entry: moved, slot })
    }

    /// The recycle directory, if it has been created.
    pub async fn recycle_dir(&self) -> AppResult<Option<TreeEntry>> {
        self.entries.find_by_name(None, &self.dir_name).await
    }

    /// Every generated container and what it holds, oldest name first.
    pub async fn list_slots(&self) -> AppResult<Vec<RecycleSlot>> {
        let Some(bin) = self.recycle_dir().await? else {
            return Ok(Vec::new());
        };

        let mut slots = Vec::new();
        for slot in self.entries.list_children(Some(bin.id)).await? {
            let contents = self.entries.list_children(Some(slot.id)).await?;
            slots.push(RecycleSlot { slot, contents });
        }
        Ok(slots)
    }

    /// Whether `id` is the recycle directory or lies beneath it.
    pub async fn contains(&self, id: EntryId) -> AppResult<bool> {
        let chain = self.entries.find_ancestors(id).await?;
        Ok(chain
            .first()
            .is_some_and(|top| top.is_root() && top.name == self.dir_name))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use tagspace_database::DatabasePool;
    use tagspace_database::migration::run_migrations;
    use tagspace_entity::entry::CreateEntry;

    async fn setup() -> (Arc<EntryRepository>, RecycleManager) {
        let db = DatabasePool::in_memory().await.unwrap();
        run_migrations(db.pool()).await.unwrap();
        let entries = Arc::new(EntryRepository::new(db.into_pool()));
        let manager = RecycleManager::new(entries.clone(), &SyncConfig::default());
        (entries, manager)
    }

    #[tokio::test]
    async fn test_recycle_moves_entry_into_generated_slot() {
        let (entries, manager) = setup().await;
        let root = entries.create(&CreateEntry::dir(None, "pics")).await.unwrap();
        let file = entries
            .create(&CreateEntry::file(Some(root.id), "a.jpg"))
            .await
            .unwrap();

        let recycled = manager.recycle(file.id).await.unwrap();
        assert_eq!(recycled.slot.name, "aaaaaa");
        assert_eq!(recycled.entry.name, "a.jpg");
        assert_eq!(recycled.entry.parent_id, Some(recycled.slot.id));

        let bin = manager.recycle_dir().await.unwrap().unwrap();
        assert_eq!(bin.name, "<recycle>");
        assert_eq!(recycled.slot.parent_id, Some(bin.id));
        assert!(manager.contains(file.id).await.unwrap());
        assert!(!manager.contains(root.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_recycle_keeps_subtree() {
        let (entries, manager) = setup().await;
        let dir = entries.create(&CreateEntry::dir(None, "d")).await.unwrap();
        let child = entries
            .create(&CreateEntry::file(Some(dir.id), "inner"))
            .await
            .unwrap();

        manager.recycle(dir.id).await.unwrap();
        let stored = entries.find_by_id(child.id).await.unwrap().unwrap();
        assert_eq!(stored.parent_id, Some(dir.id));
        assert!(manager.contains(child.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_successive_recycles_get_increasing_names() {
        let (entries, manager) = setup().await;
        let mut names = Vec::new();
        for i in 0..3 {
            let e = entries
                .create(&CreateEntry::file(None, format!("f{i}")))
                .await
                .unwrap();
            names.push(manager.recycle(e.id).await.unwrap().slot.name);
        }
        assert_eq!(names, vec!["aaaaaa", "aaaaab", "aaaaac"]);

        let slots = manager.list_slots().await.unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[1].contents[0].name, "f1");
    }

    #[tokio::test]
    async fn test_concurrent_recycles_never_share_a_slot() {
        let (entries, manager) = setup().await;
        let manager = Arc::new(manager);
        let mut ids = Vec::new();
        for i in 0..20 {
            let e = entries
                .create(&CreateEntry::file(None, format!("f{i}")))
                .await
                .unwrap();
            ids.push(e.id);
        }

        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.recycle(id).await })
            })
            .collect();

        let mut names = HashSet::new();
        for handle in handles {
            let recycled = handle.await.unwrap().unwrap();
            assert!(names.insert(recycled.slot.name));
        }
        assert_eq!(names.len(), 20);
    }

    #[tokio::test]
    async fn test_recycle_missing_entry_is_not_found() {
        let (_, manager) = setup().await;
        let err = manager.recycle(EntryId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_recycle_dir_itself_is_rejected() {
        let (entries, manager) = setup().await;
        let bin = entries.get_or_create_dir(None, "<recycle>").await.unwrap();
        let err = manager.recycle(bin.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
