//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use tagspace_core::config::{AppConfig, DatabaseConfig, MountConfig};
use tagspace_core::traits::{CollectingObserver, FileSystem};
use tagspace_core::types::EntryId;
use tagspace_database::DatabasePool;
use tagspace_entity::entry::TreeEntry;
use tagspace_service::{ServiceContext, SyncReport};
use tagspace_storage::{LocalFileSystem, MemoryFileSystem};

/// Test application context
pub struct TestApp {
    /// Store handle, kept alive for the whole test
    pub db: DatabasePool,
    /// All services over the store
    pub ctx: ServiceContext,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a test application over an in-memory store
    pub async fn new(mounts: Vec<MountConfig>, fs: Arc<dyn FileSystem>) -> Self {
        let mut config = AppConfig {
            database: DatabaseConfig::in_memory(),
            ..AppConfig::default()
        };
        config.sync.mounts = mounts;
        config.sync.validate().expect("Invalid test config");

        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to open test database");
        tagspace_database::migration::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let ctx = ServiceContext::new(&db, &config, fs);
        Self { db, ctx, config }
    }

    /// Test application over an in-memory filesystem with the `pics` mount
    pub async fn with_memory_fs() -> (Self, Arc<MemoryFileSystem>) {
        let fs = Arc::new(MemoryFileSystem::new());
        let app = Self::new(vec![MountConfig::new("/data/pics", "pics")], fs.clone()).await;
        (app, fs)
    }

    /// Test application over the real filesystem, mounting `root` as `name`
    pub async fn with_local_fs(root: &Path, name: &str) -> Self {
        let mount = MountConfig::new(root.to_string_lossy().into_owned(), name);
        Self::new(vec![mount], Arc::new(LocalFileSystem::new())).await
    }

    /// Sync every mount and return the report together with the events
    pub async fn sync(&self) -> (SyncReport, CollectingObserver) {
        let observer = CollectingObserver::new();
        let report = self
            .ctx
            .sync_all(&observer)
            .await
            .expect("Sync failed");
        (report, observer)
    }

    /// Look up an entry by virtual path
    pub async fn entry(&self, virtual_path: &str) -> Option<TreeEntry> {
        self.ctx
            .path_resolver()
            .await
            .expect("Failed to build resolver")
            .find_by_virtual_path(virtual_path)
            .await
            .expect("Lookup failed")
    }

    /// Look up an entry that must exist
    pub async fn require(&self, virtual_path: &str) -> TreeEntry {
        self.entry(virtual_path)
            .await
            .unwrap_or_else(|| panic!("No entry at '{virtual_path}'"))
    }

    /// Virtual path of an entry
    pub async fn path_of(&self, id: EntryId) -> String {
        self.ctx
            .path_resolver()
            .await
            .expect("Failed to build resolver")
            .virtual_path(id)
            .await
            .expect("Failed to resolve path")
    }

    /// Tag names on an entry, sorted
    pub async fn tag_names(&self, id: EntryId) -> Vec<String> {
        let mut names: Vec<String> = self
            .ctx
            .tag_service
            .entry_tags(id)
            .await
            .expect("Failed to list tags")
            .into_iter()
            .map(|t| t.name)
            .collect();
        names.sort();
        names
    }

    /// Create tags (if missing) and attach them to an entry
    pub async fn tag(&self, id: EntryId, names: &[&str]) {
        for name in names {
            if self.ctx.tag_service.tag(name).await.is_err() {
                self.ctx
                    .tag_service
                    .create_tag(name, None)
                    .await
                    .expect("Failed to create tag");
            }
            self.ctx
                .tag_service
                .tag_entry(id, name)
                .await
                .expect("Failed to tag entry");
        }
    }
}
