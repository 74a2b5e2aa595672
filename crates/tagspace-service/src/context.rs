//! Service wiring shared by the daemon and the CLI.

use std::sync::Arc;

use tracing::info;

use tagspace_core::config::AppConfig;
use tagspace_core::result::AppResult;
use tagspace_core::traits::{FileSystem, SyncObserver};
use tagspace_database::DatabasePool;
use tagspace_database::repositories::{
    CategoryRepository, EntryRepository, EntryTagRepository, SourceRepository, TagRepository,
};

use crate::entry::EntryService;
use crate::mount::MountService;
use crate::path::PathResolver;
use crate::sync::{DirectorySynchronizer, HeuristicMatcher, RecycleManager, SyncReport};
use crate::tag::TagService;

/// Every service built over one store handle and one filesystem.
///
/// The store handle is passed in and owned by the caller, who closes it on
/// shutdown.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    /// Entry repository.
    pub entries: Arc<EntryRepository>,
    /// Recycle bin.
    pub recycler: Arc<RecycleManager>,
    /// Reconciliation engine.
    pub synchronizer: Arc<DirectorySynchronizer>,
    /// Entry operations.
    pub entry_service: EntryService,
    /// Tag and category operations.
    pub tag_service: TagService,
    /// Mount registry.
    pub mount_service: MountService,
    /// Reserved recycle directory name.
    recycle_dir_name: String,
}

impl ServiceContext {
    /// Builds all repositories and services.
    pub fn new(db: &DatabasePool, config: &AppConfig, fs: Arc<dyn FileSystem>) -> Self {
        let pool = db.pool().clone();
        let entries = Arc::new(EntryRepository::new(pool.clone()));
        let links = Arc::new(EntryTagRepository::new(pool.clone()));
        let tags = Arc::new(TagRepository::new(pool.clone()));
        let categories = Arc::new(CategoryRepository::new(pool.clone()));
        let sources = Arc::new(SourceRepository::new(pool));

        let recycler = Arc::new(RecycleManager::new(Arc::clone(&entries), &config.sync));
        let matcher = Arc::new(HeuristicMatcher::new(Arc::clone(&entries)));
        let synchronizer = Arc::new(DirectorySynchronizer::new(
            fs,
            Arc::clone(&entries),
            Arc::clone(&links),
            matcher,
            Arc::clone(&recycler),
            &config.sync,
        ));

        let entry_service = EntryService::new(
            Arc::clone(&entries),
            Arc::clone(&links),
            Arc::clone(&recycler),
        );
        let tag_service = TagService::new(tags, categories, links, Arc::clone(&entries));
        let mount_service = MountService::new(
            config.sync.mounts.clone(),
            sources,
            config.sync.recycle_dir_name.clone(),
        );

        Self {
            entries,
            recycler,
            synchronizer,
            entry_service,
            tag_service,
            mount_service,
            recycle_dir_name: config.sync.recycle_dir_name.clone(),
        }
    }

    /// Path resolver over the current effective mounts.
    pub async fn path_resolver(&self) -> AppResult<PathResolver> {
        let mounts = self.mount_service.effective_mounts().await?;
        Ok(PathResolver::new(
            Arc::clone(&self.entries),
            mounts,
            self.recycle_dir_name.clone(),
        ))
    }

    /// Syncs every effective mount.
    pub async fn sync_all(&self, observer: &dyn SyncObserver) -> AppResult<SyncReport> {
        let mounts = self.mount_service.effective_mounts().await?;
        info!(mounts = mounts.len(), "Starting sync");
        self.synchronizer.sync_all(&mounts, observer).await
    }

    /// Syncs a single mount by virtual name.
    pub async fn sync_mount(&self, name: &str, observer: &dyn SyncObserver) -> AppResult<SyncReport> {
        let mount = self.mount_service.mount(name).await?;
        self.synchronizer.sync_mount(&mount, observer).await
    }
}
