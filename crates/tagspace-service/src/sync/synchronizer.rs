//! Directory synchronizer.
//!
//! Walks a real directory tree and reconciles it against the stored
//! subtree. For every real item the entry is looked up by
//! `(parent, name)` and created if missing before the item is stat'd, so
//! children of a new directory can be walked while its stat is still in
//! flight. Stored children with no real counterpart are recycled once all
//! real items of their directory are done.
//!
//! The whole walk runs as nested futures on the calling task. Filesystem
//! calls and store work are bounded by two semaphores. A store permit
//! covers one item's lookups and writes and is never held across a child
//! walk, so queued items wait on the semaphore rather than on the pool.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::future::{BoxFuture, FutureExt, try_join_all};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{info, warn};

use tagspace_core::config::{MountConfig, SyncConfig, validate_mounts};
use tagspace_core::error::{AppError, ErrorKind};
use tagspace_core::events::EntryChange;
use tagspace_core::result::AppResult;
use tagspace_core::traits::{DirItem, FileStat, FileSystem, SyncObserver};
use tagspace_core::types::EntryId;
use tagspace_database::repositories::{EntryRepository, EntryTagRepository};
use tagspace_entity::entry::{CreateEntry, EntryMeta, TreeEntry};

use super::matcher::{IdentityMatcher, Observation, recovered_description};
use super::recycle::RecycleManager;
use super::report::{SyncCounters, SyncReport};

/// Per-run state shared by every future of one walk.
struct Run<'a> {
    observer: &'a dyn SyncObserver,
    counters: SyncCounters,
}

/// Reconciles real directories with the tree store.
#[derive(Debug)]
pub struct DirectorySynchronizer {
    /// Filesystem being scanned.
    fs: Arc<dyn FileSystem>,
    /// Entry repository.
    entries: Arc<EntryRepository>,
    /// Entry-tag associations, used for recovery.
    links: Arc<EntryTagRepository>,
    /// Recovery donor lookup.
    matcher: Arc<dyn IdentityMatcher>,
    /// Destination for vanished entries.
    recycler: Arc<RecycleManager>,
    /// Bound on in-flight filesystem calls.
    io_limit: Semaphore,
    /// Bound on items doing store work at once.
    store_limit: Semaphore,
    /// Whether dot-prefixed names are scanned.
    include_hidden: bool,
}

impl DirectorySynchronizer {
    /// Creates a new synchronizer.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        entries: Arc<EntryRepository>,
        links: Arc<EntryTagRepository>,
        matcher: Arc<dyn IdentityMatcher>,
        recycler: Arc<RecycleManager>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            fs,
            entries,
            links,
            matcher,
            recycler,
            io_limit: Semaphore::new(config.max_concurrent_io.max(1)),
            store_limit: Semaphore::new(config.max_concurrent_store.max(1)),
            include_hidden: config.include_hidden,
        }
    }

    /// Sync every mount concurrently and return the summed report.
    ///
    /// Per-node filesystem failures are counted and skipped; only store
    /// failures abort the run.
    pub async fn sync_all(
        &self,
        mounts: &[MountConfig],
        observer: &dyn SyncObserver,
    ) -> AppResult<SyncReport> {
        validate_mounts(mounts, self.recycler.dir_name())?;
        let started = Instant::now();

        let reports =
            try_join_all(mounts.iter().map(|mount| self.sync_mount(mount, observer))).await?;

        let mut total = SyncReport::default();
        for report in &reports {
            total += report;
        }
        total.duration = started.elapsed();
        Ok(total)
    }

    /// Sync one mount: its root entry `(None, virtual_name)` and everything below.
    pub async fn sync_mount(
        &self,
        mount: &MountConfig,
        observer: &dyn SyncObserver,
    ) -> AppResult<SyncReport> {
        if mount.virtual_name == self.recycler.dir_name() {
            return Err(AppError::configuration(format!(
                "Mount name '{}' is reserved",
                mount.virtual_name
            )));
        }

        let started = Instant::now();
        let run = Run {
            observer,
            counters: SyncCounters::default(),
        };
        info!(
            mount = %mount.virtual_name,
            real_path = %mount.real_path,
            "Syncing mount"
        );

        self.sync_item(
            &run,
            PathBuf::from(&mount.real_path),
            None,
            mount.virtual_name.clone(),
            true,
        )
        .await?;

        let report = run.counters.snapshot(started.elapsed());
        info!(
            mount = %mount.virtual_name,
            processed = report.processed,
            added = report.added,
            changed = report.changed,
            deleted = report.deleted,
            recovered = report.recovered,
            stat_failures = report.stat_failures,
            dir_failures = report.dir_failures,
            duration_ms = report.duration.as_millis() as u64,
            "Mount synced"
        );
        Ok(report)
    }

    /// Reconcile the children of an existing directory entry with `real_path`.
    pub async fn sync_dir_at(
        &self,
        real_path: &Path,
        dir_id: EntryId,
        observer: &dyn SyncObserver,
    ) -> AppResult<SyncReport> {
        let started = Instant::now();
        let run = Run {
            observer,
            counters: SyncCounters::default(),
        };
        self.sync_dir(&run, real_path.to_path_buf(), dir_id).await?;
        Ok(run.counters.snapshot(started.elapsed()))
    }

    /// Sync one real item and, for directories, its subtree.
    async fn sync_item<'a>(
        &'a self,
        run: &'a Run<'a>,
        path: PathBuf,
        parent_id: Option<EntryId>,
        name: String,
        is_dir: bool,
    ) -> AppResult<()> {
        let result = async {
            let (id, stat) = self
                .sync_file(run, path.clone(), parent_id, name, is_dir)
                .await?;
            run.counters.processed();
            if is_dir {
                let (walked, stated) = tokio::join!(self.sync_dir(run, path.clone(), id), stat);
                walked.and(stated)
            } else {
                stat.await
            }
        }
        .await;
        self.isolate(run, &path, result)
    }

    /// Look up or create the entry, then hand back a future that stats the
    /// real path and commits metadata.
    async fn sync_file<'a>(
        &'a self,
        run: &'a Run<'a>,
        path: PathBuf,
        parent_id: Option<EntryId>,
        name: String,
        is_dir: bool,
    ) -> AppResult<(EntryId, BoxFuture<'a, AppResult<()>>)> {
        let _permit = self.acquire(&self.store_limit).await?;
        let existing = match self.entries.find_by_name(parent_id, &name).await? {
            Some(entry) if entry.is_dir != is_dir => {
                // File replaced by a directory or the reverse: a new object.
                self.recycle(run, &path, &entry).await?;
                None
            }
            other => other,
        };

        let (id, is_new) = match existing {
            Some(entry) => (entry.id, false),
            None => {
                let created = self
                    .entries
                    .create(&CreateEntry {
                        parent_id,
                        name: name.clone(),
                        is_dir,
                        description: None,
                    })
                    .await?;
                (created.id, true)
            }
        };

        let change = if is_new {
            EntryChange::Add
        } else {
            EntryChange::Change
        };
        run.counters.entry(change);
        run.observer.on_entry(change, &path);

        let stat = self.stat_and_commit(run, path, id, name, is_new).boxed();
        Ok((id, stat))
    }

    async fn stat_and_commit<'a>(
        &'a self,
        run: &'a Run<'a>,
        path: PathBuf,
        id: EntryId,
        name: String,
        is_new: bool,
    ) -> AppResult<()> {
        let stat = match self.stat(&path).await {
            Ok(stat) => stat,
            Err(e) if !e.is_fatal_for_sync() => {
                run.counters.stat_failed();
                warn!(path = %path.display(), error = %e, "Stat failed, keeping last known metadata");
                run.observer.on_error(&path, &e);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let meta = EntryMeta::from(&stat);

        let _permit = self.acquire(&self.store_limit).await?;
        let mut description = None;
        if is_new {
            let candidates = self
                .matcher
                .find_candidates(&Observation {
                    entry_id: id,
                    name: &name,
                    meta: &meta,
                })
                .await?;
            for candidate in &candidates {
                self.links.copy(candidate.donor.id, id).await?;
                run.counters.recovered();
                info!(
                    path = %path.display(),
                    entry_id = %id,
                    donor_id = %candidate.donor.id,
                    reason = %candidate.reason,
                    "Recovered metadata"
                );
                run.observer
                    .on_recover(candidate.donor.id, &path, candidate.reason);
            }
            description = recovered_description(&candidates).map(str::to_owned);
        }

        self.entries
            .update_meta(id, &meta, description.as_deref())
            .await?;
        run.observer.on_stat(&path, &stat);
        Ok(())
    }

    /// Reconcile the children of `dir_id` with the listing of `path`.
    fn sync_dir<'a>(
        &'a self,
        run: &'a Run<'a>,
        path: PathBuf,
        dir_id: EntryId,
    ) -> BoxFuture<'a, AppResult<()>> {
        async move {
            let (listing, children) =
                tokio::join!(self.read_dir(&path), self.list_children(dir_id));
            let children = children?;
            let items = match listing {
                Ok(items) => items,
                Err(e) if !e.is_fatal_for_sync() => {
                    run.counters.dir_failed();
                    warn!(path = %path.display(), error = %e, "Directory read failed, skipping subtree");
                    run.observer.on_error(&path, &e);
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            let items: Vec<DirItem> = items
                .into_iter()
                .filter(|item| self.include_hidden || !item.is_hidden())
                .collect();

            let mut stale: BTreeMap<String, TreeEntry> = children
                .into_iter()
                .filter(|child| self.include_hidden || !child.name.starts_with('.'))
                .map(|child| (child.name.clone(), child))
                .collect();
            for item in &items {
                stale.remove(&item.name);
            }

            try_join_all(items.into_iter().map(|item| {
                self.sync_item(
                    run,
                    path.join(&item.name),
                    Some(dir_id),
                    item.name,
                    item.is_dir,
                )
            }))
            .await?;

            for entry in stale.values() {
                let stale_path = path.join(&entry.name);
                let result = async {
                    let _permit = self.acquire(&self.store_limit).await?;
                    self.recycle(run, &stale_path, entry).await
                }
                .await;
                self.isolate(run, &stale_path, result)?;
            }
            Ok(())
        }
        .boxed()
    }

    /// Callers hold a store permit.
    async fn recycle(&self, run: &Run<'_>, path: &Path, entry: &TreeEntry) -> AppResult<()> {
        self.recycler.recycle(entry.id).await?;
        run.counters.entry(EntryChange::Delete);
        run.observer.on_entry(EntryChange::Delete, path);
        Ok(())
    }

    /// Keep store failures fatal; log and swallow everything else.
    fn isolate(&self, run: &Run<'_>, path: &Path, result: AppResult<()>) -> AppResult<()> {
        match result {
            Err(e) if !e.is_fatal_for_sync() => {
                warn!(path = %path.display(), error = %e, "Skipping entry");
                run.observer.on_error(path, &e);
                Ok(())
            }
            other => other,
        }
    }

    async fn acquire<'s>(&self, limit: &'s Semaphore) -> AppResult<SemaphorePermit<'s>> {
        limit
            .acquire()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Sync limiter closed", e))
    }

    async fn list_children(&self, dir_id: EntryId) -> AppResult<Vec<TreeEntry>> {
        let _permit = self.acquire(&self.store_limit).await?;
        self.entries.list_children(Some(dir_id)).await
    }

    async fn read_dir(&self, path: &Path) -> AppResult<Vec<DirItem>> {
        let _permit = self.acquire(&self.io_limit).await?;
        self.fs.read_dir(path).await
    }

    async fn stat(&self, path: &Path) -> AppResult<FileStat> {
        let _permit = self.acquire(&self.io_limit).await?;
        self.fs.stat(path).await
    }
}
