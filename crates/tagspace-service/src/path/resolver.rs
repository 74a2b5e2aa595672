//! Bidirectional mapping between virtual tree paths and real paths.
//!
//! A virtual path is the `/`-joined chain of entry names from the top
//! level, e.g. `pics/2024/a.jpg`. Its first segment names a mount; the rest
//! is relative to that mount's real root.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tagspace_core::config::MountConfig;
use tagspace_core::error::AppError;
use tagspace_core::result::AppResult;
use tagspace_core::types::EntryId;
use tagspace_database::repositories::EntryRepository;
use tagspace_entity::entry::TreeEntry;

/// Resolves entries and virtual paths against the mount list.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Entry repository.
    entries: Arc<EntryRepository>,
    /// Effective mounts.
    mounts: Vec<MountConfig>,
    /// Top-level recycle directory name.
    recycle_dir_name: String,
}

/// Non-empty `/`-separated segments of a virtual path.
fn segments(virtual_path: &str) -> impl Iterator<Item = &str> {
    virtual_path.split('/').filter(|part| !part.is_empty())
}

impl PathResolver {
    /// Creates a new path resolver.
    pub fn new(
        entries: Arc<EntryRepository>,
        mounts: Vec<MountConfig>,
        recycle_dir_name: impl Into<String>,
    ) -> Self {
        Self {
            entries,
            mounts,
            recycle_dir_name: recycle_dir_name.into(),
        }
    }

    /// The mounts this resolver maps through.
    pub fn mounts(&self) -> &[MountConfig] {
        &self.mounts
    }

    /// Map a virtual path to the real path under its mount.
    pub fn virtual_to_real(&self, virtual_path: &str) -> AppResult<PathBuf> {
        let mut parts = segments(virtual_path);
        let head = parts
            .next()
            .ok_or_else(|| AppError::validation("Empty virtual path"))?;
        let mount = self
            .mounts
            .iter()
            .find(|m| m.virtual_name == head)
            .ok_or_else(|| AppError::not_found(format!("No mount named '{head}'")))?;

        let mut real = PathBuf::from(&mount.real_path);
        for part in parts {
            if part == "." || part == ".." {
                return Err(AppError::validation(format!(
                    "Invalid segment '{part}' in virtual path '{virtual_path}'"
                )));
            }
            real.push(part);
        }
        Ok(real)
    }

    /// Map a real path to its virtual path. The deepest enclosing mount wins.
    pub fn real_to_virtual(&self, real_path: &Path) -> AppResult<String> {
        let (mount, rest) = self
            .mounts
            .iter()
            .filter_map(|m| {
                real_path
                    .strip_prefix(&m.real_path)
                    .ok()
                    .map(|rest| (m, rest))
            })
            .max_by_key(|(m, _)| Path::new(&m.real_path).components().count())
            .ok_or_else(|| {
                AppError::not_found(format!("{} is outside every mount", real_path.display()))
            })?;

        let mut virtual_path = mount.virtual_name.clone();
        for component in rest.components() {
            let Component::Normal(part) = component else {
                return Err(AppError::validation(format!(
                    "Unsupported path component in {}",
                    real_path.display()
                )));
            };
            let part = part.to_str().ok_or_else(|| {
                AppError::validation(format!("Non UTF-8 path: {}", real_path.display()))
            })?;
            virtual_path.push('/');
            virtual_path.push_str(part);
        }
        Ok(virtual_path)
    }

    /// Virtual path of an entry.
    pub async fn virtual_path(&self, id: EntryId) -> AppResult<String> {
        let chain = self.chain(id).await?;
        Ok(chain
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join("/"))
    }

    /// Real path backing an entry.
    ///
    /// Entries in the recycle bin have no real counterpart.
    pub async fn real_path(&self, id: EntryId) -> AppResult<PathBuf> {
        let chain = self.chain(id).await?;
        if chain
            .first()
            .is_some_and(|top| top.name == self.recycle_dir_name)
        {
            return Err(AppError::validation(format!(
                "Entry {id} is in the recycle bin"
            )));
        }
        let virtual_path = chain
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join("/");
        self.virtual_to_real(&virtual_path)
    }

    /// Walk a virtual path name by name. Empty segments are ignored.
    pub async fn find_by_virtual_path(&self, virtual_path: &str) -> AppResult<Option<TreeEntry>> {
        let mut current: Option<TreeEntry> = None;
        for part in segments(virtual_path) {
            let parent = current.as_ref().map(|e| e.id);
            match self.entries.find_by_name(parent, part).await? {
                Some(entry) => current = Some(entry),
                None => return Ok(None),
            }
        }
        Ok(current)
    }

    async fn chain(&self, id: EntryId) -> AppResult<Vec<TreeEntry>> {
        let chain = self.entries.find_ancestors(id).await?;
        if chain.is_empty() {
            return Err(AppError::not_found(format!("Entry {id} not found")));
        }
        Ok(chain)
    }
}
