//! In-memory filesystem provider.
//!
//! Holds a flat map of absolute paths with synthetic device and inode
//! numbers. Renames keep the inode, which makes identity recovery
//! reproducible without touching disk. Failures can be injected per path.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use tagspace_core::error::AppError;
use tagspace_core::result::AppResult;
use tagspace_core::traits::filesystem::{DirItem, FileStat, FileSystem};

#[derive(Debug, Clone, Copy)]
struct Node {
    is_dir: bool,
    dev: u64,
    ino: u64,
    size: u64,
    mtime: f64,
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<PathBuf, Node>,
    next_ino: u64,
    failing_reads: HashSet<PathBuf>,
    failing_stats: HashSet<PathBuf>,
}

impl State {
    fn alloc_ino(&mut self) -> u64 {
        self.next_ino += 1;
        self.next_ino
    }

    fn ensure_dirs(&mut self, path: &Path, dev: u64) {
        let missing: Vec<PathBuf> = path
            .ancestors()
            .filter(|p| !p.as_os_str().is_empty() && !self.nodes.contains_key(*p))
            .map(Path::to_path_buf)
            .collect();
        for dir in missing.into_iter().rev() {
            let ino = self.alloc_ino();
            self.nodes.insert(
                dir,
                Node {
                    is_dir: true,
                    dev,
                    ino,
                    size: 0,
                    mtime: 0.0,
                },
            );
        }
    }

    fn subtree_keys(&self, root: &Path) -> Vec<PathBuf> {
        self.nodes
            .keys()
            .filter(|k| k.starts_with(root))
            .cloned()
            .collect()
    }
}

/// Filesystem held entirely in memory.
#[derive(Debug)]
pub struct MemoryFileSystem {
    dev: u64,
    state: RwLock<State>,
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileSystem {
    /// Create an empty filesystem on device `1`.
    pub fn new() -> Self {
        Self::with_device(1)
    }

    /// Create an empty filesystem reporting the given device number.
    pub fn with_device(dev: u64) -> Self {
        Self {
            dev,
            state: RwLock::new(State::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|p| p.into_inner())
    }

    /// Create a directory and any missing parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.write().ensure_dirs(path.as_ref(), self.dev);
    }

    /// Create a file with a fresh inode. Returns the inode.
    pub fn add_file(&self, path: impl AsRef<Path>, size: u64, mtime: f64) -> u64 {
        let mut state = self.write();
        let ino = state.alloc_ino();
        drop(state);
        self.add_file_with_identity(path, self.dev, ino, size, mtime);
        ino
    }

    /// Create or replace a file with an explicit device and inode.
    pub fn add_file_with_identity(
        &self,
        path: impl AsRef<Path>,
        dev: u64,
        ino: u64,
        size: u64,
        mtime: f64,
    ) {
        let path = path.as_ref();
        let mut state = self.write();
        if let Some(parent) = path.parent() {
            state.ensure_dirs(parent, self.dev);
        }
        state.next_ino = state.next_ino.max(ino);
        state.nodes.insert(
            path.to_path_buf(),
            Node {
                is_dir: false,
                dev,
                ino,
                size,
                mtime,
            },
        );
    }

    /// Change a file's size and modification time, keeping its inode.
    pub fn set_meta(&self, path: impl AsRef<Path>, size: u64, mtime: f64) -> AppResult<()> {
        let path = path.as_ref();
        let mut state = self.write();
        let node = state
            .nodes
            .get_mut(path)
            .ok_or_else(|| AppError::not_found(format!("Path not found: {}", path.display())))?;
        node.size = size;
        node.mtime = mtime;
        Ok(())
    }

    /// Move a path and everything below it. Inodes are preserved.
    pub fn rename(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> AppResult<()> {
        let (from, to) = (from.as_ref(), to.as_ref());
        let mut state = self.write();
        if !state.nodes.contains_key(from) {
            return Err(AppError::not_found(format!(
                "Path not found: {}",
                from.display()
            )));
        }
        if let Some(parent) = to.parent() {
            state.ensure_dirs(parent, self.dev);
        }
        for key in state.subtree_keys(from) {
            if let (Some(node), Ok(rest)) = (state.nodes.remove(&key), key.strip_prefix(from)) {
                let target = if rest.as_os_str().is_empty() {
                    to.to_path_buf()
                } else {
                    to.join(rest)
                };
                state.nodes.insert(target, node);
            }
        }
        Ok(())
    }

    /// Delete a path and everything below it. Returns whether it existed.
    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        let mut state = self.write();
        let keys = state.subtree_keys(path.as_ref());
        for key in &keys {
            state.nodes.remove(key);
        }
        !keys.is_empty()
    }

    /// Make every `read_dir` of `path` fail with a permission error.
    pub fn fail_read_dir(&self, path: impl AsRef<Path>) {
        self.write().failing_reads.insert(path.as_ref().to_path_buf());
    }

    /// Make every `stat` of `path` fail with a permission error.
    pub fn fail_stat(&self, path: impl AsRef<Path>) {
        self.write().failing_stats.insert(path.as_ref().to_path_buf());
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        let mut state = self.write();
        state.failing_reads.clear();
        state.failing_stats.clear();
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    fn provider_name(&self) -> &str {
        "memory"
    }

    async fn read_dir(&self, path: &Path) -> AppResult<Vec<DirItem>> {
        let state = self.read();
        if state.failing_reads.contains(path) {
            return Err(AppError::storage(format!(
                "Permission denied: {}",
                path.display()
            )));
        }
        match state.nodes.get(path) {
            Some(node) if node.is_dir => {}
            Some(_) => {
                return Err(AppError::storage(format!(
                    "Not a directory: {}",
                    path.display()
                )));
            }
            None => {
                return Err(AppError::not_found(format!(
                    "Path not found: {}",
                    path.display()
                )));
            }
        }

        Ok(state
            .nodes
            .iter()
            .filter(|(key, _)| key.parent() == Some(path))
            .filter_map(|(key, node)| {
                key.file_name().and_then(|n| n.to_str()).map(|name| DirItem {
                    name: name.to_string(),
                    is_dir: node.is_dir,
                })
            })
            .collect())
    }

    async fn stat(&self, path: &Path) -> AppResult<FileStat> {
        let state = self.read();
        if state.failing_stats.contains(path) {
            return Err(AppError::storage(format!(
                "Permission denied: {}",
                path.display()
            )));
        }
        let node = state
            .nodes
            .get(path)
            .ok_or_else(|| AppError::not_found(format!("Path not found: {}", path.display())))?;
        Ok(FileStat {
            dev: Some(node.dev),
            ino: Some(node.ino),
            size: node.size,
            mtime: node.mtime,
            is_dir: node.is_dir,
        })
    }
}
