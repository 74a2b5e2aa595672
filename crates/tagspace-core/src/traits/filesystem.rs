//! Read-only filesystem access used by the directory synchronizer.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// One name returned by a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirItem {
    /// Entry name, never containing a path separator.
    pub name: String,
    /// Whether the item is a directory. Symlinks are reported as
    /// non-directories so scans never follow them.
    pub is_dir: bool,
}

impl DirItem {
    /// Whether the name starts with a dot.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// Metadata captured from a single `stat` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FileStat {
    /// Device number, when the platform exposes one.
    pub dev: Option<u64>,
    /// Inode number, when the platform exposes one.
    pub ino: Option<u64>,
    /// Size in bytes.
    pub size: u64,
    /// Modification time in seconds since the Unix epoch.
    pub mtime: f64,
    /// Whether the path resolved to a directory.
    pub is_dir: bool,
}

/// Trait for filesystem backends scanned by the synchronizer.
///
/// Implementations only read; nothing in the sync pipeline ever writes to
/// the real filesystem.
#[async_trait]
pub trait FileSystem: Send + Sync + std::fmt::Debug + 'static {
    /// Short backend name used in log lines.
    fn provider_name(&self) -> &str;

    /// List the immediate children of a directory.
    async fn read_dir(&self, path: &Path) -> AppResult<Vec<DirItem>>;

    /// Stat a path, following symlinks.
    async fn stat(&self, path: &Path) -> AppResult<FileStat>;
}
