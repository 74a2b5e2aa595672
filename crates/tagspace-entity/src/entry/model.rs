//! Tree entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tagspace_core::traits::FileStat;
use tagspace_core::types::EntryId;

/// A file or directory in the virtual tree.
///
/// `dev`, `ino`, `size` and `mtime` stay `None` until the first stat of the
/// real path completes. `ctime` is the time the entry was created or last
/// touched by a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TreeEntry {
    /// Unique entry identifier.
    pub id: EntryId,
    /// Parent directory (`None` for top-level entries).
    pub parent_id: Option<EntryId>,
    /// Name within the parent.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Device number from the last stat.
    pub dev: Option<i64>,
    /// Inode number from the last stat.
    pub ino: Option<i64>,
    /// Size in bytes from the last stat.
    pub size: Option<i64>,
    /// Modification time (seconds since epoch) from the last stat.
    pub mtime: Option<f64>,
    /// Free-text description.
    pub description: Option<String>,
    /// When the entry was created or last touched by a scan.
    pub ctime: DateTime<Utc>,
}

impl TreeEntry {
    /// Check if this is a top-level entry.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data required to create a new tree entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntry {
    /// Parent directory (`None` for top level).
    pub parent_id: Option<EntryId>,
    /// Entry name, must not contain `/`.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Optional initial description.
    pub description: Option<String>,
}

impl CreateEntry {
    /// Describe a new file under `parent_id`.
    pub fn file(parent_id: Option<EntryId>, name: impl Into<String>) -> Self {
        Self {
            parent_id,
            name: name.into(),
            is_dir: false,
            description: None,
        }
    }

    /// Describe a new directory under `parent_id`.
    pub fn dir(parent_id: Option<EntryId>, name: impl Into<String>) -> Self {
        Self {
            parent_id,
            name: name.into(),
            is_dir: true,
            description: None,
        }
    }
}

/// Stat-derived metadata written onto an entry after a scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryMeta {
    /// Device number.
    pub dev: Option<i64>,
    /// Inode number.
    pub ino: Option<i64>,
    /// Size in bytes.
    pub size: i64,
    /// Modification time in seconds since epoch.
    pub mtime: f64,
}

impl From<&FileStat> for EntryMeta {
    fn from(stat: &FileStat) -> Self {
        Self {
            // Stored as the same bit pattern; only equality is ever compared.
            dev: stat.dev.map(|v| v as i64),
            ino: stat.ino.map(|v| v as i64),
            size: i64::try_from(stat.size).unwrap_or(i64::MAX),
            mtime: stat.mtime,
        }
    }
}
