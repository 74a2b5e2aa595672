//! Local filesystem provider.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use tagspace_core::error::{AppError, ErrorKind};
use tagspace_core::result::AppResult;
use tagspace_core::traits::filesystem::{DirItem, FileStat, FileSystem};

/// Reads the real filesystem through `tokio::fs`.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    /// Create a new local filesystem provider.
    pub fn new() -> Self {
        Self
    }
}

fn io_error(e: std::io::Error, action: &str, path: &Path) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Path not found: {}", path.display()))
    } else {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to {action}: {}", path.display()),
            e,
        )
    }
}

/// Seconds since the Unix epoch, negative for earlier timestamps.
fn epoch_seconds(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

#[cfg(unix)]
fn dev_ino(meta: &std::fs::Metadata) -> (Option<u64>, Option<u64>) {
    use std::os::unix::fs::MetadataExt;
    (Some(meta.dev()), Some(meta.ino()))
}

#[cfg(not(unix))]
fn dev_ino(_meta: &std::fs::Metadata) -> (Option<u64>, Option<u64>) {
    (None, None)
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    fn provider_name(&self) -> &str {
        "local"
    }

    async fn read_dir(&self, path: &Path) -> AppResult<Vec<DirItem>> {
        let mut dir = fs::read_dir(path)
            .await
            .map_err(|e| io_error(e, "list directory", path))?;

        let mut items = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| io_error(e, "read directory entry", path))?
        {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(dir = %path.display(), name = ?raw, "Skipping non UTF-8 file name");
                    continue;
                }
            };
            // file_type does not follow symlinks, so links are never walked into.
            let Some(is_dir) = is_dir_or_skip(&entry.path(), entry.file_type().await) else {
                continue;
            };
            items.push(DirItem { name, is_dir });
        }

        items.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(dir = %path.display(), count = items.len(), "Listed directory");
        Ok(items)
    }

    async fn stat(&self, path: &Path) -> AppResult<FileStat> {
        let meta = fs::metadata(path)
            .await
            .map_err(|e| io_error(e, "stat", path))?;
        let (dev, ino) = dev_ino(&meta);
        let mtime = meta.modified().map(epoch_seconds).unwrap_or_default();

        Ok(FileStat {
            dev,
            ino,
            size: meta.len(),
            mtime,
            is_dir: meta.is_dir(),
        })
    }
}

/// A child whose type cannot be read is left out of its listing.
fn is_dir_or_skip(path: &Path, file_type: std::io::Result<std::fs::FileType>) -> Option<bool> {
    match file_type {
        Ok(t) => Some(t.is_dir()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping entry with unreadable file type");
            None
        }
    }
}
