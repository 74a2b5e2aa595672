//! Mount and scanning configuration.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A configured pairing of a real filesystem root and the name it appears
/// under at the top of the virtual tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountConfig {
    /// Absolute path of the real directory.
    pub real_path: String,
    /// Top-level name under the tree root.
    pub virtual_name: String,
}

impl MountConfig {
    /// Create a new mount record.
    pub fn new(real_path: impl Into<String>, virtual_name: impl Into<String>) -> Self {
        Self {
            real_path: real_path.into(),
            virtual_name: virtual_name.into(),
        }
    }
}

/// Directory synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Mounts to reconcile, in order.
    #[serde(default)]
    pub mounts: Vec<MountConfig>,
    /// Whether dot-prefixed entries are scanned.
    #[serde(default = "default_true")]
    pub include_hidden: bool,
    /// Upper bound on concurrently outstanding `readdir`/`stat` calls.
    #[serde(default = "default_max_concurrent_io")]
    pub max_concurrent_io: usize,
    /// Upper bound on items doing store work at once.
    #[serde(default = "default_max_concurrent_store")]
    pub max_concurrent_store: usize,
    /// Seconds between daemon re-syncs; `0` runs a single pass.
    #[serde(default)]
    pub interval_seconds: u64,
    /// Name of the reserved root-level recycle directory.
    #[serde(default = "default_recycle_dir_name")]
    pub recycle_dir_name: String,
    /// Width of one group of the generated recycle container names.
    #[serde(default = "default_recycle_name_width")]
    pub recycle_name_width: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            mounts: Vec::new(),
            include_hidden: default_true(),
            max_concurrent_io: default_max_concurrent_io(),
            max_concurrent_store: default_max_concurrent_store(),
            interval_seconds: 0,
            recycle_dir_name: default_recycle_dir_name(),
            recycle_name_width: default_recycle_name_width(),
        }
    }
}

impl SyncConfig {
    /// Validate the scanning settings and the configured mount list.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.recycle_dir_name.is_empty() || self.recycle_dir_name.contains('/') {
            return Err(AppError::configuration(format!(
                "Invalid recycle directory name '{}'",
                self.recycle_dir_name
            )));
        }
        if self.recycle_name_width == 0 {
            return Err(AppError::configuration(
                "recycle_name_width must be at least 1",
            ));
        }
        if self.max_concurrent_io == 0 {
            return Err(AppError::configuration(
                "max_concurrent_io must be at least 1",
            ));
        }
        if self.max_concurrent_store == 0 {
            return Err(AppError::configuration(
                "max_concurrent_store must be at least 1",
            ));
        }
        validate_mounts(&self.mounts, &self.recycle_dir_name)
    }
}

/// Check a mount list: names are non-empty, slash-free, unique and do not
/// shadow the recycle directory; real paths are absolute.
pub fn validate_mounts(mounts: &[MountConfig], recycle_dir_name: &str) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for mount in mounts {
        let name = mount.virtual_name.as_str();
        if name.trim().is_empty() {
            return Err(AppError::configuration("Mount virtual_name cannot be empty"));
        }
        if name.contains('/') {
            return Err(AppError::configuration(format!(
                "Mount virtual_name '{name}' must not contain '/'"
            )));
        }
        if name == recycle_dir_name {
            return Err(AppError::configuration(format!(
                "Mount virtual_name '{name}' is reserved for the recycle directory"
            )));
        }
        if !seen.insert(name) {
            return Err(AppError::configuration(format!(
                "Duplicate mount virtual_name '{name}'"
            )));
        }
        if !Path::new(&mount.real_path).is_absolute() {
            return Err(AppError::configuration(format!(
                "Mount '{name}' real_path '{}' must be absolute",
                mount.real_path
            )));
        }
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent_io() -> usize {
    64
}

fn default_max_concurrent_store() -> usize {
    4
}

fn default_recycle_dir_name() -> String {
    "<recycle>".to_string()
}

fn default_recycle_name_width() -> usize {
    6
}
