//! Source entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tagspace_core::config::MountConfig;

/// A mount registered at runtime and stored alongside the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Source {
    /// Top-level virtual name, the primary key.
    pub name: String,
    /// Absolute real directory path.
    pub real_path: String,
    /// When the source was registered.
    pub created_at: DateTime<Utc>,
}

impl Source {
    /// Convert to the mount form used by the synchronizer.
    pub fn to_mount(&self) -> MountConfig {
        MountConfig::new(self.real_path.clone(), self.name.clone())
    }
}
