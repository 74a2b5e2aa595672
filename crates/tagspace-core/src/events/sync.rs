//! Sync notification payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::EntryId;

/// How a real entry relates to the tree store after a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryChange {
    /// No entry existed under `(parent, name)`; one was created.
    Add,
    /// An entry already existed and its metadata is refreshed.
    Change,
    /// A stored entry has no real counterpart and was recycled.
    Delete,
}

impl fmt::Display for EntryChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Change => write!(f, "change"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Which identity heuristic selected a recovery donor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    /// Same device and inode.
    DevIno,
    /// Same name, size and modification time.
    NameSizeMtime,
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DevIno => write!(f, "dev_ino"),
            Self::NameSizeMtime => write!(f, "name_size_mtime"),
        }
    }
}

/// A single notification produced by a sync run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// An entry was added, refreshed, or recycled.
    Entry {
        /// What happened to the entry.
        change: EntryChange,
        /// Real path of the entry.
        path: String,
    },
    /// A stat completed and its metadata was committed.
    Stat {
        /// Real path that was stat'd.
        path: String,
        /// Size reported by the filesystem.
        size: u64,
    },
    /// Metadata was recovered onto a new entry from a prior one.
    Recovered {
        /// The prior entry that donated description and tags.
        donor_id: EntryId,
        /// Real path of the new entry.
        path: String,
        /// Heuristic that selected the donor.
        reason: MatchReason,
    },
    /// A per-node filesystem failure that was isolated and skipped.
    Failed {
        /// Real path that failed.
        path: String,
        /// Error description.
        message: String,
    },
}
