//! Progress notifications for sync runs.

use std::path::Path;
use std::sync::Mutex;

use crate::error::AppError;
use crate::events::{EntryChange, MatchReason, SyncEvent};
use crate::traits::filesystem::FileStat;
use crate::types::EntryId;

/// Receives fire-and-forget notifications while a sync runs.
///
/// Every method defaults to a no-op. Implementations must not block: they
/// are called inline from the scan.
pub trait SyncObserver: Send + Sync {
    /// An entry was added, refreshed, or recycled.
    fn on_entry(&self, _change: EntryChange, _path: &Path) {}

    /// A stat finished and its metadata was stored.
    fn on_stat(&self, _path: &Path, _stat: &FileStat) {}

    /// Description and tags were copied from `donor` onto the entry at `path`.
    fn on_recover(&self, _donor: EntryId, _path: &Path, _reason: MatchReason) {}

    /// A per-node filesystem failure was isolated.
    fn on_error(&self, _path: &Path, _error: &AppError) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}

/// Observer that records every notification as a [`SyncEvent`].
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<SyncEvent>>,
}

impl CollectingObserver {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Real paths reported with the given change, in arrival order.
    pub fn paths_with(&self, change: EntryChange) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SyncEvent::Entry { change: c, path } if c == change => Some(path),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SyncEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl SyncObserver for CollectingObserver {
    fn on_entry(&self, change: EntryChange, path: &Path) {
        self.push(SyncEvent::Entry {
            change,
            path: path.display().to_string(),
        });
    }

    fn on_stat(&self, path: &Path, stat: &FileStat) {
        self.push(SyncEvent::Stat {
            path: path.display().to_string(),
            size: stat.size,
        });
    }

    fn on_recover(&self, donor: EntryId, path: &Path, reason: MatchReason) {
        self.push(SyncEvent::Recovered {
            donor_id: donor,
            path: path.display().to_string(),
            reason,
        });
    }

    fn on_error(&self, path: &Path, error: &AppError) {
        self.push(SyncEvent::Failed {
            path: path.display().to_string(),
            message: error.to_string(),
        });
    }
}
