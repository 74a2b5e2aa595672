//! Sync tallies.

use std::ops::AddAssign;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tagspace_core::events::EntryChange;

/// Final counts of a sync run, per mount or summed across mounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Real entries visited, including mount roots.
    pub processed: u64,
    /// Entries created.
    pub added: u64,
    /// Existing entries refreshed.
    pub changed: u64,
    /// Entries moved to the recycle directory.
    pub deleted: u64,
    /// Recovery events (one per donor).
    pub recovered: u64,
    /// Stats that failed and left metadata as last known.
    pub stat_failures: u64,
    /// Directory listings that failed and were skipped.
    pub dir_failures: u64,
    /// Wall-clock time of the run.
    pub duration: Duration,
}

impl SyncReport {
    /// Whether any node failed during the run.
    pub fn has_failures(&self) -> bool {
        self.stat_failures > 0 || self.dir_failures > 0
    }
}

impl AddAssign<&SyncReport> for SyncReport {
    fn add_assign(&mut self, other: &SyncReport) {
        self.processed += other.processed;
        self.added += other.added;
        self.changed += other.changed;
        self.deleted += other.deleted;
        self.recovered += other.recovered;
        self.stat_failures += other.stat_failures;
        self.dir_failures += other.dir_failures;
        self.duration = self.duration.max(other.duration);
    }
}

/// Shared counters updated while a walk is in flight.
#[derive(Debug, Default)]
pub(crate) struct SyncCounters {
    processed: AtomicU64,
    added: AtomicU64,
    changed: AtomicU64,
    deleted: AtomicU64,
    recovered: AtomicU64,
    stat_failures: AtomicU64,
    dir_failures: AtomicU64,
}

impl SyncCounters {
    pub(crate) fn entry(&self, change: EntryChange) {
        let counter = match change {
            EntryChange::Add => &self.added,
            EntryChange::Change => &self.changed,
            EntryChange::Delete => &self.deleted,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn recovered(&self) {
        self.recovered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn stat_failed(&self) {
        self.stat_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dir_failed(&self) {
        self.dir_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, duration: Duration) -> SyncReport {
        SyncReport {
            processed: self.processed.load(Ordering::Relaxed),
            added: self.added.load(Ordering::Relaxed),
            changed: self.changed.load(Ordering::Relaxed),
            deleted: self.deleted.load(Ordering::Relaxed),
            recovered: self.recovered.load(Ordering::Relaxed),
            stat_failures: self.stat_failures.load(Ordering::Relaxed),
            dir_failures: self.dir_failures.load(Ordering::Relaxed),
            duration,
        }
    }
}
