//! Observer that forwards sync notifications to `tracing`.

use std::path::Path;

use tracing::{debug, trace};

use tagspace_core::error::AppError;
use tagspace_core::events::{EntryChange, MatchReason};
use tagspace_core::traits::{FileStat, SyncObserver};
use tagspace_core::types::EntryId;

/// Logs every notification. Failures and recoveries are already logged by
/// the synchronizer at `warn`/`info`, so they are repeated here at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SyncObserver for TracingObserver {
    fn on_entry(&self, change: EntryChange, path: &Path) {
        debug!(%change, path = %path.display(), "Entry");
    }

    fn on_stat(&self, path: &Path, stat: &FileStat) {
        trace!(path = %path.display(), size = stat.size, mtime = stat.mtime, "Stat");
    }

    fn on_recover(&self, donor: EntryId, path: &Path, reason: MatchReason) {
        debug!(donor_id = %donor, %reason, path = %path.display(), "Recovered");
    }

    fn on_error(&self, path: &Path, error: &AppError) {
        debug!(path = %path.display(), error = %error, "Node failed");
    }
}
