//! Identity matching for metadata recovery.
//!
//! When a scan creates a new entry, the matcher looks for a prior entry that
//! most likely holds the same content, so its description and tags can be
//! carried over. Matching is heuristic: unrelated files sharing name, size
//! and mtime are merged, and that is accepted.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tagspace_core::events::MatchReason;
use tagspace_core::result::AppResult;
use tagspace_core::types::EntryId;
use tagspace_database::repositories::EntryRepository;
use tagspace_entity::entry::{EntryMeta, TreeEntry};

/// A freshly stat'd entry looking for its prior identity.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    /// The new entry, excluded from its own matches.
    pub entry_id: EntryId,
    /// Name of the new entry.
    pub name: &'a str,
    /// Stat metadata about to be committed.
    pub meta: &'a EntryMeta,
}

/// A prior entry chosen as a recovery donor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// The donor entry.
    pub donor: TreeEntry,
    /// Which check selected it.
    pub reason: MatchReason,
}

/// Strategy for finding prior entries that represent the same content.
#[async_trait]
pub trait IdentityMatcher: Send + Sync + Debug {
    /// Candidates in priority order, without duplicates.
    async fn find_candidates(&self, observed: &Observation<'_>) -> AppResult<Vec<Candidate>>;
}

/// Matches on device+inode, then independently on name+size+mtime.
///
/// Each check picks the most recently touched entry.
#[derive(Debug, Clone)]
pub struct HeuristicMatcher {
    /// Entry repository.
    entries: Arc<EntryRepository>,
}

impl HeuristicMatcher {
    /// Creates a new heuristic matcher.
    pub fn new(entries: Arc<EntryRepository>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl IdentityMatcher for HeuristicMatcher {
    async fn find_candidates(&self, observed: &Observation<'_>) -> AppResult<Vec<Candidate>> {
        let mut candidates: Vec<Candidate> = Vec::with_capacity(2);
        let exclude = Some(observed.entry_id);
        let meta = observed.meta;

        if let (Some(dev), Some(ino)) = (meta.dev, meta.ino) {
            if let Some(donor) = self.entries.match_dev_ino(dev, ino, exclude).await? {
                candidates.push(Candidate {
                    donor,
                    reason: MatchReason::DevIno,
                });
            }
        }

        if let Some(donor) = self
            .entries
            .match_name_size_mtime(observed.name, meta.size, meta.mtime, exclude)
            .await?
        {
            if !candidates.iter().any(|c| c.donor.id == donor.id) {
                candidates.push(Candidate {
                    donor,
                    reason: MatchReason::NameSizeMtime,
                });
            }
        }

        Ok(candidates)
    }
}

/// Description to carry over: the first donor that has one.
pub fn recovered_description(candidates: &[Candidate]) -> Option<&str> {
    candidates
        .iter()
        .find_map(|c| c.donor.description.as_deref())
}
