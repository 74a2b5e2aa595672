//! Events emitted while reconciling mounts against the tree store.
//!
//! Events are delivered to a [`SyncObserver`](crate::traits::SyncObserver)
//! as fire-and-forget notifications and can be serialized for progress
//! transports.

pub mod sync;

pub use sync::{EntryChange, MatchReason, SyncEvent};
