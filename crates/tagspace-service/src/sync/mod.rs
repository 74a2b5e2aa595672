//! Reconciliation of real directories against the tree store.

pub mod matcher;
pub mod naming;
pub mod observer;
pub mod recycle;
pub mod report;
pub mod synchronizer;

pub use matcher::{Candidate, HeuristicMatcher, IdentityMatcher, Observation};
pub use naming::next_recycle_name;
pub use observer::TracingObserver;
pub use recycle::{RecycleManager, RecycleSlot, RecycledEntry};
pub use report::SyncReport;
pub use synchronizer::DirectorySynchronizer;
