//! # tagspace-service
//!
//! Reconciliation engine and business logic for Tagspace. The `sync`
//! module keeps the tree store in step with real directories; the other
//! modules expose the entry, tag and mount operations a front end wraps.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod entry;
pub mod mount;
pub mod path;
pub mod sync;
pub mod tag;

pub use context::ServiceContext;
pub use entry::{EntryDetail, EntryService, TreeBuilder};
pub use mount::MountService;
pub use path::PathResolver;
pub use sync::{
    DirectorySynchronizer, HeuristicMatcher, IdentityMatcher, RecycleManager, SyncReport,
    TracingObserver,
};
pub use tag::TagService;
