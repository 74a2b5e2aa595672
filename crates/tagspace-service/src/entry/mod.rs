//! Tree entry operations.

pub mod service;
pub mod tree;

pub use service::{EntryDetail, EntryService};
pub use tree::TreeBuilder;
