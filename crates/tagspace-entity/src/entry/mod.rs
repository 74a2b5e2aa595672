//! Tree entry domain entities.

pub mod model;
pub mod tree;

pub use model::{CreateEntry, EntryMeta, TreeEntry};
pub use tree::EntryNode;
