//! # tagspace-storage
//!
//! Read-only filesystem providers for Tagspace: the real local filesystem
//! and an in-memory tree used to drive deterministic sync tests.

pub mod providers;

pub use providers::{LocalFileSystem, MemoryFileSystem};
