//! Filesystem provider implementations.

#[cfg(feature = "local")]
pub mod local;
pub mod memory;

#[cfg(feature = "local")]
pub use local::LocalFileSystem;
pub use memory::MemoryFileSystem;
