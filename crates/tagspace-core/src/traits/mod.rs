//! Core traits defined in `tagspace-core` and implemented by other crates.

pub mod filesystem;
pub mod observer;

pub use filesystem::{DirItem, FileStat, FileSystem};
pub use observer::{CollectingObserver, NoopObserver, SyncObserver};
