//! Configured and persisted mounts.

pub mod service;

pub use service::MountService;
