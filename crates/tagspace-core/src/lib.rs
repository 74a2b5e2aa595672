//! # tagspace-core
//!
//! Core crate for Tagspace. Contains configuration schemas, typed
//! identifiers, sync events, the collaborator traits the reconciliation
//! engine consumes (filesystem, observer), and the unified error system.
//!
//! This crate has **no** internal dependencies on other Tagspace crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
