//! Core type definitions used across the Tagspace workspace.

pub mod id;

pub use id::*;
