//! Persisted mount sources.

pub mod model;

pub use model::Source;
