//! Virtual and real path mapping.

pub mod resolver;

pub use resolver::PathResolver;
