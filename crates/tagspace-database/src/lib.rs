//! # tagspace-database
//!
//! SQLite connection management, embedded migrations and concrete
//! repository implementations for the tree, tag and source tables.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
