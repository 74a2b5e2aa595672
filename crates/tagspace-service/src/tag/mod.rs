//! Tags, categories and entry tagging.

pub mod service;

pub use service::TagService;
