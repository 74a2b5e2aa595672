//! Tag and category domain entities.

pub mod category;
pub mod model;

pub use category::{Category, CreateCategory};
pub use model::{CreateTag, Tag};
