//! Tag category entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tagspace_core::types::CategoryId;

/// A named group of tags. Deleting a category deletes its tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Category name, unique across all categories.
    pub name: String,
    /// Foreground colour.
    pub foreground: Option<String>,
    /// Background colour.
    pub background: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Data required to create a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCategory {
    /// Category name.
    pub name: String,
    /// Foreground colour.
    pub foreground: Option<String>,
    /// Background colour.
    pub background: Option<String>,
    /// Description.
    pub description: Option<String>,
}

impl CreateCategory {
    /// A bare category with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
