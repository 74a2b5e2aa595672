//! Tag entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tagspace_core::types::{CategoryId, TagId};

/// A named label attachable to any number of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    /// Unique tag identifier.
    pub id: TagId,
    /// Optional grouping category.
    pub category_id: Option<CategoryId>,
    /// Tag name, unique across all tags.
    pub name: String,
    /// Foreground colour, free-form (e.g. `#ffffff`).
    pub foreground: Option<String>,
    /// Background colour.
    pub background: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Data required to create a tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTag {
    /// Tag name.
    pub name: String,
    /// Optional category.
    pub category_id: Option<CategoryId>,
    /// Foreground colour.
    pub foreground: Option<String>,
    /// Background colour.
    pub background: Option<String>,
    /// Description.
    pub description: Option<String>,
}

impl CreateTag {
    /// A bare tag with only a name and optional category.
    pub fn named(name: impl Into<String>, category_id: Option<CategoryId>) -> Self {
        Self {
            name: name.into(),
            category_id,
            ..Self::default()
        }
    }
}
