//! Tag repository implementation.

use sqlx::SqlitePool;

use tagspace_core::error::{AppError, ErrorKind};
use tagspace_core::result::AppResult;
use tagspace_core::types::{CategoryId, TagId};
use tagspace_entity::tag::{CreateTag, Tag};

fn tag_write_error(e: sqlx::Error, name: &str, context: &'static str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::conflict(format!("Tag '{name}' already exists"))
        }
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::not_found("Category does not exist")
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}

/// Repository for tags.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: SqlitePool,
}

impl TagRepository {
    /// Create a new tag repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a tag. Names are globally unique.
    pub async fn create(&self, data: &CreateTag) -> AppResult<Tag> {
        sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (id, category_id, name, foreground, background, description) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(TagId::new())
        .bind(data.category_id)
        .bind(&data.name)
        .bind(&data.foreground)
        .bind(&data.background)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| tag_write_error(e, &data.name, "Failed to create tag"))
    }

    /// Find a tag by ID.
    pub async fn find_by_id(&self, id: TagId) -> AppResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find tag", e))
    }

    /// Find a tag by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find tag by name", e)
            })
    }

    /// List every tag by name.
    pub async fn list(&self) -> AppResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tags", e))
    }

    /// List tags in a category; `None` lists uncategorised tags.
    pub async fn list_by_category(&self, category_id: Option<CategoryId>) -> AppResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE category_id IS ? ORDER BY name ASC")
            .bind(category_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list tags by category", e)
            })
    }

    /// Rename a tag.
    pub async fn rename(&self, id: TagId, name: &str) -> AppResult<Tag> {
        sqlx::query_as::<_, Tag>("UPDATE tags SET name = ? WHERE id = ? RETURNING *")
            .bind(name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| tag_write_error(e, name, "Failed to rename tag"))?
            .ok_or_else(|| AppError::not_found(format!("Tag {id} not found")))
    }

    /// Move a tag to another category, or out of any category.
    pub async fn set_category(&self, id: TagId, category_id: Option<CategoryId>) -> AppResult<Tag> {
        sqlx::query_as::<_, Tag>("UPDATE tags SET category_id = ? WHERE id = ? RETURNING *")
            .bind(category_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| tag_write_error(e, "", "Failed to move tag"))?
            .ok_or_else(|| AppError::not_found(format!("Tag {id} not found")))
    }

    /// Set the display colours.
    pub async fn set_colors(
        &self,
        id: TagId,
        foreground: Option<&str>,
        background: Option<&str>,
    ) -> AppResult<Tag> {
        sqlx::query_as::<_, Tag>(
            "UPDATE tags SET foreground = ?, background = ? WHERE id = ? RETURNING *",
        )
        .bind(foreground)
        .bind(background)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set colours", e))?
        .ok_or_else(|| AppError::not_found(format!("Tag {id} not found")))
    }

    /// Set or clear the description.
    pub async fn describe(&self, id: TagId, description: Option<&str>) -> AppResult<Tag> {
        sqlx::query_as::<_, Tag>("UPDATE tags SET description = ? WHERE id = ? RETURNING *")
            .bind(description)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to describe tag", e))?
            .ok_or_else(|| AppError::not_found(format!("Tag {id} not found")))
    }

    /// Delete a tag and all its entry associations.
    pub async fn delete(&self, id: TagId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete tag", e))?;
        Ok(result.rows_affected() > 0)
    }
}
