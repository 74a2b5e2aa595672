//! Category repository implementation.

use sqlx::SqlitePool;

use tagspace_core::error::{AppError, ErrorKind};
use tagspace_core::result::AppResult;
use tagspace_core::types::CategoryId;
use tagspace_entity::tag::{Category, CreateCategory};

/// Repository for tag categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Create a new category repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a category. Names are unique.
    pub async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, foreground, background, description) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(CategoryId::new())
        .bind(&data.name)
        .bind(&data.foreground)
        .bind(&data.background)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::conflict(format!("Category '{}' already exists", data.name))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create category", e),
        })
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: CategoryId) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find category", e))
    }

    /// Find a category by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find category by name", e)
            })
    }

    /// List all categories by name.
    pub async fn list(&self) -> AppResult<Vec<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list categories", e))
    }

    /// Rename a category.
    pub async fn rename(&self, id: CategoryId, name: &str) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("UPDATE categories SET name = ? WHERE id = ? RETURNING *")
            .bind(name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    AppError::conflict(format!("Category '{name}' already exists"))
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to rename category", e),
            })?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))
    }

    /// Set the display colours.
    pub async fn set_colors(
        &self,
        id: CategoryId,
        foreground: Option<&str>,
        background: Option<&str>,
    ) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET foreground = ?, background = ? WHERE id = ? RETURNING *",
        )
        .bind(foreground)
        .bind(background)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set colours", e))?
        .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))
    }

    /// Set or clear the description.
    pub async fn describe(&self, id: CategoryId, description: Option<&str>) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET description = ? WHERE id = ? RETURNING *",
        )
        .bind(description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to describe category", e))?
        .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))
    }

    /// Delete a category together with its tags and their associations.
    pub async fn delete(&self, id: CategoryId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete category", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_pool;

    #[tokio::test]
    async fn test_category_crud() {
        let repo = CategoryRepository::new(test_pool().await);
        let cat = repo.create(&CreateCategory::named("people")).await.unwrap();
        assert_eq!(repo.find_by_name("people").await.unwrap().unwrap().id, cat.id);

        let err = repo.create(&CreateCategory::named("people")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let renamed = repo.rename(cat.id, "persons").await.unwrap();
        assert_eq!(renamed.name, "persons");

        let colored = repo
            .set_colors(cat.id, Some("#000000"), Some("#ffcc00"))
            .await
            .unwrap();
        assert_eq!(colored.background.as_deref(), Some("#ffcc00"));

        let described = repo.describe(cat.id, Some("who is in it")).await.unwrap();
        assert_eq!(described.description.as_deref(), Some("who is in it"));

        assert_eq!(repo.list().await.unwrap().len(), 1);
        assert!(repo.delete(cat.id).await.unwrap());
        assert!(repo.find_by_id(cat.id).await.unwrap().is_none());
    }
}
