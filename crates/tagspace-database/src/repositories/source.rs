//! Persisted mount source repository.

use chrono::Utc;
use sqlx::SqlitePool;

use tagspace_core::error::{AppError, ErrorKind};
use tagspace_core::result::AppResult;
use tagspace_entity::source::Source;

/// Repository for mounts registered at runtime.
#[derive(Debug, Clone)]
pub struct SourceRepository {
    pool: SqlitePool,
}

impl SourceRepository {
    /// Create a new source repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a source, or point an existing name at a new path.
    pub async fn upsert(&self, name: &str, real_path: &str) -> AppResult<Source> {
        sqlx::query_as::<_, Source>(
            "INSERT INTO sources (name, real_path, created_at) VALUES (?, ?, ?) \
             ON CONFLICT(name) DO UPDATE SET real_path = excluded.real_path RETURNING *",
        )
        .bind(name)
        .bind(real_path)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save source", e))
    }

    /// Find a source by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Source>> {
        sqlx::query_as::<_, Source>("SELECT * FROM sources WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find source", e))
    }

    /// List every source in registration order.
    pub async fn list(&self) -> AppResult<Vec<Source>> {
        sqlx::query_as::<_, Source>("SELECT * FROM sources ORDER BY created_at ASC, rowid ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list sources", e))
    }

    /// Remove a source. The indexed tree is left untouched.
    pub async fn delete(&self, name: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sources WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete source", e))?;
        Ok(result.rows_affected() > 0)
    }
}
