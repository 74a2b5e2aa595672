//! Entry-to-tag association repository.

use sqlx::SqlitePool;

use tagspace_core::error::{AppError, ErrorKind};
use tagspace_core::result::AppResult;
use tagspace_core::types::{EntryId, TagId};
use tagspace_entity::entry::TreeEntry;
use tagspace_entity::tag::Tag;

fn link_error(e: sqlx::Error, context: &'static str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::not_found(format!("{context}: entry or tag does not exist"))
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}

/// Repository for the many-to-many `entry_tags` join table.
#[derive(Debug, Clone)]
pub struct EntryTagRepository {
    pool: SqlitePool,
}

impl EntryTagRepository {
    /// Create a new association repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Attach a tag. Attaching an already attached tag is a no-op.
    pub async fn add(&self, entry_id: EntryId, tag_id: TagId) -> AppResult<()> {
        sqlx::query("INSERT OR IGNORE INTO entry_tags (entry_id, tag_id) VALUES (?, ?)")
            .bind(entry_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await
            .map_err(|e| link_error(e, "Failed to add tag"))?;
        Ok(())
    }

    /// Detach a tag. Returns `true` if it was attached.
    pub async fn remove(&self, entry_id: EntryId, tag_id: TagId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM entry_tags WHERE entry_id = ? AND tag_id = ?")
            .bind(entry_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove tag", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Detach every tag from an entry.
    pub async fn clear(&self, entry_id: EntryId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM entry_tags WHERE entry_id = ?")
            .bind(entry_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear tags", e))?;
        Ok(result.rows_affected())
    }

    /// Replace an entry's tag set atomically.
    pub async fn set(&self, entry_id: EntryId, tag_ids: &[TagId]) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query("DELETE FROM entry_tags WHERE entry_id = ?")
            .bind(entry_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear tags", e))?;

        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO entry_tags (entry_id, tag_id) VALUES (?, ?)")
                .bind(entry_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| link_error(e, "Failed to set tags"))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit tags", e))
    }

    /// Add every tag of `from` to `to`, keeping tags `to` already has.
    /// Returns the number of newly attached tags.
    pub async fn copy(&self, from: EntryId, to: EntryId) -> AppResult<u64> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO entry_tags (entry_id, tag_id) \
             SELECT ?, tag_id FROM entry_tags WHERE entry_id = ?",
        )
        .bind(to)
        .bind(from)
        .execute(&self.pool)
        .await
        .map_err(|e| link_error(e, "Failed to copy tags"))?;
        Ok(result.rows_affected())
    }

    /// Tags attached to an entry, by name.
    pub async fn list_tags(&self, entry_id: EntryId) -> AppResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>(
            "SELECT t.* FROM tags t INNER JOIN entry_tags et ON et.tag_id = t.id \
             WHERE et.entry_id = ? ORDER BY t.name ASC",
        )
        .bind(entry_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list entry tags", e))
    }

    /// Entries carrying a tag, by name.
    pub async fn list_entries(&self, tag_id: TagId) -> AppResult<Vec<TreeEntry>> {
        sqlx::query_as::<_, TreeEntry>(
            "SELECT e.* FROM tree_entries e INNER JOIN entry_tags et ON et.entry_id = e.id \
             WHERE et.tag_id = ? ORDER BY e.name ASC",
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tagged entries", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{EntryRepository, TagRepository, test_pool};
    use tagspace_entity::entry::CreateEntry;
    use tagspace_entity::tag::CreateTag;

    struct Fixture {
        entries: EntryRepository,
        tags: TagRepository,
        links: EntryTagRepository,
    }

    async fn fixture() -> Fixture {
        let pool = test_pool().await;
        Fixture {
            entries: EntryRepository::new(pool.clone()),
            tags: TagRepository::new(pool.clone()),
            links: EntryTagRepository::new(pool),
        }
    }

    fn names(tags: Vec<Tag>) -> Vec<String> {
        tags.into_iter().map(|t| t.name).collect()
    }

    #[tokio::test]
    async fn test_add_is_idempotent_and_remove() {
        let f = fixture().await;
        let entry = f.entries.create(&CreateEntry::file(None, "a")).await.unwrap();
        let tag = f.tags.create(&CreateTag::named("x", None)).await.unwrap();

        f.links.add(entry.id, tag.id).await.unwrap();
        f.links.add(entry.id, tag.id).await.unwrap();
        assert_eq!(f.links.list_tags(entry.id).await.unwrap().len(), 1);

        assert!(f.links.remove(entry.id, tag.id).await.unwrap());
        assert!(!f.links.remove(entry.id, tag.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_copy_is_additive() {
        let f = fixture().await;
        let from = f.entries.create(&CreateEntry::file(None, "from")).await.unwrap();
        let to = f.entries.create(&CreateEntry::file(None, "to")).await.unwrap();
        let x = f.tags.create(&CreateTag::named("x", None)).await.unwrap();
        let y = f.tags.create(&CreateTag::named("y", None)).await.unwrap();
        let z = f.tags.create(&CreateTag::named("z", None)).await.unwrap();

        f.links.set(from.id, &[x.id, y.id]).await.unwrap();
        f.links.add(to.id, z.id).await.unwrap();

        assert_eq!(f.links.copy(from.id, to.id).await.unwrap(), 2);
        assert_eq!(names(f.links.list_tags(to.id).await.unwrap()), vec!["x", "y", "z"]);
        assert_eq!(names(f.links.list_tags(from.id).await.unwrap()), vec!["x", "y"]);
        assert_eq!(f.links.copy(from.id, to.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_entry_delete_clears_associations() {
        let f = fixture().await;
        let entry = f.entries.create(&CreateEntry::file(None, "a")).await.unwrap();
        let tag = f.tags.create(&CreateTag::named("x", None)).await.unwrap();
        f.links.add(entry.id, tag.id).await.unwrap();

        f.entries.delete(entry.id).await.unwrap();
        assert!(f.links.list_entries(tag.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_replaces_and_clear() {
        let f = fixture().await;
        let entry = f.entries.create(&CreateEntry::file(None, "a")).await.unwrap();
        let x = f.tags.create(&CreateTag::named("x", None)).await.unwrap();
        let y = f.tags.create(&CreateTag::named("y", None)).await.unwrap();

        f.links.set(entry.id, &[x.id]).await.unwrap();
        f.links.set(entry.id, &[y.id]).await.unwrap();
        assert_eq!(names(f.links.list_tags(entry.id).await.unwrap()), vec!["y"]);
        assert_eq!(f.links.list_entries(y.id).await.unwrap()[0].id, entry.id);

        assert_eq!(f.links.clear(entry.id).await.unwrap(), 1);
        assert!(f.links.list_tags(entry.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_unknown_tag_is_not_found() {
        let f = fixture().await;
        let entry = f.entries.create(&CreateEntry::file(None, "a")).await.unwrap();
        let err = f.links.add(entry.id, TagId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
