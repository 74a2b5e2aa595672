//! Tree entry repository implementation.
//!
//! Every query is available as an executor-generic free function so that
//! multi-statement operations (recycling) can run them inside a single
//! transaction. [`EntryRepository`] wraps the same functions over the pool.

use chrono::Utc;
use sqlx::sqlite::SqliteExecutor;
use sqlx::{Sqlite, SqlitePool, Transaction};

use tagspace_core::error::{AppError, ErrorKind};
use tagspace_core::result::AppResult;
use tagspace_core::types::EntryId;
use tagspace_entity::entry::{CreateEntry, EntryMeta, TreeEntry};

/// Reject names that cannot live in a single path component.
pub fn validate_name(name: &str) -> AppResult<()> {
    if name.is_empty() {
        return Err(AppError::validation("Entry name cannot be empty"));
    }
    if name.contains('/') || name == "." || name == ".." {
        return Err(AppError::validation(format!(
            "Entry name '{name}' is not a valid path component"
        )));
    }
    Ok(())
}

fn write_error(e: sqlx::Error, conflict: impl FnOnce() -> String, context: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::conflict(conflict())
        }
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::not_found(format!("{context}: parent entry does not exist"))
        }
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), e),
    }
}

/// Insert a new entry with empty stat metadata.
pub async fn insert<'e, E>(executor: E, data: &CreateEntry) -> AppResult<TreeEntry>
where
    E: SqliteExecutor<'e>,
{
    validate_name(&data.name)?;
    sqlx::query_as::<_, TreeEntry>(
        "INSERT INTO tree_entries (id, parent_id, name, is_dir, description, ctime) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(EntryId::new())
    .bind(data.parent_id)
    .bind(&data.name)
    .bind(data.is_dir)
    .bind(&data.description)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
    .map_err(|e| {
        write_error(
            e,
            || format!("An entry named '{}' already exists here", data.name),
            "Failed to create entry",
        )
    })
}

/// Fetch an entry by id.
pub async fn fetch<'e, E>(executor: E, id: EntryId) -> AppResult<Option<TreeEntry>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TreeEntry>("SELECT * FROM tree_entries WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find entry", e))
}

/// Fetch the child of `parent_id` called `name`.
pub async fn fetch_by_name<'e, E>(
    executor: E,
    parent_id: Option<EntryId>,
    name: &str,
) -> AppResult<Option<TreeEntry>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TreeEntry>("SELECT * FROM tree_entries WHERE parent_id IS ? AND name = ?")
        .bind(parent_id)
        .bind(name)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find entry by name", e)
        })
}

/// Lexicographically largest child name of `parent_id`.
pub async fn max_child_name<'e, E>(executor: E, parent_id: EntryId) -> AppResult<Option<String>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, Option<String>>("SELECT MAX(name) FROM tree_entries WHERE parent_id = ?")
        .bind(parent_id)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read max name", e))
}

/// Change an entry's parent, keeping its name.
pub async fn set_parent<'e, E>(
    executor: E,
    id: EntryId,
    new_parent_id: Option<EntryId>,
) -> AppResult<TreeEntry>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, TreeEntry>("UPDATE tree_entries SET parent_id = ? WHERE id = ? RETURNING *")
        .bind(new_parent_id)
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            write_error(
                e,
                || format!("Entry {id} clashes with an existing name in the target directory"),
                "Failed to move entry",
            )
        })?
        .ok_or_else(|| AppError::not_found(format!("Entry {id} not found")))
}

/// Set an entry's ctime to now.
pub async fn touch<'e, E>(executor: E, id: EntryId) -> AppResult<()>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE tree_entries SET ctime = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(id)
        .execute(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to touch entry", e))?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("Entry {id} not found")));
    }
    Ok(())
}

/// Return the directory `(parent_id, name)`, creating it if missing.
pub async fn get_or_create_dir(
    tx: &mut Transaction<'_, Sqlite>,
    parent_id: Option<EntryId>,
    name: &str,
) -> AppResult<TreeEntry> {
    if let Some(existing) = fetch_by_name(&mut **tx, parent_id, name).await? {
        if !existing.is_dir {
            return Err(AppError::conflict(format!(
                "'{name}' exists and is not a directory"
            )));
        }
        return Ok(existing);
    }
    insert(&mut **tx, &CreateEntry::dir(parent_id, name)).await
}

/// Repository for tree entry CRUD, lookups and identity queries.
#[derive(Debug, Clone)]
pub struct EntryRepository {
    pool: SqlitePool,
}

impl EntryRepository {
    /// Create a new entry repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Begin a transaction on the underlying pool.
    pub async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))
    }

    /// Create an entry. Fails with a conflict if `(parent_id, name)` is taken.
    pub async fn create(&self, data: &CreateEntry) -> AppResult<TreeEntry> {
        insert(&self.pool, data).await
    }

    /// Find an entry by ID.
    pub async fn find_by_id(&self, id: EntryId) -> AppResult<Option<TreeEntry>> {
        fetch(&self.pool, id).await
    }

    /// Find the entry under `parent_id` with the given name.
    pub async fn find_by_name(
        &self,
        parent_id: Option<EntryId>,
        name: &str,
    ) -> AppResult<Option<TreeEntry>> {
        fetch_by_name(&self.pool, parent_id, name).await
    }

    /// List direct children of `parent_id` (top-level entries for `None`).
    pub async fn list_children(&self, parent_id: Option<EntryId>) -> AppResult<Vec<TreeEntry>> {
        sqlx::query_as::<_, TreeEntry>(
            "SELECT * FROM tree_entries WHERE parent_id IS ? ORDER BY name ASC",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    /// Store stat metadata and touch ctime.
    ///
    /// A recovered description, when given, is written in the same
    /// statement; `None` leaves the current description untouched.
    pub async fn update_meta(
        &self,
        id: EntryId,
        meta: &EntryMeta,
        recovered_description: Option<&str>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE tree_entries SET dev = ?, ino = ?, size = ?, mtime = ?, \
             description = COALESCE(?, description), ctime = ? WHERE id = ?",
        )
        .bind(meta.dev)
        .bind(meta.ino)
        .bind(meta.size)
        .bind(meta.mtime)
        .bind(recovered_description)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update metadata", e))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Entry {id} not found")));
        }
        Ok(())
    }

    /// Move an entry under a new parent, keeping its name.
    pub async fn move_entry(
        &self,
        id: EntryId,
        new_parent_id: Option<EntryId>,
    ) -> AppResult<TreeEntry> {
        set_parent(&self.pool, id, new_parent_id).await
    }

    /// Rename an entry in place.
    pub async fn rename(&self, id: EntryId, new_name: &str) -> AppResult<TreeEntry> {
        validate_name(new_name)?;
        sqlx::query_as::<_, TreeEntry>("UPDATE tree_entries SET name = ? WHERE id = ? RETURNING *")
            .bind(new_name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                write_error(
                    e,
                    || format!("An entry named '{new_name}' already exists here"),
                    "Failed to rename entry",
                )
            })?
            .ok_or_else(|| AppError::not_found(format!("Entry {id} not found")))
    }

    /// Move and rename an entry in one statement.
    pub async fn move_rename(
        &self,
        id: EntryId,
        new_parent_id: Option<EntryId>,
        new_name: &str,
    ) -> AppResult<TreeEntry> {
        validate_name(new_name)?;
        sqlx::query_as::<_, TreeEntry>(
            "UPDATE tree_entries SET parent_id = ?, name = ? WHERE id = ? RETURNING *",
        )
        .bind(new_parent_id)
        .bind(new_name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            write_error(
                e,
                || format!("An entry named '{new_name}' already exists in the target directory"),
                "Failed to move entry",
            )
        })?
        .ok_or_else(|| AppError::not_found(format!("Entry {id} not found")))
    }

    /// Set or clear the description. Counts as a metadata update for ctime.
    pub async fn describe(&self, id: EntryId, description: Option<&str>) -> AppResult<TreeEntry> {
        sqlx::query_as::<_, TreeEntry>(
            "UPDATE tree_entries SET description = ?, ctime = ? WHERE id = ? RETURNING *",
        )
        .bind(description)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to describe entry", e))?
        .ok_or_else(|| AppError::not_found(format!("Entry {id} not found")))
    }

    /// Lexicographically largest child name under `parent_id`.
    pub async fn max_child_name(&self, parent_id: EntryId) -> AppResult<Option<String>> {
        max_child_name(&self.pool, parent_id).await
    }

    /// Most recently touched entry with the given device and inode.
    pub async fn match_dev_ino(
        &self,
        dev: i64,
        ino: i64,
        exclude: Option<EntryId>,
    ) -> AppResult<Option<TreeEntry>> {
        sqlx::query_as::<_, TreeEntry>(
            "SELECT * FROM tree_entries WHERE dev = ? AND ino = ? AND id IS NOT ? \
             ORDER BY ctime DESC, rowid DESC LIMIT 1",
        )
        .bind(dev)
        .bind(ino)
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to match dev/ino", e))
    }

    /// Most recently touched entry with the given name, size and mtime.
    pub async fn match_name_size_mtime(
        &self,
        name: &str,
        size: i64,
        mtime: f64,
        exclude: Option<EntryId>,
    ) -> AppResult<Option<TreeEntry>> {
        sqlx::query_as::<_, TreeEntry>(
            "SELECT * FROM tree_entries WHERE name = ? AND size = ? AND mtime = ? \
             AND id IS NOT ? ORDER BY ctime DESC, rowid DESC LIMIT 1",
        )
        .bind(name)
        .bind(size)
        .bind(mtime)
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to match name/size/mtime", e)
        })
    }

    /// Return the directory `(parent_id, name)`, creating it if missing.
    pub async fn get_or_create_dir(
        &self,
        parent_id: Option<EntryId>,
        name: &str,
    ) -> AppResult<TreeEntry> {
        let mut tx = self.begin().await?;
        let dir = get_or_create_dir(&mut tx, parent_id, name).await?;
        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit", e))?;
        Ok(dir)
    }

    /// Permanently delete an entry, its subtree and their tag rows.
    pub async fn delete(&self, id: EntryId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tree_entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete entry", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// All descendants of an entry, shallowest first.
    pub async fn find_descendants(&self, id: EntryId) -> AppResult<Vec<TreeEntry>> {
        sqlx::query_as::<_, TreeEntry>(
            "WITH RECURSIVE tree(id, depth) AS ( \
                SELECT id, 0 FROM tree_entries WHERE id = ? \
                UNION ALL \
                SELECT e.id, t.depth + 1 FROM tree_entries e INNER JOIN tree t ON e.parent_id = t.id \
             ) SELECT e.* FROM tree_entries e INNER JOIN tree t ON e.id = t.id \
             WHERE t.depth > 0 ORDER BY t.depth ASC, e.name ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list descendants", e))
    }

    /// The chain from the top-level ancestor down to the entry itself.
    pub async fn find_ancestors(&self, id: EntryId) -> AppResult<Vec<TreeEntry>> {
        sqlx::query_as::<_, TreeEntry>(
            "WITH RECURSIVE chain(id, parent_id, depth) AS ( \
                SELECT id, parent_id, 0 FROM tree_entries WHERE id = ? \
                UNION ALL \
                SELECT e.id, e.parent_id, c.depth + 1 FROM tree_entries e \
                INNER JOIN chain c ON e.id = c.parent_id \
             ) SELECT e.* FROM tree_entries e INNER JOIN chain c ON e.id = c.id \
             ORDER BY c.depth DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find ancestors", e))
    }

    /// Total number of entries.
    pub async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tree_entries")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count entries", e))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_pool;

    async fn repo() -> EntryRepository {
        EntryRepository::new(test_pool().await)
    }

    fn meta(dev: i64, ino: i64, size: i64, mtime: f64) -> EntryMeta {
        EntryMeta {
            dev: Some(dev),
            ino: Some(ino),
            size,
            mtime,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = repo().await;
        let root = repo.create(&CreateEntry::dir(None, "pics")).await.unwrap();
        let file = repo
            .create(&CreateEntry::file(Some(root.id), "a.jpg"))
            .await
            .unwrap();

        assert!(root.is_root());
        assert!(file.dev.is_none() && file.size.is_none());
        assert_eq!(
            repo.find_by_name(Some(root.id), "a.jpg").await.unwrap(),
            Some(file.clone())
        );
        assert_eq!(repo.find_by_name(None, "pics").await.unwrap().unwrap().id, root.id);
        assert_eq!(repo.find_by_id(file.id).await.unwrap().unwrap().name, "a.jpg");
        assert_eq!(repo.list_children(Some(root.id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_sibling_rejected_without_mutation() {
        let repo = repo().await;
        let root = repo.create(&CreateEntry::dir(None, "pics")).await.unwrap();
        repo.create(&CreateEntry::file(Some(root.id), "a.jpg"))
            .await
            .unwrap();

        let err = repo
            .create(&CreateEntry::file(Some(root.id), "a.jpg"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_top_level_rejected() {
        let repo = repo().await;
        repo.create(&CreateEntry::dir(None, "pics")).await.unwrap();
        let err = repo.create(&CreateEntry::dir(None, "pics")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_invalid_names_rejected() {
        let repo = repo().await;
        for name in ["", "a/b", ".", ".."] {
            let err = repo.create(&CreateEntry::file(None, name)).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation);
        }
    }

    #[tokio::test]
    async fn test_update_meta_keeps_description_unless_recovered() {
        let repo = repo().await;
        let entry = repo.create(&CreateEntry::file(None, "a.jpg")).await.unwrap();
        repo.describe(entry.id, Some("holiday")).await.unwrap();

        repo.update_meta(entry.id, &meta(1, 1, 100, 1000.0), None)
            .await
            .unwrap();
        let stored = repo.find_by_id(entry.id).await.unwrap().unwrap();
        assert_eq!(stored.description.as_deref(), Some("holiday"));
        assert_eq!(stored.size, Some(100));
        assert!(stored.ctime >= entry.ctime);

        repo.update_meta(entry.id, &meta(1, 1, 100, 1000.0), Some("recovered"))
            .await
            .unwrap();
        let stored = repo.find_by_id(entry.id).await.unwrap().unwrap();
        assert_eq!(stored.description.as_deref(), Some("recovered"));
    }

    #[tokio::test]
    async fn test_describe_touches_ctime() {
        let repo = repo().await;
        let old = repo.create(&CreateEntry::file(None, "old")).await.unwrap();
        let newer = repo.create(&CreateEntry::file(None, "newer")).await.unwrap();
        repo.update_meta(old.id, &meta(1, 7, 10, 5.0), None).await.unwrap();
        repo.update_meta(newer.id, &meta(1, 7, 10, 5.0), None).await.unwrap();
        let before = repo.find_by_id(old.id).await.unwrap().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let described = repo.describe(old.id, Some("kept")).await.unwrap();

        assert!(described.ctime > before.ctime);
        let found = repo.match_dev_ino(1, 7, None).await.unwrap().unwrap();
        assert_eq!(found.id, old.id);
    }

    #[tokio::test]
    async fn test_match_dev_ino_prefers_most_recent_and_excludes() {
        let repo = repo().await;
        let old = repo.create(&CreateEntry::file(None, "old")).await.unwrap();
        let newer = repo.create(&CreateEntry::file(None, "newer")).await.unwrap();
        repo.update_meta(old.id, &meta(1, 7, 10, 5.0), None).await.unwrap();
        repo.update_meta(newer.id, &meta(1, 7, 10, 5.0), None).await.unwrap();

        let found = repo.match_dev_ino(1, 7, None).await.unwrap().unwrap();
        assert_eq!(found.id, newer.id);

        let found = repo.match_dev_ino(1, 7, Some(newer.id)).await.unwrap().unwrap();
        assert_eq!(found.id, old.id);

        assert!(repo.match_dev_ino(1, 8, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_match_name_size_mtime() {
        let repo = repo().await;
        let dir = repo.create(&CreateEntry::dir(None, "d")).await.unwrap();
        let entry = repo
            .create(&CreateEntry::file(Some(dir.id), "a.jpg"))
            .await
            .unwrap();
        repo.update_meta(entry.id, &meta(3, 4, 100, 1000.5), None)
            .await
            .unwrap();

        let found = repo
            .match_name_size_mtime("a.jpg", 100, 1000.5, None)
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, entry.id);
        assert!(repo
            .match_name_size_mtime("a.jpg", 101, 1000.5, None)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_move_rename_and_conflict() {
        let repo = repo().await;
        let a = repo.create(&CreateEntry::dir(None, "a")).await.unwrap();
        let b = repo.create(&CreateEntry::dir(None, "b")).await.unwrap();
        let f = repo.create(&CreateEntry::file(Some(a.id), "x")).await.unwrap();
        repo.create(&CreateEntry::file(Some(b.id), "x")).await.unwrap();

        let err = repo.move_entry(f.id, Some(b.id)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let moved = repo.move_rename(f.id, Some(b.id), "y").await.unwrap();
        assert_eq!(moved.parent_id, Some(b.id));
        assert_eq!(moved.name, "y");

        let renamed = repo.rename(f.id, "z").await.unwrap();
        assert_eq!(renamed.name, "z");
    }

    #[tokio::test]
    async fn test_max_child_name() {
        let repo = repo().await;
        let dir = repo.create(&CreateEntry::dir(None, "bin")).await.unwrap();
        assert!(repo.max_child_name(dir.id).await.unwrap().is_none());
        for name in ["aaaaab", "aaaaaa", "zzzzzzaaaaaa", "zzzzzz"] {
            repo.create(&CreateEntry::dir(Some(dir.id), name)).await.unwrap();
        }
        assert_eq!(
            repo.max_child_name(dir.id).await.unwrap().as_deref(),
            Some("zzzzzzaaaaaa")
        );
    }

    #[tokio::test]
    async fn test_descendants_ancestors_and_cascade_delete() {
        let repo = repo().await;
        let root = repo.create(&CreateEntry::dir(None, "r")).await.unwrap();
        let sub = repo.create(&CreateEntry::dir(Some(root.id), "s")).await.unwrap();
        let leaf = repo.create(&CreateEntry::file(Some(sub.id), "f")).await.unwrap();

        let names: Vec<String> = repo
            .find_descendants(root.id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["s", "f"]);

        let chain: Vec<String> = repo
            .find_ancestors(leaf.id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(chain, vec!["r", "s", "f"]);

        assert!(repo.delete(root.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_or_create_dir_reuses() {
        let repo = repo().await;
        let first = repo.get_or_create_dir(None, "<recycle>").await.unwrap();
        let second = repo.get_or_create_dir(None, "<recycle>").await.unwrap();
        assert_eq!(first.id, second.id);

        repo.create(&CreateEntry::file(None, "plain")).await.unwrap();
        let err = repo.get_or_create_dir(None, "plain").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }
}
