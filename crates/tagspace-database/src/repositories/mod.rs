//! Repository implementations for all Tagspace tables.

pub mod category;
pub mod entry;
pub mod entry_tag;
pub mod source;
pub mod tag;

pub use category::CategoryRepository;
pub use entry::EntryRepository;
pub use entry_tag::EntryTagRepository;
pub use source::SourceRepository;
pub use tag::TagRepository;

/// In-memory pool with all migrations applied.
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let db = crate::DatabasePool::in_memory().await.unwrap();
    crate::migration::run_migrations(db.pool()).await.unwrap();
    db.into_pool()
}
