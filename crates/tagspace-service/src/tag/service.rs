//! Tag and category management addressed by name.

use std::sync::Arc;

use tracing::info;

use tagspace_core::error::AppError;
use tagspace_core::result::AppResult;
use tagspace_core::types::{CategoryId, EntryId, TagId};
use tagspace_database::repositories::{
    CategoryRepository, EntryRepository, EntryTagRepository, TagRepository,
};
use tagspace_entity::entry::TreeEntry;
use tagspace_entity::tag::{Category, CreateCategory, CreateTag, Tag};

/// Manages tags, categories and their association with entries.
#[derive(Debug, Clone)]
pub struct TagService {
    /// Tag repository.
    tags: Arc<TagRepository>,
    /// Category repository.
    categories: Arc<CategoryRepository>,
    /// Entry-tag associations.
    links: Arc<EntryTagRepository>,
    /// Entry repository, for existence checks.
    entries: Arc<EntryRepository>,
}

fn clean_name<'a>(kind: &str, name: &'a str) -> AppResult<&'a str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation(format!("{kind} name cannot be empty")));
    }
    Ok(name)
}

impl TagService {
    /// Creates a new tag service.
    pub fn new(
        tags: Arc<TagRepository>,
        categories: Arc<CategoryRepository>,
        links: Arc<EntryTagRepository>,
        entries: Arc<EntryRepository>,
    ) -> Self {
        Self {
            tags,
            categories,
            links,
            entries,
        }
    }

    /// Creates a tag, optionally inside a named category.
    pub async fn create_tag(&self, name: &str, category: Option<&str>) -> AppResult<Tag> {
        let name = clean_name("Tag", name)?;
        let category_id = self.category_id(category).await?;
        let tag = self.tags.create(&CreateTag::named(name, category_id)).await?;
        info!(tag_id = %tag.id, name = %tag.name, "Created tag");
        Ok(tag)
    }

    /// Gets a tag by name.
    pub async fn tag(&self, name: &str) -> AppResult<Tag> {
        self.tags
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tag '{name}' not found")))
    }

    /// Lists all tags.
    pub async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        self.tags.list().await
    }

    /// Lists the tags of a category, or uncategorised tags for `None`.
    pub async fn list_tags_in(&self, category: Option<&str>) -> AppResult<Vec<Tag>> {
        let category_id = self.category_id(category).await?;
        self.tags.list_by_category(category_id).await
    }

    /// Renames a tag.
    pub async fn rename_tag(&self, name: &str, new_name: &str) -> AppResult<Tag> {
        let new_name = clean_name("Tag", new_name)?;
        let tag = self.tag(name).await?;
        self.tags.rename(tag.id, new_name).await
    }

    /// Moves a tag into another category, or out of any for `None`.
    pub async fn move_tag(&self, name: &str, category: Option<&str>) -> AppResult<Tag> {
        let tag = self.tag(name).await?;
        let category_id = self.category_id(category).await?;
        self.tags.set_category(tag.id, category_id).await
    }

    /// Sets a tag's display colours.
    pub async fn set_tag_colors(
        &self,
        name: &str,
        foreground: Option<&str>,
        background: Option<&str>,
    ) -> AppResult<Tag> {
        let tag = self.tag(name).await?;
        self.tags.set_colors(tag.id, foreground, background).await
    }

    /// Sets or clears a tag's description.
    pub async fn describe_tag(&self, name: &str, description: Option<&str>) -> AppResult<Tag> {
        let tag = self.tag(name).await?;
        self.tags.describe(tag.id, description).await
    }

    /// Deletes a tag and its entry associations.
    pub async fn delete_tag(&self, name: &str) -> AppResult<()> {
        let tag = self.tag(name).await?;
        self.tags.delete(tag.id).await?;
        info!(tag_id = %tag.id, name = %tag.name, "Deleted tag");
        Ok(())
    }

    /// Creates a category.
    pub async fn create_category(&self, name: &str) -> AppResult<Category> {
        let name = clean_name("Category", name)?;
        let category = self.categories.create(&CreateCategory::named(name)).await?;
        info!(category_id = %category.id, name = %category.name, "Created category");
        Ok(category)
    }

    /// Gets a category by name.
    pub async fn category(&self, name: &str) -> AppResult<Category> {
        self.categories
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category '{name}' not found")))
    }

    /// Lists all categories.
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.categories.list().await
    }

    /// Renames a category.
    pub async fn rename_category(&self, name: &str, new_name: &str) -> AppResult<Category> {
        let new_name = clean_name("Category", new_name)?;
        let category = self.category(name).await?;
        self.categories.rename(category.id, new_name).await
    }

    /// Sets a category's display colours.
    pub async fn set_category_colors(
        &self,
        name: &str,
        foreground: Option<&str>,
        background: Option<&str>,
    ) -> AppResult<Category> {
        let category = self.category(name).await?;
        self.categories
            .set_colors(category.id, foreground, background)
            .await
    }

    /// Sets or clears a category's description.
    pub async fn describe_category(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Category> {
        let category = self.category(name).await?;
        self.categories.describe(category.id, description).await
    }

    /// Deletes a category with all of its tags.
    pub async fn delete_category(&self, name: &str) -> AppResult<()> {
        let category = self.category(name).await?;
        self.categories.delete(category.id).await?;
        info!(category_id = %category.id, name = %category.name, "Deleted category");
        Ok(())
    }

    /// Attaches a tag to an entry. Already attached tags are left alone.
    pub async fn tag_entry(&self, entry_id: EntryId, tag: &str) -> AppResult<Tag> {
        self.require_entry(entry_id).await?;
        let tag = self.tag(tag).await?;
        self.links.add(entry_id, tag.id).await?;
        Ok(tag)
    }

    /// Detaches a tag from an entry. Returns whether it was attached.
    pub async fn untag_entry(&self, entry_id: EntryId, tag: &str) -> AppResult<bool> {
        let tag = self.tag(tag).await?;
        self.links.remove(entry_id, tag.id).await
    }

    /// Tags attached to an entry.
    pub async fn entry_tags(&self, entry_id: EntryId) -> AppResult<Vec<Tag>> {
        self.require_entry(entry_id).await?;
        self.links.list_tags(entry_id).await
    }

    /// Detaches every tag from an entry.
    pub async fn clear_entry_tags(&self, entry_id: EntryId) -> AppResult<u64> {
        self.require_entry(entry_id).await?;
        self.links.clear(entry_id).await
    }

    /// Replaces the tag set of an entry.
    pub async fn set_entry_tags(&self, entry_id: EntryId, tags: &[&str]) -> AppResult<Vec<Tag>> {
        self.require_entry(entry_id).await?;
        let mut ids: Vec<TagId> = Vec::with_capacity(tags.len());
        for name in tags {
            ids.push(self.tag(name).await?.id);
        }
        self.links.set(entry_id, &ids).await?;
        self.links.list_tags(entry_id).await
    }

    /// Entries carrying a tag.
    pub async fn tagged_entries(&self, tag: &str) -> AppResult<Vec<TreeEntry>> {
        let tag = self.tag(tag).await?;
        self.links.list_entries(tag.id).await
    }

    async fn category_id(&self, category: Option<&str>) -> AppResult<Option<CategoryId>> {
        match category {
            Some(name) => Ok(Some(self.category(name).await?.id)),
            None => Ok(None),
        }
    }

    async fn require_entry(&self, entry_id: EntryId) -> AppResult<()> {
        match self.entries.find_by_id(entry_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(format!("Entry {entry_id} not found"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagspace_core::error::ErrorKind;
    use tagspace_database::DatabasePool;
    use tagspace_database::migration::run_migrations;
    use tagspace_entity::entry::CreateEntry;

    async fn setup() -> (Arc<EntryRepository>, TagService) {
        let db = DatabasePool::in_memory().await.unwrap();
        run_migrations(db.pool()).await.unwrap();
        let pool = db.into_pool();
        let entries = Arc::new(EntryRepository::new(pool.clone()));
        let service = TagService::new(
            Arc::new(TagRepository::new(pool.clone())),
            Arc::new(CategoryRepository::new(pool.clone())),
            Arc::new(EntryTagRepository::new(pool)),
            entries.clone(),
        );
        (entries, service)
    }

    #[tokio::test]
    async fn test_tag_lifecycle() {
        let (_, service) = setup().await;
        service.create_category("places").await.unwrap();
        let tag = service.create_tag(" beach ", Some("places")).await.unwrap();
        assert_eq!(tag.name, "beach");
        assert!(tag.category_id.is_some());

        assert_eq!(service.list_tags_in(Some("places")).await.unwrap().len(), 1);
        assert!(service.list_tags_in(None).await.unwrap().is_empty());

        let moved = service.move_tag("beach", None).await.unwrap();
        assert!(moved.category_id.is_none());
        let renamed = service.rename_tag("beach", "coast").await.unwrap();
        assert_eq!(renamed.name, "coast");
        let colored = service
            .set_tag_colors("coast", Some("#fff"), Some("#00f"))
            .await
            .unwrap();
        assert_eq!(colored.background.as_deref(), Some("#00f"));

        service.delete_tag("coast").await.unwrap();
        assert_eq!(
            service.tag("coast").await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_duplicate_and_blank_names() {
        let (_, service) = setup().await;
        service.create_tag("a", None).await.unwrap();
        assert_eq!(
            service.create_tag("a", None).await.unwrap_err().kind,
            ErrorKind::Conflict
        );
        assert_eq!(
            service.create_tag("  ", None).await.unwrap_err().kind,
            ErrorKind::Validation
        );
        assert_eq!(
            service.create_tag("b", Some("missing")).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_entry_tagging() {
        let (entries, service) = setup().await;
        let entry = entries.create(&CreateEntry::file(None, "a.jpg")).await.unwrap();
        service.create_tag("x", None).await.unwrap();
        service.create_tag("y", None).await.unwrap();

        service.tag_entry(entry.id, "x").await.unwrap();
        service.tag_entry(entry.id, "x").await.unwrap();
        assert_eq!(service.entry_tags(entry.id).await.unwrap().len(), 1);

        let set = service.set_entry_tags(entry.id, &["y"]).await.unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].name, "y");
        assert_eq!(service.tagged_entries("y").await.unwrap()[0].id, entry.id);

        assert!(!service.untag_entry(entry.id, "x").await.unwrap());
        assert_eq!(service.clear_entry_tags(entry.id).await.unwrap(), 1);
        assert_eq!(
            service.tag_entry(EntryId::new(), "x").await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_category_delete_removes_its_tags() {
        let (_, service) = setup().await;
        service.create_category("people").await.unwrap();
        service.create_tag("alice", Some("people")).await.unwrap();
        service.delete_category("people").await.unwrap();
        assert!(service.list_tags().await.unwrap().is_empty());
    }
}
