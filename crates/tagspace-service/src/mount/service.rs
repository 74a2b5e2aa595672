//! Mount registry combining configuration with persisted sources.

use std::sync::Arc;

use tracing::{info, warn};

use tagspace_core::config::{MountConfig, validate_mounts};
use tagspace_core::error::AppError;
use tagspace_core::result::AppResult;
use tagspace_database::repositories::SourceRepository;
use tagspace_entity::source::Source;

/// Resolves the set of mounts a sync run should cover.
#[derive(Debug, Clone)]
pub struct MountService {
    /// Mounts from the configuration file.
    configured: Vec<MountConfig>,
    /// Sources registered at runtime.
    sources: Arc<SourceRepository>,
    /// Reserved top-level name.
    recycle_dir_name: String,
}

impl MountService {
    /// Creates a new mount service.
    pub fn new(
        configured: Vec<MountConfig>,
        sources: Arc<SourceRepository>,
        recycle_dir_name: impl Into<String>,
    ) -> Self {
        Self {
            configured,
            sources,
            recycle_dir_name: recycle_dir_name.into(),
        }
    }

    /// Mounts from the configuration file.
    pub fn configured(&self) -> &[MountConfig] {
        &self.configured
    }

    /// Configured mounts followed by persisted sources.
    ///
    /// A persisted source whose name is also configured is ignored.
    pub async fn effective_mounts(&self) -> AppResult<Vec<MountConfig>> {
        let mut mounts = self.configured.clone();
        for source in self.sources.list().await? {
            if mounts.iter().any(|m| m.virtual_name == source.name) {
                warn!(
                    name = %source.name,
                    real_path = %source.real_path,
                    "Persisted source shadowed by configured mount"
                );
                continue;
            }
            mounts.push(source.to_mount());
        }
        validate_mounts(&mounts, &self.recycle_dir_name)?;
        Ok(mounts)
    }

    /// Finds one effective mount by virtual name.
    pub async fn mount(&self, name: &str) -> AppResult<MountConfig> {
        self.effective_mounts()
            .await?
            .into_iter()
            .find(|m| m.virtual_name == name)
            .ok_or_else(|| AppError::not_found(format!("No mount named '{name}'")))
    }

    /// Registers a source, or repoints an existing one.
    pub async fn add_source(&self, name: &str, real_path: &str) -> AppResult<Source> {
        let candidate = MountConfig::new(real_path, name);
        validate_mounts(std::slice::from_ref(&candidate), &self.recycle_dir_name)?;
        if self.configured.iter().any(|m| m.virtual_name == name) {
            return Err(AppError::conflict(format!(
                "Mount '{name}' is defined in the configuration"
            )));
        }

        let source = self.sources.upsert(name, real_path).await?;
        info!(name = %source.name, real_path = %source.real_path, "Registered source");
        Ok(source)
    }

    /// Unregisters a source. The indexed tree stays as it is.
    pub async fn remove_source(&self, name: &str) -> AppResult<()> {
        if !self.sources.delete(name).await? {
            return Err(AppError::not_found(format!("Source '{name}' not found")));
        }
        info!(name = %name, "Removed source");
        Ok(())
    }

    /// Persisted sources in registration order.
    pub async fn list_sources(&self) -> AppResult<Vec<Source>> {
        self.sources.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagspace_core::error::ErrorKind;
    use tagspace_database::DatabasePool;
    use tagspace_database::migration::run_migrations;

    async fn service(configured: Vec<MountConfig>) -> MountService {
        let db = DatabasePool::in_memory().await.unwrap();
        run_migrations(db.pool()).await.unwrap();
        MountService::new(
            configured,
            Arc::new(SourceRepository::new(db.into_pool())),
            "<recycle>",
        )
    }

    #[tokio::test]
    async fn test_configured_mounts_come_first() {
        let service = service(vec![MountConfig::new("/data/pics", "pics")]).await;
        service.add_source("docs", "/data/docs").await.unwrap();

        let mounts = service.effective_mounts().await.unwrap();
        let names: Vec<&str> = mounts.iter().map(|m| m.virtual_name.as_str()).collect();
        assert_eq!(names, vec!["pics", "docs"]);
        assert_eq!(
            service.mount("docs").await.unwrap().real_path,
            "/data/docs"
        );
    }

    #[tokio::test]
    async fn test_configured_name_cannot_be_registered() {
        let service = service(vec![MountConfig::new("/data/pics", "pics")]).await;
        let err = service.add_source("pics", "/other").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_invalid_sources_rejected() {
        let service = service(Vec::new()).await;
        assert_eq!(
            service.add_source("rel", "relative").await.unwrap_err().kind,
            ErrorKind::Configuration
        );
        assert_eq!(
            service.add_source("<recycle>", "/x").await.unwrap_err().kind,
            ErrorKind::Configuration
        );
    }

    #[tokio::test]
    async fn test_remove_source() {
        let service = service(Vec::new()).await;
        service.add_source("docs", "/data/docs").await.unwrap();
        service.remove_source("docs").await.unwrap();
        assert!(service.list_sources().await.unwrap().is_empty());
        assert_eq!(
            service.remove_source("docs").await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }
}
