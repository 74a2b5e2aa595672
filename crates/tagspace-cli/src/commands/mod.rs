//! CLI command definitions and dispatch.

pub mod category;
pub mod config;
pub mod entry;
pub mod migrate;
pub mod recycle;
pub mod source;
pub mod sync;
pub mod tag;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use tagspace_core::config::AppConfig;
use tagspace_core::error::AppError;
use tagspace_core::types::EntryId;
use tagspace_database::DatabasePool;
use tagspace_database::migration::run_migrations;
use tagspace_service::ServiceContext;
use tagspace_storage::LocalFileSystem;

/// Tagspace: tag and describe files in a mirrored directory tree
#[derive(Debug, Parser)]
#[command(name = "tagspace", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile mounts with the tree store
    Sync(sync::SyncArgs),
    /// Tree entry management
    Entry(entry::EntryArgs),
    /// Tag management
    Tag(tag::TagArgs),
    /// Category management
    Category(category::CategoryArgs),
    /// Runtime mount sources
    Source(source::SourceArgs),
    /// Recycle bin inspection
    Recycle(recycle::RecycleArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Sync(args) => sync::execute(args, &self.config, self.format).await,
            Commands::Entry(args) => entry::execute(args, &self.config, self.format).await,
            Commands::Tag(args) => tag::execute(args, &self.config, self.format).await,
            Commands::Category(args) => category::execute(args, &self.config, self.format).await,
            Commands::Source(args) => source::execute(args, &self.config, self.format).await,
            Commands::Recycle(args) => recycle::execute(args, &self.config, self.format).await,
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: open the store, apply migrations and build the services
pub async fn open_context(config: &AppConfig) -> Result<(DatabasePool, ServiceContext), AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    run_migrations(db.pool()).await?;
    let ctx = ServiceContext::new(&db, config, Arc::new(LocalFileSystem::new()));
    Ok((db, ctx))
}

/// Helper: resolve an entry given as a UUID or a virtual path
pub async fn resolve_entry(ctx: &ServiceContext, reference: &str) -> Result<EntryId, AppError> {
    if let Ok(id) = reference.parse::<EntryId>() {
        return Ok(id);
    }
    let resolver = ctx.path_resolver().await?;
    resolver
        .find_by_virtual_path(reference)
        .await?
        .map(|e| e.id)
        .ok_or_else(|| AppError::not_found(format!("No entry at '{reference}'")))
}

/// Helper: resolve an optional directory reference; `None` is the top level
pub async fn resolve_parent(
    ctx: &ServiceContext,
    reference: Option<&str>,
) -> Result<Option<EntryId>, AppError> {
    match reference {
        Some(r) if !r.trim_matches('/').is_empty() => Ok(Some(resolve_entry(ctx, r).await?)),
        _ => Ok(None),
    }
}
