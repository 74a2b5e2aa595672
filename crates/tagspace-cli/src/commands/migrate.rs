//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use tagspace_core::error::AppError;
use tagspace_database::DatabasePool;
use tagspace_database::migration::run_migrations;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check that the store is reachable
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = DatabasePool::connect(&config.database).await?;

    let result = match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            run_migrations(db.pool()).await.map(|()| {
                output::print_success("All migrations applied successfully.");
            })
        }
        MigrateCommand::Check => db.health_check().await.map(|healthy| {
            if healthy {
                output::print_success(&format!("Store '{}' is reachable", config.database.url));
            } else {
                output::print_warning(&format!("Store '{}' did not answer", config.database.url));
            }
        }),
    };

    db.close().await;
    result
}
