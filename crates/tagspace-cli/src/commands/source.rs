//! Runtime mount source commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use tagspace_core::error::AppError;
use tagspace_service::ServiceContext;

/// Arguments for source commands
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Source subcommand
    #[command(subcommand)]
    pub command: SourceCommand,
}

/// Source subcommands
#[derive(Debug, Subcommand)]
pub enum SourceCommand {
    /// Register a directory as a mount
    Add {
        /// Virtual name at the top of the tree
        name: String,
        /// Absolute real path
        path: String,
    },
    /// List effective mounts
    Ls,
    /// Unregister a source (indexed entries are kept)
    Rm {
        /// Virtual name
        name: String,
    },
}

/// Mount display row
#[derive(Debug, Serialize, Tabled)]
struct MountRow {
    /// Virtual name
    name: String,
    /// Real path
    real_path: String,
    /// Where the mount is defined
    origin: &'static str,
}

/// Execute source commands
pub async fn execute(
    args: &SourceArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (db, ctx) = super::open_context(&config).await?;
    let result = run(args, &ctx, format).await;
    db.close().await;
    result
}

async fn run(args: &SourceArgs, ctx: &ServiceContext, format: OutputFormat) -> Result<(), AppError> {
    let mounts = &ctx.mount_service;

    match &args.command {
        SourceCommand::Add { name, path } => {
            let source = mounts.add_source(name, path).await?;
            output::print_success(&format!(
                "Source '{}' registered at {}",
                source.name, source.real_path
            ));
        }
        SourceCommand::Ls => {
            let rows: Vec<MountRow> = mounts
                .effective_mounts()
                .await?
                .into_iter()
                .map(|m| {
                    let origin = if mounts
                        .configured()
                        .iter()
                        .any(|c| c.virtual_name == m.virtual_name)
                    {
                        "config"
                    } else {
                        "source"
                    };
                    MountRow {
                        name: m.virtual_name,
                        real_path: m.real_path,
                        origin,
                    }
                })
                .collect();
            output::print_list(&rows, format);
        }
        SourceCommand::Rm { name } => {
            mounts.remove_source(name).await?;
            output::print_success(&format!("Source '{name}' removed"));
        }
    }

    Ok(())
}
