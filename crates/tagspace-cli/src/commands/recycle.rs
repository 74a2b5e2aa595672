//! Recycle bin commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use tagspace_core::error::AppError;
use tagspace_service::ServiceContext;

/// Arguments for recycle commands
#[derive(Debug, Args)]
pub struct RecycleArgs {
    /// Recycle subcommand
    #[command(subcommand)]
    pub command: RecycleCommand,
}

/// Recycle subcommands
#[derive(Debug, Subcommand)]
pub enum RecycleCommand {
    /// List recycled entries by container
    Ls,
}

/// Recycled entry display row
#[derive(Debug, Serialize, Tabled)]
struct RecycledRow {
    /// Generated container
    slot: String,
    /// Entry ID
    id: String,
    /// Original name
    name: String,
    /// Kind
    kind: &'static str,
    /// Recycled at
    recycled_at: String,
}

/// Execute recycle commands
pub async fn execute(
    args: &RecycleArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (db, ctx) = super::open_context(&config).await?;
    let result = run(args, &ctx, format).await;
    db.close().await;
    result
}

async fn run(args: &RecycleArgs, ctx: &ServiceContext, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        RecycleCommand::Ls => {
            let slots = ctx.recycler.list_slots().await?;
            if format == OutputFormat::Json {
                output::print_json(&slots);
                return Ok(());
            }
            let rows: Vec<RecycledRow> = slots
                .iter()
                .flat_map(|s| {
                    s.contents.iter().map(|e| RecycledRow {
                        slot: s.slot.name.clone(),
                        id: e.id.to_string(),
                        name: e.name.clone(),
                        kind: if e.is_dir { "dir" } else { "file" },
                        recycled_at: s.slot.ctime.format("%Y-%m-%d %H:%M:%S").to_string(),
                    })
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
