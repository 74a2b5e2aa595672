//! Mount reconciliation command.

use clap::Args;

use crate::output::{self, OutputFormat};
use tagspace_core::error::AppError;
use tagspace_service::{ServiceContext, SyncReport, TracingObserver};

/// Arguments for the sync command
#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Only sync the mount with this virtual name
    #[arg(short, long)]
    pub mount: Option<String>,
}

/// Execute the sync command
pub async fn execute(args: &SyncArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (db, ctx) = super::open_context(&config).await?;
    let result = run(args, &ctx, format).await;
    db.close().await;
    result
}

async fn run(args: &SyncArgs, ctx: &ServiceContext, format: OutputFormat) -> Result<(), AppError> {
    let observer = TracingObserver;
    let report = match &args.mount {
        Some(name) => ctx.sync_mount(name, &observer).await?,
        None => ctx.sync_all(&observer).await?,
    };

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &SyncReport) {
    output::print_success("Sync complete");
    output::print_kv("Processed", &report.processed.to_string());
    output::print_kv("Added", &report.added.to_string());
    output::print_kv("Changed", &report.changed.to_string());
    output::print_kv("Recycled", &report.deleted.to_string());
    output::print_kv("Recovered", &report.recovered.to_string());
    output::print_kv("Duration", &format!("{:.2?}", report.duration));
    if report.has_failures() {
        output::print_warning(&format!(
            "{} stat and {} directory failures, see log for paths",
            report.stat_failures, report.dir_failures
        ));
    }
}
