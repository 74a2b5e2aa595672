//! Tagspace sync daemon.
//!
//! Loads the configuration, opens the tree store and reconciles every
//! mount, once or on a fixed interval until interrupted.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing_subscriber::{EnvFilter, fmt};

use tagspace_core::config::AppConfig;
use tagspace_core::error::AppError;
use tagspace_database::DatabasePool;
use tagspace_service::{ServiceContext, TracingObserver};
use tagspace_storage::LocalFileSystem;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Daemon error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("TAGSPACE_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        "compact" => {
            fmt().compact().with_env_filter(filter).with_target(false).init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main daemon run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Tagspace v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    tagspace_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Services ─────────────────────────────────────────
    let ctx = ServiceContext::new(&db, &config, Arc::new(LocalFileSystem::new()));
    let mounts = ctx.mount_service.effective_mounts().await?;
    if mounts.is_empty() {
        tracing::warn!("No mounts configured; nothing to sync");
    }
    for mount in &mounts {
        tracing::info!(mount = %mount.virtual_name, real_path = %mount.real_path, "Mount");
    }

    // ── Step 3: Sync until done or interrupted ───────────────────
    let outcome = serve(&ctx, config.sync.interval_seconds).await;

    // ── Step 4: Close the store ──────────────────────────────────
    db.close().await;
    tracing::info!("Tagspace shut down");
    outcome
}

/// Run one pass, or repeat every `interval_seconds` until a shutdown signal.
async fn serve(ctx: &ServiceContext, interval_seconds: u64) -> Result<(), AppError> {
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    if interval_seconds == 0 {
        tokio::select! {
            result = sync_once(ctx) => return result,
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received, abandoning sync");
                return Ok(());
            }
        }
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => break,
        }
        tokio::select! {
            result = sync_once(ctx) => result?,
            _ = &mut shutdown => break,
        }
    }

    tracing::info!("Shutdown signal received");
    Ok(())
}

async fn sync_once(ctx: &ServiceContext) -> Result<(), AppError> {
    let report = ctx.sync_all(&TracingObserver).await?;
    tracing::info!(
        processed = report.processed,
        added = report.added,
        changed = report.changed,
        deleted = report.deleted,
        recovered = report.recovered,
        stat_failures = report.stat_failures,
        dir_failures = report.dir_failures,
        duration_ms = report.duration.as_millis() as u64,
        "Sync pass complete"
    );
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
