//! ComplyHub Server: multi-tenant compliance management
//!
//! Main entry point: loads configuration, prepares the database and
//! starts the HTTP server.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use complyhub_core::config::AppConfig;
use complyhub_database::DatabasePool;
use complyhub_database::migration::run_migrations;

/// Command-line arguments for the server binary.
#[derive(Debug, Parser)]
#[command(name = "complyhub-server", version, about = "ComplyHub API server")]
struct Args {
    /// Configuration overlay to load from `config/{env}.toml`.
    #[arg(long, env = "COMPLYHUB_ENV", default_value = "development")]
    env: String,

    /// Apply database migrations and exit.
    #[arg(long)]
    migrate_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // ── Step 1: Configuration ────────────────────────────────────
    let config = AppConfig::load(&args.env).context("Failed to load configuration")?;

    // ── Step 2: Logging ──────────────────────────────────────────
    init_logging(&config);
    tracing::info!(
        env = %args.env,
        "Starting ComplyHub v{}",
        env!("CARGO_PKG_VERSION")
    );

    // ── Step 3: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database)
        .await
        .context("Database connection failed")?;

    tracing::info!("Running database migrations...");
    run_migrations(db.pool()).await.context("Migration failed")?;
    tracing::info!("Database migrations complete");

    if args.migrate_only {
        db.close().await;
        return Ok(());
    }

    // ── Step 4: Serve ────────────────────────────────────────────
    let pool = db.into_pool();
    complyhub_api::run_server(config, pool.clone())
        .await
        .context("Server error")?;

    pool.close().await;
    Ok(())
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
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
