//! Gridpool Server
//!
//! A self-hostable server for running football squares pools.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use gridpool_core::db;
use gridpool_core::events::audit_event_channel;
use gridpool_core::processors::{AuditWriter, AutoLockSweeper};
use gridpool_sdk::token::SessionKey;
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Gridpool - Self-hostable football squares pool server
#[derive(Parser, Debug)]
#[command(name = "gridpool-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./gridpool-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations, then exit
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting gridpool-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let listen_addr = loaded_config.listen;
    let sweep_interval = Duration::from_secs(loaded_config.sweep.interval_secs);

    // Build the session verification key before touching the database,
    // so a bad secret fails at boot
    let session_key = SessionKey::new(loaded_config.session_secret.as_bytes()).map_err(|e| {
        tracing::error!("Invalid session secret: {}", e);
        e
    })?;

    // Convert to shared config for SIGHUP reloads
    let shared_config = loaded_config.into_shared();

    // Create database connection pool (GRIDPOOL_DB, or a local file by default)
    let database_url = get_database_url();
    tracing::info!("Connecting to database...");
    let db_pool = db::connect(&database_url).await.map_err(|e| {
        tracing::error!("Failed to connect to database: {}", e);
        e
    })?;
    tracing::info!("Database connection established");

    // Run migrations; the schema is embedded in the binary
    db::MIGRATOR.run(&db_pool).await.map_err(|e| {
        tracing::error!("Failed to run migrations: {}", e);
        e
    })?;
    if args.migrate {
        tracing::info!("Migrations completed, exiting (--migrate)");
        db_pool.close().await;
        return Ok(());
    }

    // Wire the audit channel and background processors
    let (audit_tx, audit_rx) = audit_event_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let audit_writer = AuditWriter::new(db_pool.clone(), audit_rx, shutdown_rx.clone());
    let audit_writer_handle = tokio::spawn(audit_writer.run());

    let sweeper = AutoLockSweeper::new(
        db_pool.clone(),
        sweep_interval,
        audit_tx.clone(),
        shutdown_rx,
    );
    let sweeper_handle = tokio::spawn(sweeper.run());

    // Create application state
    let state = AppState::new(db_pool.clone(), session_key, shared_config, audit_tx);

    // Spawn config reload handler (listens for SIGHUP)
    let shutdown_notify = spawn_config_reload_handler(state.clone(), config_loader);

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Stop the background processors and wait for them to finish
    if shutdown_tx.send(true).is_err() {
        tracing::warn!("Processors already stopped");
    }
    let _ = audit_writer_handle.await;
    let _ = sweeper_handle.await;

    // Signal the config reload handler to stop
    shutdown_notify.notify_one();

    // Close database connections gracefully
    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
