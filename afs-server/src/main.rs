//! afs-server - Amendment feedback service entry point
//!
//! Startup order: CLI, TOML config, tracing, root folder, database, pipeline,
//! HTTP server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use afs_common::config::{
    ensure_directory_exists, resolve_root_folder, ConfigSource, TomlConfig,
};
use afs_common::db::init_database;
use afs_server::{build_router, AppState, FeedbackPipeline};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for afs-server
#[derive(Parser, Debug)]
#[command(name = "afs-server")]
#[command(about = "Public comment intake and analysis for amendments")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder holding the database (overrides AFS_ROOT_FOLDER and the config file)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "AFS_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "AFS_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_source) = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    // RUST_LOG takes precedence over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Amendment Feedback Service (afs-server) v{}",
        env!("CARGO_PKG_VERSION")
    );
    match &config_source {
        ConfigSource::File(path) => info!("Configuration: {}", path.display()),
        ConfigSource::Missing(path) => warn!(
            "Config file {} not found, using built-in defaults",
            path.display()
        ),
        ConfigSource::Defaults => info!("Configuration: built-in defaults"),
    }

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    ensure_directory_exists(&root_folder)?;
    info!("Root folder: {}", root_folder.display());

    let db_path = config.database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let pipeline = FeedbackPipeline::from_config(pool.clone(), &config.analysis)
        .context("Failed to build analysis pipeline")?;

    let state = AppState::new(pool, pipeline).with_request_timeout(Duration::from_secs(
        config.server.request_timeout_secs,
    ));
    let app = build_router(state);

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("afs-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
