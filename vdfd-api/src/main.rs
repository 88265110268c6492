//! vdfd-api - Virtual Driving for Dollars lead service
//!
//! Serves the lead and route API over a local SQLite store, mirroring
//! writes to a remote document store when one is configured.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vdfd_api::{build_router, AppState};
use vdfd_common::config;
use vdfd_common::store::SqliteStore;
use vdfd_common::sync::{HttpRemoteStore, Reconciler, RemoteStore};

/// Command-line arguments for vdfd-api
#[derive(Parser, Debug)]
#[command(name = "vdfd-api")]
#[command(about = "Lead tagging and route planning service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "VDFD_PORT")]
    port: Option<u16>,

    /// Folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "VDFD_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "VDFD_BIND")]
    bind: std::net::IpAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let toml_config = config::load_toml_config(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    let level = &toml_config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("vdfd_api={level},vdfd_common={level},tower_http={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting vdfd-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Config: {}", config_path.display());

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let db_path = config::database_path(&root_folder, &toml_config);
    info!("Database: {}", db_path.display());

    let store = SqliteStore::open(&db_path)
        .await
        .context("Failed to open database")?;

    let remote: Option<Arc<dyn RemoteStore>> = match &toml_config.remote {
        Some(remote) => {
            info!("Mirroring writes to {}", remote.base_url);
            Some(Arc::new(HttpRemoteStore::from_config(remote)))
        }
        None => {
            warn!("No remote configured, records are stored locally only");
            None
        }
    };

    let state = AppState::new(Arc::new(store), Reconciler::new(remote));
    let app = build_router(state);

    let port = args.port.unwrap_or(toml_config.port);
    let addr = SocketAddr::new(args.bind, port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("vdfd-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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
