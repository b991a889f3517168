//! hw-reader - Holy Writings prayer reader and matching tool
//!
//! Browses the `writings` table of the public DoltHub database, keeps a
//! local text cache and favorites in SQLite, and collects curation
//! proposals for hand-off to the maintainers.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hw_common::cache::{warm_english_prayers, BACKGROUND_CACHE_DELAY};
use hw_common::config::{CliOverrides, Settings};
use hw_common::{DoltHubGateway, KeyedStore, QueryGateway, SqliteStore};
use hw_reader::{build_router, AppState};

/// Background warm-up waits this long after startup
const WARMUP_START_DELAY: std::time::Duration = std::time::Duration::from_secs(3);

/// Command-line arguments for hw-reader
#[derive(Parser, Debug)]
#[command(name = "hw-reader")]
#[command(about = "Holy Writings prayer reader")]
#[command(version)]
struct Args {
    /// Folder holding the local store
    #[arg(short, long, env = "HW_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "HW_PORT")]
    port: Option<u16>,

    /// DoltHub SQL API base URL
    #[arg(long, env = "HW_API_BASE")]
    api_base: Option<String>,

    /// Language for language display names
    #[arg(long, env = "HW_UI_LANGUAGE")]
    ui_language: Option<String>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl From<Args> for CliOverrides {
    fn from(args: Args) -> Self {
        CliOverrides {
            root_folder: args.root_folder,
            port: args.port,
            api_base: args.api_base,
            ui_language: args.ui_language,
            config_file: args.config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: CliOverrides = Args::parse().into();
    let settings = Settings::load(&cli);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Holy Writings reader (hw-reader) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Root folder: {}", settings.root_folder.display());
    info!("Query API: {}", settings.api_base);

    std::fs::create_dir_all(&settings.root_folder)
        .with_context(|| format!("Failed to create root folder {}", settings.root_folder.display()))?;

    let db_path = settings.database_path();
    let store: Arc<dyn KeyedStore> = match SqliteStore::open(&db_path).await {
        Ok(store) => {
            info!("✓ Opened local store at {}", db_path.display());
            Arc::new(store)
        }
        Err(e) => {
            error!("Failed to open local store: {}", e);
            return Err(e.into());
        }
    };
    let gateway: Arc<dyn QueryGateway> =
        Arc::new(DoltHubGateway::new(settings.api_base.clone()).context("Failed to build query client")?);

    let state = AppState::new(store.clone(), gateway.clone(), &settings);

    let prayers = state.prayers.clone();
    tokio::spawn(async move {
        tokio::time::sleep(WARMUP_START_DELAY).await;
        let cached = warm_english_prayers(store.as_ref(), gateway.as_ref(), &prayers, BACKGROUND_CACHE_DELAY).await;
        info!(cached, "Background cache warm-up finished");
    });

    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], settings.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("hw-reader listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
