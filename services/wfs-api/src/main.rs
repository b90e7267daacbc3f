//! WFS API Server
//!
//! OGC Web Feature Service 2.0 GetFeature over a local feature database.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use wfs_api::config::WfsConfig;
use wfs_api::state::AppState;

/// WFS API Server
#[derive(Parser, Debug)]
#[command(name = "wfs-api")]
#[command(about = "OGC Web Feature Service (GetFeature) server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8084", env = "WFS_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "WFS_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// SQLite / GeoPackage file holding the feature view
    #[arg(short, long, env = "WFS_DATABASE")]
    database: PathBuf,

    /// Optional YAML config file
    #[arg(short, long, env = "WFS_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Starting WFS API server");

    let config = WfsConfig::load(args.config.as_deref())?;
    let state = AppState::new(&args.database, config, args.listen.clone())
        .await
        .context("Failed to initialize application state")?
        .with_prometheus(prometheus_handle);

    let app = wfs_api::router(Arc::new(state));

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!(address = %addr, database = %args.database.display(), "WFS API listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind")?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
