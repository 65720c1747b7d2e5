//! STAC explorer API service.
//!
//! Serves collections, the layer list and per-layer tile sources over JSON.

use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use explorer_api::{build_router, AppState, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "explorer-api")]
#[command(about = "STAC forecast explorer API server")]
struct Args {
    /// Listen address
    #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Directory containing collections/*.yaml
    #[arg(long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Resolution cache entries per layer
    #[arg(long, env = "RESOLUTION_CACHE_CAPACITY", default_value_t = 256)]
    cache_capacity: usize,

    /// STAC search request timeout in seconds
    #[arg(long, env = "SEARCH_TIMEOUT_SECS", default_value_t = 30)]
    search_timeout_secs: u64,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Prometheus metrics exporter initialized");
    info!("Starting STAC explorer API server");

    let config = ServiceConfig {
        config_dir: args.config_dir,
        cache_capacity: args.cache_capacity,
        search_timeout: Duration::from_secs(args.search_timeout_secs),
    };
    let state = Arc::new(AppState::new(&config)?);

    let app = build_router(state, prometheus_handle);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
