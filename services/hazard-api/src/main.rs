//! Hazard API Server
//!
//! Serves top-N ranked municipalities from the BMSB spread simulations as
//! GeoJSON.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use hazard_api::{build_router, AppState};

/// Hazard API Server
#[derive(Parser, Debug)]
#[command(name = "hazard-api")]
#[command(about = "Ranked BMSB spread simulation results as GeoJSON")]
struct Args {
    /// Listen address; overrides --port when set
    #[arg(short, long, env = "HAZARD_LISTEN_ADDR")]
    listen: Option<String>,

    /// Port to listen on (all interfaces)
    #[arg(short, long, default_value_t = 8080, env = "PORT")]
    port: u16,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "HAZARD_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

impl Args {
    fn listen_addr(&self) -> Result<SocketAddr> {
        match &self.listen {
            Some(addr) => addr
                .parse()
                .with_context(|| format!("Invalid listen address: {}", addr)),
            None => Ok(SocketAddr::from(([0, 0, 0, 0], self.port))),
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
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
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting Hazard API server");

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let state = Arc::new(
        AppState::from_env()
            .context("Failed to initialize application state")?
            .with_prometheus(prometheus_handle),
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive());

    let addr = args.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Hazard API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
