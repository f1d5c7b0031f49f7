mod blob_manager;
mod config;
mod error;
mod handlers;
mod latency;
mod models;
mod reference;
mod routes;
mod storage;
mod views;

use blob_manager::BlobManager;
use config::Config;
use handlers::AppState;
use latency::LatencyProbe;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("No .env file loaded: {}", e);
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blob_gallery=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting blob gallery");
    tracing::info!("Storage type: {:?}", config.storage_type);

    // Initialize the storage client once; every request shares it
    let blobs = BlobManager::initialize(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize blob storage: {}", e))?;

    let latency = LatencyProbe::new(config.latency_targets.clone());
    tracing::info!("Latency probe targets: {}", latency.targets().len());

    let state = AppState {
        blobs: Arc::new(blobs),
        latency: Arc::new(latency),
    };

    let app = routes::build_router(state, config.max_upload_bytes);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
