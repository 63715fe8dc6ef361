//! drop-server: HTTP backend answering entitlement queries for a merkle drop.
//!
//! Loads the airdrop file once at startup, builds the Merkle tree, and serves
//! `GET /entitlement/{address}` with the decayed balance and proof.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

mod config;
mod routes;

use config::Config;
use drop_service::{AirdropSnapshot, SnapshotHandle, load_airdrop_file};

/// Shared application state passed to every Axum handler.
#[derive(Clone)]
pub struct AppState {
    /// Published snapshot; handlers never mutate it.
    pub snapshots: Arc<SnapshotHandle>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("Failed to load server configuration")?;

    info!(
        airdrop_file = %config.airdrop_file.display(),
        decay_start = config.decay_start,
        decay_duration = config.decay_duration,
        bind = %config.bind_addr,
        "Starting drop-server"
    );

    let data = load_airdrop_file(&config.airdrop_file).with_context(|| {
        format!("Failed to load airdrop file {}", config.airdrop_file.display())
    })?;
    let snapshot = AirdropSnapshot::build(data, config.schedule())
        .context("Failed to build merkle tree")?;

    let state = AppState {
        snapshots: Arc::new(SnapshotHandle::new(snapshot)),
    };
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}
