//! `Checked` sync server -- the remote task store.
//!
//! An axum WebSocket server that owns the authoritative per-account task
//! collections and pushes full snapshots to every connection of an account
//! after every change.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:9100
//! cargo run --bin checked-sync
//!
//! # Run on custom address
//! cargo run --bin checked-sync -- --bind 127.0.0.1:8080
//!
//! # Or via environment variable
//! CHECKED_SYNC_ADDR=127.0.0.1:8080 cargo run --bin checked-sync
//! ```

use clap::Parser;
use checked_sync::config::{SyncCliArgs, SyncConfig};
use checked_sync::server;

#[tokio::main]
async fn main() {
    let cli = SyncCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match SyncConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting checked sync server");

    match server::start_server(&config.bind_addr).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "sync server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "sync server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start sync server");
            std::process::exit(1);
        }
    }
}
