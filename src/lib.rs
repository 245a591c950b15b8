//! RateDesk - Hotel Rate Dashboard Backend
//!
//! Serves a local REST API over a competitor-pricing spreadsheet: refresh
//! the rate snapshot, save per-room manual overrides back to the sheet, and
//! optionally push rates to a booking channel manager.

pub mod channel;
pub mod config;
pub mod error;
pub mod export;
pub mod pricing;
pub mod server;
pub mod services;
pub mod sheets;
pub mod state;

#[cfg(test)]
mod testutil;

use config::Config;
use server::ApiServer;
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize and run the application until interrupted.
pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratedesk=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting RateDesk...");

    let config_path = Config::default_path();
    let config = Config::load(&config_path)?;
    let server_config = config.server.clone();

    let state = Arc::new(AppState::new(config)?);
    tracing::info!("Application state initialized");

    let mut server = ApiServer::new(state);
    let addr = server.start(&server_config).await?;
    tracing::info!("Dashboard API listening on http://{}", addr);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Interrupt received");
    server.stop();

    Ok(())
}
