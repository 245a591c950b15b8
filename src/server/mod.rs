//! Dashboard REST API server
//!
//! Local HTTP surface the operator UI talks to:
//! - `GET  /health`
//! - `GET  /api/v1/status`
//! - `POST /api/v1/refresh`
//! - `GET  /api/v1/snapshot`
//! - `POST /api/v1/override`
//! - `POST /api/v1/push`
//! - `GET  /api/v1/export`

pub mod handlers;
mod types;

pub use types::{
    ApiResponse, Empty, OverrideRequest, PushRequest, RecordView, SnapshotData, StatusData,
};

use crate::config::ServerConfig;
use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Dashboard API server manager
pub struct ApiServer {
    state: Arc<AppState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            shutdown_tx: None,
        }
    }

    /// Bind and start serving in a background task.
    pub async fn start(&mut self, config: &ServerConfig) -> Result<SocketAddr> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid address: {}", e)))?;

        // Allow all origins; the server binds to loopback for a local UI.
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/", get(handlers::health_check))
            .route("/api/v1/status", get(handlers::get_status))
            .route("/api/v1/refresh", post(handlers::refresh))
            .route("/api/v1/snapshot", get(handlers::get_snapshot))
            .route("/api/v1/override", post(handlers::save_override))
            .route("/api/v1/push", post(handlers::push_rate))
            .route("/api/v1/export", get(handlers::export_csv))
            .with_state(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| AppError::Config(format!("Failed to resolve bind address: {}", e)))?;

        info!("Starting RateDesk API server on {}", local_addr);

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            });

            if let Err(e) = server.await {
                error!("API server error: {}", e);
            }
        });

        Ok(local_addr)
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("API server stop signal sent");
        }
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, PricingVariant, ServerConfig};
    use crate::sheets::{ServiceCredentials, SheetsClient};
    use crate::testutil::{sample_grid, sheets_config, spawn_sheets_stub};
    use parking_lot::RwLock;

    async fn spawn_api() -> (ApiServer, SocketAddr) {
        let stub = spawn_sheets_stub(sample_grid(), true).await;
        let spreadsheet = sheets_config(&stub);
        let state = Arc::new(AppState {
            sheets: Arc::new(SheetsClient::with_credentials(
                &spreadsheet,
                Some(ServiceCredentials {
                    client_email: "svc@test".to_string(),
                    private_key: "key".to_string(),
                }),
            )),
            channel: None,
            snapshot: RwLock::new(None),
            config: Config {
                spreadsheet,
                channel_manager: None,
                server: ServerConfig::default(),
                pricing_variant: PricingVariant::Upstream,
            },
        });

        let mut server = ApiServer::new(state);
        let addr = server
            .start(&ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            })
            .await
            .unwrap();
        (server, addr)
    }

    #[tokio::test]
    async fn test_status_reflects_refresh_and_push_availability() {
        let (_server, addr) = spawn_api().await;
        let base = format!("http://{}", addr);
        let http = reqwest::Client::new();

        let status: serde_json::Value = http
            .get(format!("{}/api/v1/status", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["data"]["state"], "empty");
        assert_eq!(status["data"]["push_enabled"], false);

        let refresh = http
            .post(format!("{}/api/v1/refresh", base))
            .send()
            .await
            .unwrap();
        assert!(refresh.status().is_success());

        let status: serde_json::Value = http
            .get(format!("{}/api/v1/status", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["data"]["state"], "loaded");
        assert_eq!(status["data"]["record_count"], 3);
    }

    #[tokio::test]
    async fn test_snapshot_includes_effective_price() {
        let (_server, addr) = spawn_api().await;
        let base = format!("http://{}", addr);
        let http = reqwest::Client::new();

        http.post(format!("{}/api/v1/refresh", base))
            .send()
            .await
            .unwrap();

        let snapshot: serde_json::Value = http
            .get(format!("{}/api/v1/snapshot", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let records = snapshot["data"]["records"].as_array().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["room_type"], "Standard");
        assert_eq!(records[0]["effective_price"], 91.0);
    }

    #[tokio::test]
    async fn test_push_without_credential_is_distinct_feature_unavailable() {
        let (_server, addr) = spawn_api().await;
        let base = format!("http://{}", addr);
        let http = reqwest::Client::new();

        http.post(format!("{}/api/v1/refresh", base))
            .send()
            .await
            .unwrap();

        let response = http
            .post(format!("{}/api/v1/push", base))
            .json(&serde_json::json!({"room_type": "Standard"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 503);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["code"], "CHANNEL_DISABLED");
    }

    #[tokio::test]
    async fn test_export_returns_csv() {
        let (_server, addr) = spawn_api().await;
        let base = format!("http://{}", addr);
        let http = reqwest::Client::new();

        http.post(format!("{}/api/v1/refresh", base))
            .send()
            .await
            .unwrap();

        let response = http
            .get(format!("{}/api/v1/export", base))
            .send()
            .await
            .unwrap();
        assert!(response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/csv"));
        let body = response.text().await.unwrap();
        assert!(body.starts_with("Room_Type,"));
    }
}
