//! Channel-manager client
//!
//! Pushes a rate to the booking channel manager with a single HTTP PUT. The
//! client exists only when a bearer token is configured; without one the
//! push feature is disabled and no call is ever attempted.

use crate::config::ChannelManagerConfig;
use crate::error::{AppError, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Rate payload sent to `PUT /v1/properties/{property_id}/rates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatePayload {
    pub room_type_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rate: f64,
}

/// Outcome of a successful push, carrying the remote status text.
#[derive(Debug, Clone, Serialize)]
pub struct PushOutcome {
    pub status: String,
    pub remote_body: String,
}

pub struct ChannelManagerClient {
    client: Client,
    api_base: String,
    property_id: String,
    token: String,
}

impl ChannelManagerClient {
    /// Build a client from config. Returns `None` when no bearer token is
    /// resolvable; the caller treats that as "feature unavailable", not as
    /// an error.
    pub fn from_config(config: &ChannelManagerConfig) -> Option<Self> {
        let token = config.resolve_token()?;
        Some(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            property_id: config.property_id.clone(),
            token,
        })
    }

    /// Push one rate. Single synchronous PUT; no retry, no idempotency key.
    /// Any non-2xx answer surfaces as a remote error with the status code
    /// and the raw response body.
    pub async fn push_rate(&self, payload: &RatePayload) -> Result<PushOutcome> {
        let url = format!(
            "{}/v1/properties/{}/rates",
            self.api_base, self.property_id
        );

        info!(
            "Pushing rate {} for {} ({} to {})",
            payload.rate, payload.room_type_id, payload.start_date, payload.end_date
        );

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(AppError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        Ok(PushOutcome {
            status: status.to_string(),
            remote_body: body,
        })
    }
}
