//! Dashboard REST API types

use crate::error::{AppError, ErrorResponse};
use crate::sheets::RateRecord;
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Standard API response envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Empty data payload
#[derive(Debug, Clone, Serialize)]
pub struct Empty {}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: None,
            code: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.to_string()),
            code: None,
            data: None,
        }
    }

    pub fn error(err: &AppError) -> Self {
        let response = ErrorResponse::from(err);
        Self {
            status: "error".to_string(),
            message: Some(response.message),
            code: Some(response.code),
            data: None,
        }
    }
}

/// HTTP status an error maps to at the action boundary.
pub fn error_status(err: &AppError) -> StatusCode {
    match err {
        AppError::Auth(_) => StatusCode::UNAUTHORIZED,
        AppError::NotFound(_) | AppError::WorksheetNotFound(_) => StatusCode::NOT_FOUND,
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::ChannelDisabled => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Write(_) | AppError::Remote { .. } | AppError::Http(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Session status for the UI
#[derive(Debug, Clone, Serialize)]
pub struct StatusData {
    /// "empty" before the first successful refresh, "loaded" after.
    pub state: String,
    pub record_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<chrono::DateTime<chrono::Utc>>,
    /// When false the UI hides the push controls entirely.
    pub push_enabled: bool,
}

/// One record plus the price the operator actually sees.
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    #[serde(flatten)]
    pub record: RateRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotData {
    pub records: Vec<RecordView>,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// POST /api/v1/override
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideRequest {
    pub room_type: String,
    /// Raw operator input; validated server-side. Blank clears the override.
    #[serde(default)]
    pub value: String,
}

/// POST /api/v1/push
#[derive(Debug, Clone, Deserialize)]
pub struct PushRequest {
    pub room_type: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}
