//! Dashboard REST API handlers
//!
//! Every action boundary catches the service error and converts it to a
//! user-visible response; nothing here terminates the session.

use crate::error::AppError;
use crate::pricing::effective_price;
use crate::server::types::*;
use crate::services::DashboardService;
use crate::state::AppState;
use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::warn;

fn failure<T: serde::Serialize>(err: &AppError) -> (StatusCode, Json<ApiResponse<T>>) {
    warn!("Action failed: {}", err);
    (error_status(err), Json(ApiResponse::error(err)))
}

/// Health check endpoint - GET /health or GET /
pub async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::<Empty>::success_with_message(
        "RateDesk API is running",
    ))
}

/// GET /api/v1/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.get_snapshot();
    let data = StatusData {
        state: if snapshot.is_some() { "loaded" } else { "empty" }.to_string(),
        record_count: snapshot.as_ref().map_or(0, |s| s.records.len()),
        loaded_at: snapshot.as_ref().map(|s| s.loaded_at),
        push_enabled: state.push_enabled(),
    };
    Json(ApiResponse::success(data))
}

/// POST /api/v1/refresh
pub async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match DashboardService::refresh(&state).await {
        Ok(result) => (StatusCode::OK, Json(ApiResponse::success(result))),
        Err(e) => failure(&e),
    }
}

/// GET /api/v1/snapshot
pub async fn get_snapshot(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.get_snapshot() {
        Some(snapshot) => {
            let records = snapshot
                .records
                .iter()
                .map(|record| RecordView {
                    effective_price: effective_price(record),
                    record: record.clone(),
                })
                .collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(SnapshotData {
                    records,
                    loaded_at: snapshot.loaded_at,
                })),
            )
        }
        None => failure(&AppError::NotFound(
            "No data loaded; refresh first".to_string(),
        )),
    }
}

/// POST /api/v1/override
pub async fn save_override(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OverrideRequest>,
) -> impl IntoResponse {
    match DashboardService::save_override(&state, &request.room_type, &request.value).await {
        Ok(result) => (StatusCode::OK, Json(ApiResponse::success(result))),
        Err(e) => failure(&e),
    }
}

/// POST /api/v1/push
pub async fn push_rate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PushRequest>,
) -> impl IntoResponse {
    match DashboardService::push_rate(
        &state,
        &request.room_type,
        request.start_date,
        request.end_date,
    )
    .await
    {
        Ok(result) => (StatusCode::OK, Json(ApiResponse::success(result))),
        Err(e) => failure(&e),
    }
}

/// GET /api/v1/export
pub async fn export_csv(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match DashboardService::export_csv(&state) {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"rates.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => failure::<Empty>(&e).into_response(),
    }
}
