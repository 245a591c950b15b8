//! Dashboard Service
//!
//! Orchestrates the operator session: refresh the snapshot from the
//! spreadsheet backend, save a manual override back to its cell, push a rate
//! to the channel manager, export the snapshot.
//!
//! Session state machine: Empty until the first successful refresh, Loaded
//! after it. A failed refresh leaves whatever was loaded before untouched. A
//! failed save or push changes nothing locally either; the snapshot is only
//! ever replaced whole.

use crate::channel::{PushOutcome, RatePayload};
use crate::config::PricingVariant;
use crate::error::{AppError, Result};
use crate::export;
use crate::pricing;
use crate::sheets::PUSHED_FLAG_VALUE;
use crate::state::{AppState, Snapshot};
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// 1-based column holding the Room_Type row key.
const KEY_COLUMN: u32 = 1;

/// Default push window length when the request names no end date.
const DEFAULT_PUSH_DAYS: i64 = 6;

/// Result of a refresh
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResult {
    pub record_count: usize,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Result of saving a manual override
#[derive(Debug, Clone, Serialize)]
pub struct SaveResult {
    pub room_type: String,
    pub value: Option<f64>,
    /// 1-based sheet coordinates the write landed on.
    pub row: u32,
    pub column: u32,
}

/// Result of a channel-manager push
#[derive(Debug, Clone, Serialize)]
pub struct PushResult {
    pub room_type: String,
    pub rate: f64,
    pub remote_status: String,
}

/// Dashboard service for business logic
pub struct DashboardService;

impl DashboardService {
    /// Load a fresh snapshot from the spreadsheet backend. The previous
    /// snapshot is replaced only after every remote call has succeeded.
    pub async fn refresh(state: &AppState) -> Result<RefreshResult> {
        info!("DashboardService::refresh");

        let spreadsheet = &state.config.spreadsheet;
        let document = state.sheets.open_document(&spreadsheet.document_url).await?;
        let worksheet = state
            .sheets
            .select_worksheet(&document, &spreadsheet.worksheet)?;

        let mut records = state
            .sheets
            .read_all_records(&worksheet, &spreadsheet.price_column)
            .await?;

        if state.config.pricing_variant == PricingVariant::Undercut {
            for record in &mut records {
                record.final_recommended = record
                    .competitor_average
                    .map(pricing::undercut_price)
                    .or(record.final_recommended);
            }
        }

        let snapshot = Snapshot {
            worksheet,
            records,
            loaded_at: Utc::now(),
        };
        let result = RefreshResult {
            record_count: snapshot.records.len(),
            loaded_at: snapshot.loaded_at,
        };

        state.set_snapshot(snapshot);
        info!("Snapshot loaded: {} records", result.record_count);
        Ok(result)
    }

    /// Save a manual override to the backing sheet.
    ///
    /// The target row is resolved by room-type key at write time: the key
    /// column is re-read and the write is refused if the key vanished or
    /// moved since the snapshot was loaded. The in-memory snapshot is never
    /// mutated here; it catches up on the next refresh.
    pub async fn save_override(
        state: &AppState,
        room_type: &str,
        raw_value: &str,
    ) -> Result<SaveResult> {
        info!("DashboardService::save_override - {}", room_type);

        let value = pricing::parse_decimal("Manual_Override", raw_value)?;
        let snapshot = state
            .get_snapshot()
            .ok_or_else(|| AppError::NotFound("No data loaded; refresh first".to_string()))?;

        let row = Self::resolve_row(state, &snapshot, room_type).await?;
        let column = state.config.spreadsheet.override_column;

        let cell_value = value.map(|v| v.to_string()).unwrap_or_default();
        state
            .sheets
            .write_cell(&snapshot.worksheet, row, column, &cell_value)
            .await?;

        Ok(SaveResult {
            room_type: room_type.to_string(),
            value,
            row,
            column,
        })
    }

    /// Push one room type's effective price to the channel manager and mark
    /// the row's pushed flag. The flag write is best-effort; a failure there
    /// leaves the push itself reported as successful.
    pub async fn push_rate(
        state: &AppState,
        room_type: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PushResult> {
        info!("DashboardService::push_rate - {}", room_type);

        let channel = state.channel.as_ref().ok_or(AppError::ChannelDisabled)?;

        let snapshot = state
            .get_snapshot()
            .ok_or_else(|| AppError::NotFound("No data loaded; refresh first".to_string()))?;
        let record = snapshot.record(room_type).ok_or_else(|| {
            AppError::NotFound(format!("Room type {:?} not in snapshot", room_type))
        })?;

        let rate = pricing::effective_price(record).ok_or_else(|| {
            AppError::Validation(format!("No price available for {:?}", room_type))
        })?;

        let start = start_date.unwrap_or_else(|| Utc::now().date_naive());
        let end = end_date.unwrap_or(start + Duration::days(DEFAULT_PUSH_DAYS));

        let outcome: PushOutcome = channel
            .push_rate(&RatePayload {
                room_type_id: room_type.to_string(),
                start_date: start,
                end_date: end,
                rate,
            })
            .await?;

        Self::mark_pushed(state, &snapshot, room_type).await;

        Ok(PushResult {
            room_type: room_type.to_string(),
            rate,
            remote_status: outcome.status,
        })
    }

    /// Export the current snapshot as CSV text.
    pub fn export_csv(state: &AppState) -> Result<String> {
        let snapshot = state
            .get_snapshot()
            .ok_or_else(|| AppError::NotFound("No data loaded; refresh first".to_string()))?;
        export::snapshot_to_csv(&snapshot.records)
    }

    // ========================================================================
    // Private Helper Methods
    // ========================================================================

    /// Resolve a room type to its current 1-based sheet row, refusing the
    /// write if the key is gone or no longer where the snapshot saw it.
    async fn resolve_row(
        state: &AppState,
        snapshot: &Snapshot,
        room_type: &str,
    ) -> Result<u32> {
        let snapshot_pos = snapshot.position_of(room_type).ok_or_else(|| {
            AppError::NotFound(format!("Room type {:?} not in snapshot", room_type))
        })?;

        let keys = state
            .sheets
            .read_column(&snapshot.worksheet, KEY_COLUMN)
            .await?;
        let current_pos = keys
            .iter()
            .skip(1) // header
            .position(|key| key.trim() == room_type)
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "Room type {:?} vanished from the sheet since load",
                    room_type
                ))
            })?;

        if current_pos != snapshot_pos {
            return Err(AppError::Conflict(format!(
                "Room type {:?} moved from row {} to row {} since load; refresh and retry",
                room_type,
                snapshot_pos + 2,
                current_pos + 2
            )));
        }

        Ok(current_pos as u32 + 2) // 1-based, header row included
    }

    async fn mark_pushed(state: &AppState, snapshot: &Snapshot, room_type: &str) {
        let column = state.config.spreadsheet.pushed_flag_column;
        let write = match Self::resolve_row(state, snapshot, room_type).await {
            Ok(row) => {
                state
                    .sheets
                    .write_cell(&snapshot.worksheet, row, column, PUSHED_FLAG_VALUE)
                    .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = write {
            warn!("Pushed flag not persisted for {:?}: {}", room_type, e);
        }
    }
}
