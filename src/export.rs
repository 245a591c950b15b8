//! Snapshot export
//!
//! On-demand conversion of the current snapshot to CSV text for download.
//! Nothing is persisted; the caller streams the text to the operator.

use crate::error::{AppError, Result};
use crate::pricing::effective_price;
use crate::sheets::RateRecord;

fn decimal(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Serialize records to CSV, one row per room type, with the effective
/// price the operator sees appended as the last column.
pub fn snapshot_to_csv(records: &[RateRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "Room_Type",
            "Current_Rate",
            "Comp_Avg_Standard",
            "Occupancy_Pct",
            "Base_Recommended",
            "Weekend_Adjusted",
            "Season_Adjusted",
            "Final_Recommended",
            "Manual_Override",
            "Push_to_NB",
            "Effective_Price",
        ])
        .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;

    for record in records {
        writer
            .write_record([
                record.room_type.clone(),
                decimal(record.current_rate),
                decimal(record.competitor_average),
                decimal(record.occupancy_percent),
                decimal(record.base_recommended),
                decimal(record.weekend_adjusted),
                decimal(record.season_adjusted),
                decimal(record.final_recommended),
                decimal(record.manual_override),
                (if record.pushed_to_channel_manager { "Yes" } else { "" }).to_string(),
                decimal(effective_price(record)),
            ])
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV not UTF-8: {}", e)))
}
