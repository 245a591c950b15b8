//! Spreadsheet record types
//!
//! Rows are schemaless key/value records keyed by header text. All pricing
//! fields are precomputed upstream; this side only displays them and writes
//! back the manual override and the pushed flag.

use crate::error::Result;
use crate::pricing::parse_decimal;
use serde::{Deserialize, Serialize};

/// Value the Push_to_NB flag column carries once a rate has been pushed.
pub const PUSHED_FLAG_VALUE: &str = "Yes";

/// One worksheet row: one room type's pricing snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub room_type: String,
    pub current_rate: Option<f64>,
    pub competitor_average: Option<f64>,
    pub occupancy_percent: Option<f64>,
    pub base_recommended: Option<f64>,
    pub weekend_adjusted: Option<f64>,
    pub season_adjusted: Option<f64>,
    /// Read verbatim from the configured price column.
    pub final_recommended: Option<f64>,
    pub manual_override: Option<f64>,
    pub pushed_to_channel_manager: bool,
}

/// Look up a cell by header name. A row shorter than the header yields an
/// empty cell, never an error.
fn cell<'a>(header: &[String], row: &'a [String], name: &str) -> &'a str {
    header
        .iter()
        .position(|h| h == name)
        .and_then(|i| row.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

impl RateRecord {
    /// Build a record from a data row, keyed by the header row.
    /// `price_column` names the authoritative recommended-price column.
    pub fn from_row(header: &[String], row: &[String], price_column: &str) -> Result<Self> {
        Ok(Self {
            room_type: cell(header, row, "Room_Type").trim().to_string(),
            current_rate: parse_decimal("Current_Rate", cell(header, row, "Current_Rate"))?,
            competitor_average: parse_decimal(
                "Comp_Avg_Standard",
                cell(header, row, "Comp_Avg_Standard"),
            )?,
            occupancy_percent: parse_decimal(
                "Occupancy_Pct",
                cell(header, row, "Occupancy_Pct"),
            )?,
            base_recommended: parse_decimal(
                "Base_Recommended",
                cell(header, row, "Base_Recommended"),
            )?,
            weekend_adjusted: parse_decimal(
                "Weekend_Adjusted",
                cell(header, row, "Weekend_Adjusted"),
            )?,
            season_adjusted: parse_decimal(
                "Season_Adjusted",
                cell(header, row, "Season_Adjusted"),
            )?,
            final_recommended: parse_decimal(price_column, cell(header, row, price_column))?,
            manual_override: parse_decimal(
                "Manual_Override",
                cell(header, row, "Manual_Override"),
            )?,
            pushed_to_channel_manager: cell(header, row, "Push_to_NB").trim()
                == PUSHED_FLAG_VALUE,
        })
    }
}
