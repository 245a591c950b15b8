//! Pricing calculator
//!
//! Pure functions only; no state, no I/O. Two variants exist upstream:
//! recompute a flat 3% undercut of the competitor average, or display the
//! upstream-computed recommendation verbatim. In both cases a saved manual
//! override takes precedence over the recommendation.

use crate::error::{AppError, Result};
use crate::sheets::RateRecord;

/// Flat undercut applied to the competitor average.
const UNDERCUT_FACTOR: f64 = 0.97;

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Recommended price as a 3% undercut of the competitor average.
pub fn undercut_price(competitor_average: f64) -> f64 {
    round2(competitor_average * UNDERCUT_FACTOR)
}

/// The price actually shown to the operator: the manual override when one is
/// saved, otherwise the upstream recommendation.
pub fn effective_price(record: &RateRecord) -> Option<f64> {
    record.manual_override.or(record.final_recommended)
}

/// Parse a cell into an optional decimal. Blank means absent; anything else
/// must parse, otherwise the malformed value surfaces as a validation error
/// instead of escaping as an uncaught cast failure.
pub fn parse_decimal(field: &str, raw: &str) -> Result<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| AppError::Validation(format!("{}: not a number: {:?}", field, trimmed)))
}
