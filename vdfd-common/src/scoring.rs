//! Distress score calculation
//!
//! The score is the share of flagged indicators, in percent. Free-text extra
//! indicators count as flagged and also widen the denominator, so each extra
//! carries the same weight as one fixed flag:
//!
//! ```text
//! score = round((fixed_true + extras) / (7 + extras) * 100), max 100
//! ```
//!
//! With no extras this is `round(k / 7 * 100)`.

use crate::models::DistressIndicators;

/// Highest possible score
pub const MAX_SCORE: u8 = 100;

/// Compute the 0-100 distress score for a set of indicators
pub fn distress_score(indicators: &DistressIndicators) -> u8 {
    let extras = indicators.other.len();
    let flagged = indicators.flagged_count() + extras;
    let possible = DistressIndicators::FIXED_COUNT + extras;

    let percent = (flagged as f64 / possible as f64 * 100.0).round();
    percent.min(MAX_SCORE as f64) as u8
}
