//! Lead and route records
//!
//! Wire names are camelCase so that records exchanged with the browser
//! front-end and the remote document store keep their original shape.

pub mod lead;
pub mod route;

pub use lead::*;
pub use route::*;

use serde::{Deserialize, Deserializer};

/// Deserialize a present field (including `null`) as `Some(value)`
///
/// Used with `#[serde(default)]` on update payloads so that a missing field
/// means "leave unchanged" while an explicit `null` clears an optional value.
pub(crate) fn present<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Check that an optional currency amount is finite and non-negative
pub(crate) fn check_amount(field: &str, value: Option<f64>) -> crate::Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(crate::Error::InvalidInput(format!(
            "{} must be a non-negative amount, got {}",
            field, v
        ))),
        _ => Ok(()),
    }
}

/// Check that a coordinate is a finite latitude/longitude pair
pub(crate) fn check_coordinate(lat: f64, lng: f64) -> crate::Result<()> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(crate::Error::InvalidInput(format!(
            "latitude out of range: {}",
            lat
        )));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(crate::Error::InvalidInput(format!(
            "longitude out of range: {}",
            lng
        )));
    }
    Ok(())
}
