//! Record areas of the planting-operations store.
//!
//! - `reference`: farmers, land plots, plant species
//! - `schedule`: planting schedules, including the cascade-checked delete
//! - `harvest`: harvest results against ready schedules
//! - `fertilization`: fertilization activities and fertilizer/pesticide stock
//! - `report`: problem reports and their handling status

pub mod fertilization;
pub mod harvest;
pub mod reference;
pub mod report;
pub mod schedule;

use crate::core::error::SipataniError;

pub(crate) fn require_positive(value: f64, what: &str) -> Result<f64, SipataniError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SipataniError::ValidationError(format!(
            "{what} must be greater than 0 (got {value})"
        )))
    }
}

/// Find `id` in a list the operator was offered; free-form ids are rejected.
pub(crate) fn require_offered<'a, T>(
    offered: &'a [T],
    id: i64,
    key: impl Fn(&T) -> i64,
    what: &str,
) -> Result<&'a T, SipataniError> {
    offered
        .iter()
        .find(|item| key(item) == id)
        .ok_or_else(|| SipataniError::ValidationError(format!("{what} {id} is not in the available list")))
}
