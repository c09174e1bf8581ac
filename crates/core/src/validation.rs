//! Business-range validation for supply input.
//!
//! Shape checks (field presence, string lengths) live on the input DTOs;
//! the range and unit-membership rules below run before any persistence
//! call. The ceilings are sanity bounds against data-entry mistakes, not
//! physical limits.

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::supply::SupplyKind;
use crate::types::DbId;
use crate::units::{to_grams, FoodUnit};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// A dry bag heavier than this is rejected as implausible (50 kg).
pub const DRY_TOTAL_MAX_GRAMS: f64 = 50_000.0;

/// Daily portion ceiling for either category.
pub const DAILY_AMOUNT_MAX_GRAMS: f64 = 2_000.0;

/// Per-can/pouch quantity ceiling for wet food.
pub const WET_UNIT_MAX_GRAMS: f64 = 2_000.0;

/// Cans or pouches per purchase.
pub const WET_UNIT_COUNT_MAX: i32 = 500;

/// Finished-history read bound: entries surfaced when the caller gives no
/// limit, and the most a caller may request. Storage is never pruned.
pub const FINISHED_HISTORY_DEFAULT_LIMIT: i64 = 5;
pub const FINISHED_HISTORY_MAX_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Allowed unit sets
// ---------------------------------------------------------------------------

pub const DRY_TOTAL_UNITS: &[FoodUnit] = &[FoodUnit::Kilograms, FoodUnit::Pounds];
pub const DRY_DAILY_UNITS: &[FoodUnit] = &[FoodUnit::Grams, FoodUnit::Cups];
pub const WET_PER_UNIT_UNITS: &[FoodUnit] = &[FoodUnit::Grams, FoodUnit::Ounces];
pub const WET_DAILY_UNITS: &[FoodUnit] = &[FoodUnit::Grams, FoodUnit::Ounces];

// ---------------------------------------------------------------------------
// Field checks
// ---------------------------------------------------------------------------

/// Validate that a quantity is a finite, strictly positive number.
pub fn validate_positive(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must be a positive number, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a unit belongs to the set allowed for a field.
pub fn validate_unit_allowed(
    unit: FoodUnit,
    allowed: &[FoodUnit],
    name: &str,
) -> Result<(), CoreError> {
    if !allowed.contains(&unit) {
        let allowed: Vec<&str> = allowed.iter().map(|u| u.as_str()).collect();
        return Err(CoreError::Validation(format!(
            "{name} must be one of [{}], got {unit}",
            allowed.join(", ")
        )));
    }
    Ok(())
}

/// Identifiers are BIGSERIAL keys; anything non-positive is malformed and
/// fails before any lookup is attempted.
pub fn validate_id(id: DbId, name: &str) -> Result<(), CoreError> {
    if id <= 0 {
        return Err(CoreError::Validation(format!(
            "{name} must be a positive identifier, got {id}"
        )));
    }
    Ok(())
}

/// Brand/product names are optional; empty strings normalize to `None`.
pub fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Consumption start dates must not be in the future. Dates are calendar
/// days, so the comparison is at end-of-day granularity by construction.
pub fn validate_date_started(date_started: NaiveDate, today: NaiveDate) -> Result<(), CoreError> {
    if date_started > today {
        return Err(CoreError::Validation(format!(
            "date_started must not be in the future (got {date_started}, today is {today})"
        )));
    }
    Ok(())
}

/// A corrected finish date must fall within `[date_started, today]`.
pub fn validate_finish_date(
    date_started: NaiveDate,
    new_date: NaiveDate,
    today: NaiveDate,
) -> Result<(), CoreError> {
    if new_date < date_started || new_date > today {
        return Err(CoreError::Validation(format!(
            "date_finished must be between {date_started} and {today}, got {new_date}"
        )));
    }
    Ok(())
}

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

// ---------------------------------------------------------------------------
// Whole-supply check
// ---------------------------------------------------------------------------

/// Validate every quantity, rate, and unit of a supply's category-specific
/// fields. Used as-is at creation; updates merge the changes onto the
/// existing record and re-run this on the result.
pub fn validate_supply_kind(kind: &SupplyKind) -> Result<(), CoreError> {
    match *kind {
        SupplyKind::Dry {
            total_quantity,
            total_quantity_unit,
            daily_amount,
            daily_amount_unit,
        } => {
            validate_unit_allowed(total_quantity_unit, DRY_TOTAL_UNITS, "total_quantity_unit")?;
            validate_positive(total_quantity, "total_quantity")?;
            if to_grams(total_quantity, total_quantity_unit) > DRY_TOTAL_MAX_GRAMS {
                return Err(CoreError::Validation(format!(
                    "total_quantity exceeds the plausible maximum of {} kg",
                    DRY_TOTAL_MAX_GRAMS / 1000.0
                )));
            }
            validate_unit_allowed(daily_amount_unit, DRY_DAILY_UNITS, "daily_amount_unit")?;
            validate_daily_amount(daily_amount, daily_amount_unit)
        }
        SupplyKind::Wet {
            unit_count,
            quantity_per_unit,
            quantity_per_unit_unit,
            daily_amount,
            daily_amount_unit,
        } => {
            if unit_count < 1 || unit_count > WET_UNIT_COUNT_MAX {
                return Err(CoreError::Validation(format!(
                    "unit_count must be between 1 and {WET_UNIT_COUNT_MAX}, got {unit_count}"
                )));
            }
            validate_unit_allowed(
                quantity_per_unit_unit,
                WET_PER_UNIT_UNITS,
                "quantity_per_unit_unit",
            )?;
            validate_positive(quantity_per_unit, "quantity_per_unit")?;
            if to_grams(quantity_per_unit, quantity_per_unit_unit) > WET_UNIT_MAX_GRAMS {
                return Err(CoreError::Validation(format!(
                    "quantity_per_unit exceeds the plausible maximum of {WET_UNIT_MAX_GRAMS} g"
                )));
            }
            validate_unit_allowed(daily_amount_unit, WET_DAILY_UNITS, "daily_amount_unit")?;
            validate_daily_amount(daily_amount, daily_amount_unit)
        }
    }
}

fn validate_daily_amount(daily_amount: f64, unit: FoodUnit) -> Result<(), CoreError> {
    validate_positive(daily_amount, "daily_amount")?;
    if to_grams(daily_amount, unit) > DAILY_AMOUNT_MAX_GRAMS {
        return Err(CoreError::Validation(format!(
            "daily_amount exceeds the plausible maximum of {DAILY_AMOUNT_MAX_GRAMS} g per day"
        )));
    }
    Ok(())
}
