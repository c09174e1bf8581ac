//! Remaining-supply projection.
//!
//! Pure calculation of how much of a supply is left and when it runs out,
//! given an explicit `today`. Invoked for display on both active and
//! already-finished entries; never consults `is_active`, never mutates.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::supply::SupplyRecord;
use crate::units::from_grams;

/// Projected state of a supply as of a given day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemainingSupply {
    /// Whole days of food left at the declared daily rate.
    pub remaining_days: i64,
    /// Remaining quantity in the unit the supply was entered in.
    pub remaining_weight: f64,
    /// Date the supply runs out, or ran out when already exhausted.
    pub depletion_date: NaiveDate,
}

/// Project remaining days, remaining weight, and the depletion date.
///
/// The start date always counts as at least one day of consumption, so a
/// supply started today has already consumed one daily portion. Consumption
/// is not capped at the total: an overdue supply projects to zero remaining,
/// and its depletion date is the stable historical date the supply should
/// have run out rather than a date that drifts with `today`.
pub fn project_remaining(record: &SupplyRecord, today: NaiveDate) -> RemainingSupply {
    let days_elapsed = (today - record.date_started).num_days().max(1);

    let total_grams = record.kind.total_grams();
    let daily_grams = record.kind.daily_grams();
    let native_unit = record.kind.native_total_unit();

    if daily_grams <= 0.0 {
        // No consumption assumed: nothing to project.
        return RemainingSupply {
            remaining_days: 0,
            remaining_weight: from_grams(total_grams, native_unit),
            depletion_date: today,
        };
    }

    let consumed_grams = days_elapsed as f64 * daily_grams;
    let remaining_grams = (total_grams - consumed_grams).max(0.0);
    let remaining_days = (remaining_grams / daily_grams).floor() as i64;

    let depletion_date = if remaining_days > 0 {
        add_days(today, remaining_days)
    } else {
        let schedule_days = (total_grams / daily_grams).ceil() as i64;
        add_days(record.date_started, schedule_days)
    };

    RemainingSupply {
        remaining_days,
        remaining_weight: from_grams(remaining_grams, native_unit),
        depletion_date,
    }
}

fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_days(Days::new(days.max(0) as u64))
        .unwrap_or(NaiveDate::MAX)
}
