//! Actual-consumption reconciliation for finished supplies.
//!
//! Once a supply is finished, the realized daily rate over the actual
//! start-to-finish interval is compared against the declared rate and the
//! variance is classified into a feeding status.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::supply::SupplyRecord;

// ---------------------------------------------------------------------------
// Variance bands
// ---------------------------------------------------------------------------

/// Variance within this band (percent, either side of zero) is normal.
pub const NORMAL_VARIANCE_PCT: f64 = 5.0;

/// Variance beyond this band is unambiguous over/underfeeding; between the
/// two bounds it is reported as slightly over/under.
pub const OUTER_VARIANCE_PCT: f64 = 7.5;

// ---------------------------------------------------------------------------
// Feeding status
// ---------------------------------------------------------------------------

/// Classification of realized vs. declared daily consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedingStatus {
    Overfeeding,
    SlightlyOverfeeding,
    Normal,
    SlightlyUnderfeeding,
    Underfeeding,
}

impl FeedingStatus {
    /// Classify a variance percentage.
    ///
    /// Zero variance is normal; the bands tighten monotonically, so the
    /// status never flips back as the variance grows in magnitude.
    pub fn from_variance(variance_pct: f64) -> Self {
        if variance_pct > OUTER_VARIANCE_PCT {
            Self::Overfeeding
        } else if variance_pct > NORMAL_VARIANCE_PCT {
            Self::SlightlyOverfeeding
        } else if variance_pct >= -NORMAL_VARIANCE_PCT {
            Self::Normal
        } else if variance_pct >= -OUTER_VARIANCE_PCT {
            Self::SlightlyUnderfeeding
        } else {
            Self::Underfeeding
        }
    }

    /// Human-readable label for display in the UI.
    pub fn label(self) -> &'static str {
        match self {
            Self::Overfeeding => "Overfeeding",
            Self::SlightlyOverfeeding => "Slightly overfeeding",
            Self::Normal => "Normal",
            Self::SlightlyUnderfeeding => "Slightly underfeeding",
            Self::Underfeeding => "Underfeeding",
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Realized consumption of a finished supply against its declared schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionReport {
    pub date_finished: NaiveDate,
    /// Whole days between start and finish, at least one.
    pub actual_days_elapsed: i64,
    /// Realized rate in grams per day.
    pub actual_daily_consumption: f64,
    /// Declared rate in grams per day.
    pub expected_daily_consumption: f64,
    pub variance_percentage: f64,
    pub feeding_status: FeedingStatus,
}

/// Reconcile a finished supply's schedule against the time it actually took.
///
/// Calling this on a record without a finish date is a caller contract
/// violation and fails with a validation error.
pub fn reconcile_consumption(record: &SupplyRecord) -> Result<ConsumptionReport, CoreError> {
    let date_finished = record.date_finished.ok_or_else(|| {
        CoreError::Validation("consumption can only be reconciled for a finished supply".into())
    })?;

    let actual_days_elapsed = (date_finished - record.date_started).num_days().max(1);

    let total_grams = record.kind.total_grams();
    let expected_daily_consumption = record.kind.daily_grams();
    let actual_daily_consumption = total_grams / actual_days_elapsed as f64;

    let variance_percentage = if expected_daily_consumption > 0.0 {
        (actual_daily_consumption - expected_daily_consumption) / expected_daily_consumption
            * 100.0
    } else {
        0.0
    };

    Ok(ConsumptionReport {
        date_finished,
        actual_days_elapsed,
        actual_daily_consumption,
        expected_daily_consumption,
        variance_percentage,
        feeding_status: FeedingStatus::from_variance(variance_percentage),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supply::SupplyKind;
    use crate::units::FoodUnit;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn finished_supply(kind: SupplyKind, started: NaiveDate, finished: NaiveDate) -> SupplyRecord {
        SupplyRecord {
            id: 1,
            pet_id: 1,
            brand_name: None,
            product_name: None,
            date_started: started,
            date_finished: Some(finished),
            is_active: false,
            kind,
        }
    }

    fn wet_case() -> SupplyKind {
        SupplyKind::Wet {
            unit_count: 12,
            quantity_per_unit: 85.0,
            quantity_per_unit_unit: FoodUnit::Grams,
            daily_amount: 170.0,
            daily_amount_unit: FoodUnit::Grams,
        }
    }

    fn dry_bag() -> SupplyKind {
        SupplyKind::Dry {
            total_quantity: 2.0,
            total_quantity_unit: FoodUnit::Kilograms,
            daily_amount: 100.0,
            daily_amount_unit: FoodUnit::Grams,
        }
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    #[test]
    fn on_schedule_case_is_normal() {
        // 12 x 85 g = 1020 g at 170 g/day finished in exactly 6 days.
        let record = finished_supply(wet_case(), date(2025, 6, 1), date(2025, 6, 7));

        let report = reconcile_consumption(&record).unwrap();
        assert_eq!(report.actual_days_elapsed, 6);
        assert!((report.actual_daily_consumption - 170.0).abs() < 1e-9);
        assert!(report.variance_percentage.abs() < 1e-9);
        assert_eq!(report.feeding_status, FeedingStatus::Normal);
    }

    #[test]
    fn early_finish_is_overfeeding() {
        // 2 kg at 100 g/day should last 20 days; gone in 15.
        let record = finished_supply(dry_bag(), date(2025, 6, 1), date(2025, 6, 16));

        let report = reconcile_consumption(&record).unwrap();
        assert_eq!(report.actual_days_elapsed, 15);
        assert!((report.actual_daily_consumption - 2000.0 / 15.0).abs() < 1e-9);
        assert!((report.variance_percentage - 100.0 / 3.0).abs() < 1e-6);
        assert_eq!(report.feeding_status, FeedingStatus::Overfeeding);
    }

    #[test]
    fn late_finish_is_underfeeding() {
        // 20-day bag stretched to 25 days: -20% variance.
        let record = finished_supply(dry_bag(), date(2025, 6, 1), date(2025, 6, 26));

        let report = reconcile_consumption(&record).unwrap();
        assert!((report.variance_percentage + 20.0).abs() < 1e-9);
        assert_eq!(report.feeding_status, FeedingStatus::Underfeeding);
    }

    #[test]
    fn same_day_finish_counts_one_day() {
        let record = finished_supply(wet_case(), date(2025, 6, 1), date(2025, 6, 1));

        let report = reconcile_consumption(&record).unwrap();
        assert_eq!(report.actual_days_elapsed, 1);
        assert!((report.actual_daily_consumption - 1020.0).abs() < 1e-9);
    }

    #[test]
    fn unfinished_record_is_rejected() {
        let mut record = finished_supply(dry_bag(), date(2025, 6, 1), date(2025, 6, 16));
        record.date_finished = None;

        assert!(matches!(
            reconcile_consumption(&record),
            Err(CoreError::Validation(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Band boundaries
    // -----------------------------------------------------------------------

    #[test]
    fn zero_variance_is_normal() {
        assert_eq!(FeedingStatus::from_variance(0.0), FeedingStatus::Normal);
    }

    #[test]
    fn normal_band_is_inclusive() {
        assert_eq!(FeedingStatus::from_variance(5.0), FeedingStatus::Normal);
        assert_eq!(FeedingStatus::from_variance(-5.0), FeedingStatus::Normal);
    }

    #[test]
    fn slight_band_between_bounds() {
        assert_eq!(
            FeedingStatus::from_variance(6.0),
            FeedingStatus::SlightlyOverfeeding
        );
        assert_eq!(
            FeedingStatus::from_variance(7.5),
            FeedingStatus::SlightlyOverfeeding
        );
        assert_eq!(
            FeedingStatus::from_variance(-6.0),
            FeedingStatus::SlightlyUnderfeeding
        );
        assert_eq!(
            FeedingStatus::from_variance(-7.5),
            FeedingStatus::SlightlyUnderfeeding
        );
    }

    #[test]
    fn outer_band_is_unambiguous() {
        assert_eq!(
            FeedingStatus::from_variance(7.6),
            FeedingStatus::Overfeeding
        );
        assert_eq!(
            FeedingStatus::from_variance(-7.6),
            FeedingStatus::Underfeeding
        );
        assert_eq!(
            FeedingStatus::from_variance(150.0),
            FeedingStatus::Overfeeding
        );
    }

    #[test]
    fn status_labels() {
        assert_eq!(FeedingStatus::Normal.label(), "Normal");
        assert_eq!(FeedingStatus::Overfeeding.label(), "Overfeeding");
        assert_eq!(
            FeedingStatus::SlightlyUnderfeeding.label(),
            "Slightly underfeeding"
        );
    }

    #[test]
    fn classification_is_monotonic() {
        let order = |s: FeedingStatus| match s {
            FeedingStatus::Underfeeding => 0,
            FeedingStatus::SlightlyUnderfeeding => 1,
            FeedingStatus::Normal => 2,
            FeedingStatus::SlightlyOverfeeding => 3,
            FeedingStatus::Overfeeding => 4,
        };
        let mut prev = 0;
        for tenth in -120..=120 {
            let rank = order(FeedingStatus::from_variance(f64::from(tenth) / 10.0));
            assert!(rank >= prev, "status flipped at {}%", f64::from(tenth) / 10.0);
            prev = rank;
        }
    }
}
