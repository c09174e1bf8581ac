//! Domain model for a tracked food supply.
//!
//! One `SupplyRecord` is one purchased batch (a dry bag or a case of wet
//! food) together with its declared consumption schedule. Category-specific
//! quantities live on the matching `SupplyKind` variant only; the wide
//! nullable-column layout exists solely in the storage layer.

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::DbId;
use crate::units::{to_grams, FoodCategory, FoodUnit};

/// Category-specific quantity fields of a supply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum SupplyKind {
    /// A bag of dry food.
    Dry {
        total_quantity: f64,
        total_quantity_unit: FoodUnit,
        daily_amount: f64,
        daily_amount_unit: FoodUnit,
    },
    /// A case of wet-food cans or pouches.
    Wet {
        unit_count: i32,
        quantity_per_unit: f64,
        quantity_per_unit_unit: FoodUnit,
        daily_amount: f64,
        daily_amount_unit: FoodUnit,
    },
}

impl SupplyKind {
    pub fn category(&self) -> FoodCategory {
        match self {
            Self::Dry { .. } => FoodCategory::Dry,
            Self::Wet { .. } => FoodCategory::Wet,
        }
    }

    /// Total purchased quantity in grams.
    ///
    /// For wet food the total is `unit_count x quantity_per_unit`.
    pub fn total_grams(&self) -> f64 {
        match *self {
            Self::Dry {
                total_quantity,
                total_quantity_unit,
                ..
            } => to_grams(total_quantity, total_quantity_unit),
            Self::Wet {
                unit_count,
                quantity_per_unit,
                quantity_per_unit_unit,
                ..
            } => f64::from(unit_count) * to_grams(quantity_per_unit, quantity_per_unit_unit),
        }
    }

    /// Declared daily consumption in grams.
    pub fn daily_grams(&self) -> f64 {
        match *self {
            Self::Dry {
                daily_amount,
                daily_amount_unit,
                ..
            }
            | Self::Wet {
                daily_amount,
                daily_amount_unit,
                ..
            } => to_grams(daily_amount, daily_amount_unit),
        }
    }

    /// Unit in which remaining weight is reported back to the caller:
    /// the unit the total was entered in (per-can unit for wet food).
    pub fn native_total_unit(&self) -> FoodUnit {
        match *self {
            Self::Dry {
                total_quantity_unit,
                ..
            } => total_quantity_unit,
            Self::Wet {
                quantity_per_unit_unit,
                ..
            } => quantity_per_unit_unit,
        }
    }
}

/// One tracked purchase of pet food with its consumption schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplyRecord {
    pub id: DbId,
    pub pet_id: DbId,
    pub brand_name: Option<String>,
    pub product_name: Option<String>,
    /// Calendar date consumption began. Never in the future.
    pub date_started: NaiveDate,
    /// Set exactly once by the finish transition; `None` while active.
    pub date_finished: Option<NaiveDate>,
    pub is_active: bool,
    #[serde(flatten)]
    pub kind: SupplyKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dry_kind() -> SupplyKind {
        SupplyKind::Dry {
            total_quantity: 2.0,
            total_quantity_unit: FoodUnit::Kilograms,
            daily_amount: 100.0,
            daily_amount_unit: FoodUnit::Grams,
        }
    }

    fn wet_kind() -> SupplyKind {
        SupplyKind::Wet {
            unit_count: 12,
            quantity_per_unit: 85.0,
            quantity_per_unit_unit: FoodUnit::Grams,
            daily_amount: 170.0,
            daily_amount_unit: FoodUnit::Grams,
        }
    }

    #[test]
    fn dry_total_converts_bag_quantity() {
        assert!((dry_kind().total_grams() - 2000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wet_total_multiplies_unit_count() {
        assert!((wet_kind().total_grams() - 1020.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wet_total_converts_ounces() {
        let kind = SupplyKind::Wet {
            unit_count: 10,
            quantity_per_unit: 3.0,
            quantity_per_unit_unit: FoodUnit::Ounces,
            daily_amount: 170.0,
            daily_amount_unit: FoodUnit::Grams,
        };
        assert!((kind.total_grams() - 850.485).abs() < 1e-9);
    }

    #[test]
    fn daily_converts_cups() {
        let kind = SupplyKind::Dry {
            total_quantity: 2.0,
            total_quantity_unit: FoodUnit::Kilograms,
            daily_amount: 1.5,
            daily_amount_unit: FoodUnit::Cups,
        };
        assert!((kind.daily_grams() - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn categories_match_variants() {
        assert_eq!(dry_kind().category(), FoodCategory::Dry);
        assert_eq!(wet_kind().category(), FoodCategory::Wet);
    }

    #[test]
    fn native_unit_is_total_unit() {
        assert_eq!(dry_kind().native_total_unit(), FoodUnit::Kilograms);
        assert_eq!(wet_kind().native_total_unit(), FoodUnit::Grams);
    }
}
