//! Food supply entity model and DTOs.
//!
//! Storage keeps both categories on one wide row with the other category's
//! columns null; the in-memory domain type is the `SupplyKind` variant from
//! `pawtrack_core`. `to_record` is the bridge between the two.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use pawtrack_core::error::CoreError;
use pawtrack_core::supply::{SupplyKind, SupplyRecord};
use pawtrack_core::types::{DbId, Timestamp};
use pawtrack_core::units::{FoodCategory, FoodUnit};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `food_supplies` table.
///
/// Columns belonging to the other category are always null: dry rows never
/// populate `unit_count`/`quantity_per_unit`, wet rows never populate
/// `total_quantity`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FoodSupply {
    pub id: DbId,
    pub pet_id: DbId,
    pub category: String,
    pub total_quantity: Option<f64>,
    pub total_quantity_unit: Option<String>,
    pub unit_count: Option<i32>,
    pub quantity_per_unit: Option<f64>,
    pub quantity_per_unit_unit: Option<String>,
    pub daily_amount: f64,
    pub daily_amount_unit: String,
    pub brand_name: Option<String>,
    pub product_name: Option<String>,
    pub date_started: NaiveDate,
    pub date_finished: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FoodSupply {
    /// Parse the wide row into the domain record.
    ///
    /// Rows are written exclusively through validated paths, so a parse
    /// failure here means the row was corrupted outside the application.
    pub fn to_record(&self) -> Result<SupplyRecord, CoreError> {
        let category: FoodCategory = self
            .category
            .parse()
            .map_err(|e: String| corrupt_row(self.id, &e))?;
        let daily_amount_unit: FoodUnit = self
            .daily_amount_unit
            .parse()
            .map_err(|e: String| corrupt_row(self.id, &e))?;

        let kind = match category {
            FoodCategory::Dry => SupplyKind::Dry {
                total_quantity: self
                    .total_quantity
                    .ok_or_else(|| corrupt_row(self.id, "dry row without total_quantity"))?,
                total_quantity_unit: self
                    .total_quantity_unit
                    .as_deref()
                    .ok_or_else(|| corrupt_row(self.id, "dry row without total_quantity_unit"))?
                    .parse()
                    .map_err(|e: String| corrupt_row(self.id, &e))?,
                daily_amount: self.daily_amount,
                daily_amount_unit,
            },
            FoodCategory::Wet => SupplyKind::Wet {
                unit_count: self
                    .unit_count
                    .ok_or_else(|| corrupt_row(self.id, "wet row without unit_count"))?,
                quantity_per_unit: self
                    .quantity_per_unit
                    .ok_or_else(|| corrupt_row(self.id, "wet row without quantity_per_unit"))?,
                quantity_per_unit_unit: self
                    .quantity_per_unit_unit
                    .as_deref()
                    .ok_or_else(|| corrupt_row(self.id, "wet row without quantity_per_unit_unit"))?
                    .parse()
                    .map_err(|e: String| corrupt_row(self.id, &e))?,
                daily_amount: self.daily_amount,
                daily_amount_unit,
            },
        };

        Ok(SupplyRecord {
            id: self.id,
            pet_id: self.pet_id,
            brand_name: self.brand_name.clone(),
            product_name: self.product_name.clone(),
            date_started: self.date_started,
            date_finished: self.date_finished,
            is_active: self.is_active,
            kind,
        })
    }
}

fn corrupt_row(id: DbId, detail: &str) -> CoreError {
    CoreError::Internal(format!("corrupt food_supplies row {id}: {detail}"))
}

// ---------------------------------------------------------------------------
// Creation DTOs
// ---------------------------------------------------------------------------

/// DTO for creating a dry-food supply (a bag).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewDrySupply {
    pub total_quantity: f64,
    pub total_quantity_unit: FoodUnit,
    pub daily_amount: f64,
    pub daily_amount_unit: FoodUnit,
    #[validate(length(max = 120))]
    pub brand_name: Option<String>,
    #[validate(length(max = 120))]
    pub product_name: Option<String>,
    pub date_started: NaiveDate,
}

/// DTO for creating a wet-food supply (a case of cans or pouches).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewWetSupply {
    pub unit_count: i32,
    pub quantity_per_unit: f64,
    pub quantity_per_unit_unit: FoodUnit,
    pub daily_amount: f64,
    pub daily_amount_unit: FoodUnit,
    #[validate(length(max = 120))]
    pub brand_name: Option<String>,
    #[validate(length(max = 120))]
    pub product_name: Option<String>,
    pub date_started: NaiveDate,
}

/// Category-tagged creation input. Making the categories separate variants
/// keeps the other category's fields unrepresentable rather than nullable.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum NewSupply {
    Dry(NewDrySupply),
    Wet(NewWetSupply),
}

impl NewSupply {
    pub fn category(&self) -> FoodCategory {
        match self {
            Self::Dry(_) => FoodCategory::Dry,
            Self::Wet(_) => FoodCategory::Wet,
        }
    }

    pub fn date_started(&self) -> NaiveDate {
        match self {
            Self::Dry(d) => d.date_started,
            Self::Wet(w) => w.date_started,
        }
    }

    /// Category-specific quantities as the domain variant.
    pub fn kind(&self) -> SupplyKind {
        match self {
            Self::Dry(d) => SupplyKind::Dry {
                total_quantity: d.total_quantity,
                total_quantity_unit: d.total_quantity_unit,
                daily_amount: d.daily_amount,
                daily_amount_unit: d.daily_amount_unit,
            },
            Self::Wet(w) => SupplyKind::Wet {
                unit_count: w.unit_count,
                quantity_per_unit: w.quantity_per_unit,
                quantity_per_unit_unit: w.quantity_per_unit_unit,
                daily_amount: w.daily_amount,
                daily_amount_unit: w.daily_amount_unit,
            },
        }
    }

    pub fn validate_shape(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            Self::Dry(d) => d.validate(),
            Self::Wet(w) => w.validate(),
        }
    }

    /// Flatten into the wide-row insert shape, with the other category's
    /// columns forced to null and names normalized.
    pub fn to_insert(&self, pet_id: DbId) -> InsertSupply {
        use pawtrack_core::validation::normalize_name;

        let (brand_name, product_name) = match self {
            Self::Dry(d) => (d.brand_name.clone(), d.product_name.clone()),
            Self::Wet(w) => (w.brand_name.clone(), w.product_name.clone()),
        };

        let mut insert = InsertSupply {
            pet_id,
            category: self.category(),
            total_quantity: None,
            total_quantity_unit: None,
            unit_count: None,
            quantity_per_unit: None,
            quantity_per_unit_unit: None,
            daily_amount: 0.0,
            daily_amount_unit: "",
            brand_name: normalize_name(brand_name),
            product_name: normalize_name(product_name),
            date_started: self.date_started(),
        };

        match self {
            Self::Dry(d) => {
                insert.total_quantity = Some(d.total_quantity);
                insert.total_quantity_unit = Some(d.total_quantity_unit.as_str());
                insert.daily_amount = d.daily_amount;
                insert.daily_amount_unit = d.daily_amount_unit.as_str();
            }
            Self::Wet(w) => {
                insert.unit_count = Some(w.unit_count);
                insert.quantity_per_unit = Some(w.quantity_per_unit);
                insert.quantity_per_unit_unit = Some(w.quantity_per_unit_unit.as_str());
                insert.daily_amount = w.daily_amount;
                insert.daily_amount_unit = w.daily_amount_unit.as_str();
            }
        }

        insert
    }
}

/// Wide-row insert shape consumed by the repository.
#[derive(Debug, Clone)]
pub struct InsertSupply {
    pub pet_id: DbId,
    pub category: FoodCategory,
    pub total_quantity: Option<f64>,
    pub total_quantity_unit: Option<&'static str>,
    pub unit_count: Option<i32>,
    pub quantity_per_unit: Option<f64>,
    pub quantity_per_unit_unit: Option<&'static str>,
    pub daily_amount: f64,
    pub daily_amount_unit: &'static str,
    pub brand_name: Option<String>,
    pub product_name: Option<String>,
    pub date_started: NaiveDate,
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Partial update of an active supply. Absent fields pass through
/// unchanged; the owning pet, category, and start date are immutable.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SupplyChanges {
    pub total_quantity: Option<f64>,
    pub total_quantity_unit: Option<FoodUnit>,
    pub unit_count: Option<i32>,
    pub quantity_per_unit: Option<f64>,
    pub quantity_per_unit_unit: Option<FoodUnit>,
    pub daily_amount: Option<f64>,
    pub daily_amount_unit: Option<FoodUnit>,
    #[validate(length(max = 120))]
    pub brand_name: Option<String>,
    #[validate(length(max = 120))]
    pub product_name: Option<String>,
}

impl SupplyChanges {
    pub fn validate_shape(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self.total_quantity.is_none()
            && self.total_quantity_unit.is_none()
            && self.unit_count.is_none()
            && self.quantity_per_unit.is_none()
            && self.quantity_per_unit_unit.is_none()
            && self.daily_amount.is_none()
            && self.daily_amount_unit.is_none()
            && self.brand_name.is_none()
            && self.product_name.is_none()
    }

    /// True when any dry-only field is present.
    pub fn touches_dry_fields(&self) -> bool {
        self.total_quantity.is_some() || self.total_quantity_unit.is_some()
    }

    /// True when any wet-only field is present.
    pub fn touches_wet_fields(&self) -> bool {
        self.unit_count.is_some()
            || self.quantity_per_unit.is_some()
            || self.quantity_per_unit_unit.is_some()
    }

    /// Apply the present fields on top of an existing record's quantities,
    /// returning the merged variant for re-validation. Fields belonging to
    /// the other category are a validation error, not a silent no-op.
    pub fn merged_kind(&self, current: &SupplyKind) -> Result<SupplyKind, CoreError> {
        match *current {
            SupplyKind::Dry {
                total_quantity,
                total_quantity_unit,
                daily_amount,
                daily_amount_unit,
            } => {
                if self.touches_wet_fields() {
                    return Err(CoreError::Validation(
                        "unit_count and quantity_per_unit do not apply to dry supplies".into(),
                    ));
                }
                Ok(SupplyKind::Dry {
                    total_quantity: self.total_quantity.unwrap_or(total_quantity),
                    total_quantity_unit: self.total_quantity_unit.unwrap_or(total_quantity_unit),
                    daily_amount: self.daily_amount.unwrap_or(daily_amount),
                    daily_amount_unit: self.daily_amount_unit.unwrap_or(daily_amount_unit),
                })
            }
            SupplyKind::Wet {
                unit_count,
                quantity_per_unit,
                quantity_per_unit_unit,
                daily_amount,
                daily_amount_unit,
            } => {
                if self.touches_dry_fields() {
                    return Err(CoreError::Validation(
                        "total_quantity does not apply to wet supplies".into(),
                    ));
                }
                Ok(SupplyKind::Wet {
                    unit_count: self.unit_count.unwrap_or(unit_count),
                    quantity_per_unit: self.quantity_per_unit.unwrap_or(quantity_per_unit),
                    quantity_per_unit_unit: self
                        .quantity_per_unit_unit
                        .unwrap_or(quantity_per_unit_unit),
                    daily_amount: self.daily_amount.unwrap_or(daily_amount),
                    daily_amount_unit: self.daily_amount_unit.unwrap_or(daily_amount_unit),
                })
            }
        }
    }
}
