//! Food categories, quantity units, and gram conversions.
//!
//! All supply arithmetic happens in grams; conversion back to the unit a
//! supply was entered in is a display concern and applies no rounding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Conversion constants
// ---------------------------------------------------------------------------

pub const GRAMS_PER_KILOGRAM: f64 = 1000.0;
pub const GRAMS_PER_POUND: f64 = 453.592;
pub const GRAMS_PER_OUNCE: f64 = 28.3495;
/// Density proxy for one cup of dry food.
pub const GRAMS_PER_CUP: f64 = 120.0;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Food category of a supply entry. Fixed at creation, never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Dry,
    Wet,
}

impl FoodCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dry => "dry",
            Self::Wet => "wet",
        }
    }

    /// Human-readable label for user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Dry => "dry food",
            Self::Wet => "wet food",
        }
    }
}

impl FromStr for FoodCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dry" => Ok(Self::Dry),
            "wet" => Ok(Self::Wet),
            other => Err(format!("unknown food category: {other}")),
        }
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Quantity unit for supply amounts. Which units are allowed for which
/// field is enforced by `validation`; the conversion itself is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodUnit {
    #[serde(rename = "kg")]
    Kilograms,
    Pounds,
    Grams,
    #[serde(rename = "oz")]
    Ounces,
    Cups,
}

impl FoodUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kilograms => "kg",
            Self::Pounds => "pounds",
            Self::Grams => "grams",
            Self::Ounces => "oz",
            Self::Cups => "cups",
        }
    }

    /// Grams in one of this unit.
    fn grams_per_unit(self) -> f64 {
        match self {
            Self::Kilograms => GRAMS_PER_KILOGRAM,
            Self::Pounds => GRAMS_PER_POUND,
            Self::Grams => 1.0,
            Self::Ounces => GRAMS_PER_OUNCE,
            Self::Cups => GRAMS_PER_CUP,
        }
    }
}

impl FromStr for FoodUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(Self::Kilograms),
            "pounds" => Ok(Self::Pounds),
            "grams" => Ok(Self::Grams),
            "oz" => Ok(Self::Ounces),
            "cups" => Ok(Self::Cups),
            other => Err(format!("unknown quantity unit: {other}")),
        }
    }
}

impl fmt::Display for FoodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Convert a quantity in the given unit to grams.
pub fn to_grams(value: f64, unit: FoodUnit) -> f64 {
    value * unit.grams_per_unit()
}

/// Convert a quantity in grams to the given unit.
pub fn from_grams(grams: f64, unit: FoodUnit) -> f64 {
    grams / unit.grams_per_unit()
}
