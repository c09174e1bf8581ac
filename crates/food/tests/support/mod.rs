//! In-memory collaborators for exercising the service without a database.
//!
//! `MemoryStore` provides the same guarantees the Postgres store gets from
//! its partial unique index and conditional updates: every operation runs
//! under one async mutex, so check-then-insert and the finish transition
//! are atomic and concurrent callers get exactly one winner.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;

use pawtrack_core::error::CoreError;
use pawtrack_core::types::DbId;
use pawtrack_core::units::{FoodCategory, FoodUnit};
use pawtrack_db::models::food_supply::{
    FoodSupply, InsertSupply, NewDrySupply, NewSupply, NewWetSupply, SupplyChanges,
};
use pawtrack_food::clock::Clock;
use pawtrack_food::store::{duplicate_active_message, PetOwnership, SupplyStore};

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: DbId,
    rows: BTreeMap<DbId, FoodSupply>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of active rows for one pet and category, for invariant checks.
    pub async fn active_count(&self, pet_id: DbId, category: FoodCategory) -> usize {
        let inner = self.inner.lock().await;
        inner
            .rows
            .values()
            .filter(|r| r.pet_id == pet_id && r.category == category.as_str() && r.is_active)
            .count()
    }
}

#[async_trait]
impl SupplyStore for MemoryStore {
    async fn insert(&self, input: &InsertSupply) -> Result<FoodSupply, CoreError> {
        let mut inner = self.inner.lock().await;

        let duplicate = inner.rows.values().any(|r| {
            r.pet_id == input.pet_id && r.category == input.category.as_str() && r.is_active
        });
        if duplicate {
            return Err(CoreError::Conflict(duplicate_active_message(input.category)));
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();
        let row = FoodSupply {
            id,
            pet_id: input.pet_id,
            category: input.category.as_str().to_string(),
            total_quantity: input.total_quantity,
            total_quantity_unit: input.total_quantity_unit.map(str::to_string),
            unit_count: input.unit_count,
            quantity_per_unit: input.quantity_per_unit,
            quantity_per_unit_unit: input.quantity_per_unit_unit.map(str::to_string),
            daily_amount: input.daily_amount,
            daily_amount_unit: input.daily_amount_unit.to_string(),
            brand_name: input.brand_name.clone(),
            product_name: input.product_name.clone(),
            date_started: input.date_started,
            date_finished: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<FoodSupply>, CoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.rows.get(&id).cloned())
    }

    async fn find_active(
        &self,
        pet_id: DbId,
        category: FoodCategory,
    ) -> Result<Option<FoodSupply>, CoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .rows
            .values()
            .find(|r| r.pet_id == pet_id && r.category == category.as_str() && r.is_active)
            .cloned())
    }

    async fn list_active(&self, pet_id: DbId) -> Result<Vec<FoodSupply>, CoreError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<FoodSupply> = inner
            .rows
            .values()
            .filter(|r| r.pet_id == pet_id && r.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date_started.cmp(&a.date_started));
        Ok(rows)
    }

    async fn list_all(&self, pet_id: DbId) -> Result<Vec<FoodSupply>, CoreError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<FoodSupply> = inner
            .rows
            .values()
            .filter(|r| r.pet_id == pet_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn list_finished(
        &self,
        pet_id: DbId,
        limit: i64,
    ) -> Result<Vec<FoodSupply>, CoreError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<FoodSupply> = inner
            .rows
            .values()
            .filter(|r| r.pet_id == pet_id && !r.is_active && r.date_finished.is_some())
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date_finished.cmp(&a.date_finished));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn update_fields(
        &self,
        id: DbId,
        changes: &SupplyChanges,
    ) -> Result<Option<FoodSupply>, CoreError> {
        let mut inner = self.inner.lock().await;
        let Some(row) = inner.rows.get_mut(&id).filter(|r| r.is_active) else {
            return Ok(None);
        };

        if let Some(v) = changes.total_quantity {
            row.total_quantity = Some(v);
        }
        if let Some(u) = changes.total_quantity_unit {
            row.total_quantity_unit = Some(u.as_str().to_string());
        }
        if let Some(v) = changes.unit_count {
            row.unit_count = Some(v);
        }
        if let Some(v) = changes.quantity_per_unit {
            row.quantity_per_unit = Some(v);
        }
        if let Some(u) = changes.quantity_per_unit_unit {
            row.quantity_per_unit_unit = Some(u.as_str().to_string());
        }
        if let Some(v) = changes.daily_amount {
            row.daily_amount = v;
        }
        if let Some(u) = changes.daily_amount_unit {
            row.daily_amount_unit = u.as_str().to_string();
        }
        if let Some(v) = &changes.brand_name {
            row.brand_name = Some(v.clone());
        }
        if let Some(v) = &changes.product_name {
            row.product_name = Some(v.clone());
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn mark_finished(
        &self,
        id: DbId,
        finished_on: NaiveDate,
    ) -> Result<Option<FoodSupply>, CoreError> {
        let mut inner = self.inner.lock().await;
        let Some(row) = inner.rows.get_mut(&id).filter(|r| r.is_active) else {
            return Ok(None);
        };
        row.is_active = false;
        row.date_finished = Some(finished_on);
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn set_finish_date(
        &self,
        id: DbId,
        finished_on: NaiveDate,
    ) -> Result<Option<FoodSupply>, CoreError> {
        let mut inner = self.inner.lock().await;
        let Some(row) = inner
            .rows
            .get_mut(&id)
            .filter(|r| !r.is_active && r.date_finished.is_some())
        else {
            return Ok(None);
        };
        row.date_finished = Some(finished_on);
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: DbId) -> Result<bool, CoreError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.rows.remove(&id).is_some())
    }
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

pub struct StaticOwnership {
    owners: HashMap<DbId, DbId>,
}

impl StaticOwnership {
    /// `(pet_id, user_id)` pairs.
    pub fn new(pairs: &[(DbId, DbId)]) -> Self {
        Self {
            owners: pairs.iter().copied().collect(),
        }
    }
}

#[async_trait]
impl PetOwnership for StaticOwnership {
    async fn verify_ownership(&self, pet_id: DbId, user_id: DbId) -> Result<(), CoreError> {
        match self.owners.get(&pet_id) {
            Some(owner) if *owner == user_id => Ok(()),
            _ => Err(CoreError::NotFound {
                entity: "pet",
                id: pet_id,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// A pinned calendar that tests can advance.
pub struct FixedClock {
    today: StdMutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: StdMutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        *self.today.lock().unwrap() = today;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// Input builders
// ---------------------------------------------------------------------------

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2 kg bag at 100 g/day.
pub fn dry_input(started: NaiveDate) -> NewSupply {
    NewSupply::Dry(NewDrySupply {
        total_quantity: 2.0,
        total_quantity_unit: FoodUnit::Kilograms,
        daily_amount: 100.0,
        daily_amount_unit: FoodUnit::Grams,
        brand_name: Some("Acme".into()),
        product_name: Some("Kibble".into()),
        date_started: started,
    })
}

/// 12 cans of 85 g at 170 g/day.
pub fn wet_input(started: NaiveDate) -> NewSupply {
    NewSupply::Wet(NewWetSupply {
        unit_count: 12,
        quantity_per_unit: 85.0,
        quantity_per_unit_unit: FoodUnit::Grams,
        daily_amount: 170.0,
        daily_amount_unit: FoodUnit::Grams,
        brand_name: None,
        product_name: None,
        date_started: started,
    })
}
