//! Food Service: validation, ownership, lifecycle, and enrichment.
//!
//! Every operation runs the same sequence: validate the input, verify the
//! caller owns the pet, touch storage, then enrich with the pure
//! calculators. Failures are synchronous and final; nothing here retries,
//! and no lock is held outside the store's own statements.

use std::sync::Arc;

use serde::Serialize;

use chrono::NaiveDate;

use pawtrack_core::error::CoreError;
use pawtrack_core::projection::{project_remaining, RemainingSupply};
use pawtrack_core::reconciliation::{reconcile_consumption, ConsumptionReport};
use pawtrack_core::types::DbId;
use pawtrack_core::validation::{
    clamp_limit, normalize_name, validate_date_started, validate_finish_date, validate_id,
    validate_supply_kind, FINISHED_HISTORY_DEFAULT_LIMIT, FINISHED_HISTORY_MAX_LIMIT,
};
use pawtrack_db::models::food_supply::{FoodSupply, NewSupply, SupplyChanges};

use crate::clock::{Clock, SystemClock};
use crate::store::{duplicate_active_message, PetOwnership, SupplyStore};

// ---------------------------------------------------------------------------
// Enriched read shapes
// ---------------------------------------------------------------------------

/// A supply with its remaining-supply projection, as surfaced by the
/// active/all/by-id read paths.
#[derive(Debug, Clone, Serialize)]
pub struct SupplyWithProjection {
    #[serde(flatten)]
    pub supply: FoodSupply,
    pub remaining: RemainingSupply,
}

/// A finished supply with its consumption report, as surfaced by the
/// finished-history read path.
#[derive(Debug, Clone, Serialize)]
pub struct SupplyWithReport {
    #[serde(flatten)]
    pub supply: FoodSupply,
    pub report: ConsumptionReport,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Stateless orchestrator over the storage, ownership, and clock
/// collaborators.
pub struct FoodService {
    store: Arc<dyn SupplyStore>,
    pets: Arc<dyn PetOwnership>,
    clock: Arc<dyn Clock>,
}

impl FoodService {
    pub fn new(store: Arc<dyn SupplyStore>, pets: Arc<dyn PetOwnership>) -> Self {
        Self::with_clock(store, pets, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn SupplyStore>,
        pets: Arc<dyn PetOwnership>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, pets, clock }
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    /// Create a new active supply for a pet.
    ///
    /// Fails with `Conflict` when the pet already has an active supply of
    /// the same category. The pre-check below gives the friendly message;
    /// the partial unique index behind the store settles races, so two
    /// concurrent creates still produce exactly one success.
    pub async fn create_supply(
        &self,
        user_id: DbId,
        pet_id: DbId,
        new: NewSupply,
    ) -> Result<FoodSupply, CoreError> {
        validate_id(pet_id, "pet_id")?;
        new.validate_shape().map_err(shape_error)?;
        validate_supply_kind(&new.kind())?;
        validate_date_started(new.date_started(), self.clock.today())?;

        self.pets.verify_ownership(pet_id, user_id).await?;

        let category = new.category();
        if self.store.find_active(pet_id, category).await?.is_some() {
            return Err(CoreError::Conflict(duplicate_active_message(category)));
        }

        let created = self.store.insert(&new.to_insert(pet_id)).await?;
        tracing::info!(
            pet_id,
            supply_id = created.id,
            category = %category,
            "food supply created"
        );
        Ok(created)
    }

    // -----------------------------------------------------------------------
    // Read
    // -----------------------------------------------------------------------

    /// Fetch one supply with its remaining-supply projection. The
    /// projection is display-only and computed for finished records too.
    pub async fn get_supply(
        &self,
        user_id: DbId,
        id: DbId,
    ) -> Result<SupplyWithProjection, CoreError> {
        let row = self.fetch_owned(user_id, id).await?;
        self.project(row)
    }

    /// A pet's active supplies (at most one per category), each with its
    /// projection.
    pub async fn list_active_supplies(
        &self,
        user_id: DbId,
        pet_id: DbId,
    ) -> Result<Vec<SupplyWithProjection>, CoreError> {
        validate_id(pet_id, "pet_id")?;
        self.pets.verify_ownership(pet_id, user_id).await?;

        let rows = self.store.list_active(pet_id).await?;
        rows.into_iter().map(|row| self.project(row)).collect()
    }

    /// All of a pet's supplies, newest first, each with its projection.
    pub async fn list_all_supplies(
        &self,
        user_id: DbId,
        pet_id: DbId,
    ) -> Result<Vec<SupplyWithProjection>, CoreError> {
        validate_id(pet_id, "pet_id")?;
        self.pets.verify_ownership(pet_id, user_id).await?;

        let rows = self.store.list_all(pet_id).await?;
        rows.into_iter().map(|row| self.project(row)).collect()
    }

    /// A pet's finished supplies with their consumption reports, most
    /// recently finished first. `limit` is clamped to 1..=100 and defaults
    /// to 5; storage history is never pruned, only the read is bounded.
    pub async fn list_finished_supplies(
        &self,
        user_id: DbId,
        pet_id: DbId,
        limit: Option<i64>,
    ) -> Result<Vec<SupplyWithReport>, CoreError> {
        validate_id(pet_id, "pet_id")?;
        self.pets.verify_ownership(pet_id, user_id).await?;

        let limit = clamp_limit(
            limit,
            FINISHED_HISTORY_DEFAULT_LIMIT,
            FINISHED_HISTORY_MAX_LIMIT,
        );
        let rows = self.store.list_finished(pet_id, limit).await?;
        rows.into_iter()
            .map(|row| {
                let record = row.to_record()?;
                let report = reconcile_consumption(&record)?;
                Ok(SupplyWithReport { supply: row, report })
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    /// Partially update an active supply. Absent fields pass through
    /// unchanged; present ones are re-validated against the merged result.
    pub async fn update_supply(
        &self,
        user_id: DbId,
        id: DbId,
        changes: SupplyChanges,
    ) -> Result<FoodSupply, CoreError> {
        validate_id(id, "id")?;
        if changes.is_empty() {
            return Err(CoreError::Validation(
                "at least one field must be provided".into(),
            ));
        }
        changes.validate_shape().map_err(shape_error)?;

        let row = self.fetch_owned(user_id, id).await?;
        if !row.is_active {
            return Err(CoreError::Conflict(
                "a finished supply can no longer be modified".into(),
            ));
        }

        let record = row.to_record()?;
        validate_supply_kind(&changes.merged_kind(&record.kind)?)?;

        let mut changes = changes;
        changes.brand_name = normalize_name(changes.brand_name.take());
        changes.product_name = normalize_name(changes.product_name.take());

        match self.store.update_fields(id, &changes).await? {
            Some(updated) => Ok(updated),
            // The row was finished or deleted between the fetch and the
            // write; treat it like the fetch had missed.
            None => Err(not_found(id)),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Finish an active supply as of today. Terminal: a finished supply
    /// never becomes active again. Of N concurrent calls exactly one
    /// succeeds; the rest see `Conflict`.
    pub async fn mark_finished(&self, user_id: DbId, id: DbId) -> Result<FoodSupply, CoreError> {
        let row = self.fetch_owned(user_id, id).await?;
        if !row.is_active {
            return Err(already_finished());
        }

        match self.store.mark_finished(id, self.clock.today()).await? {
            Some(finished) => {
                tracing::info!(
                    pet_id = finished.pet_id,
                    supply_id = finished.id,
                    date_finished = %finished.date_finished.unwrap_or_default(),
                    "food supply finished"
                );
                Ok(finished)
            }
            // Lost the race to another finish call.
            None => Err(already_finished()),
        }
    }

    /// Correct the finish date of a finished supply. The new date must lie
    /// within `[date_started, today]`; `is_active` is untouched.
    pub async fn update_finish_date(
        &self,
        user_id: DbId,
        id: DbId,
        new_date: NaiveDate,
    ) -> Result<FoodSupply, CoreError> {
        let row = self.fetch_owned(user_id, id).await?;
        if row.is_active {
            return Err(CoreError::Conflict(
                "only a finished supply's finish date can be corrected".into(),
            ));
        }
        validate_finish_date(row.date_started, new_date, self.clock.today())?;

        match self.store.set_finish_date(id, new_date).await? {
            Some(updated) => Ok(updated),
            None => Err(not_found(id)),
        }
    }

    /// Hard-delete a supply in any state. A repeated call reports
    /// `NotFound`.
    pub async fn delete_supply(&self, user_id: DbId, id: DbId) -> Result<(), CoreError> {
        let row = self.fetch_owned(user_id, id).await?;

        if self.store.delete(id).await? {
            tracing::info!(pet_id = row.pet_id, supply_id = id, "food supply deleted");
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Fetch a supply and verify the caller owns its pet. An ownership
    /// miss is reported as the supply not existing, so non-owners cannot
    /// probe for ids.
    async fn fetch_owned(&self, user_id: DbId, id: DbId) -> Result<FoodSupply, CoreError> {
        validate_id(id, "id")?;
        let row = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        self.pets
            .verify_ownership(row.pet_id, user_id)
            .await
            .map_err(|err| match err {
                CoreError::NotFound { .. } => not_found(id),
                other => other,
            })?;

        Ok(row)
    }

    fn project(&self, row: FoodSupply) -> Result<SupplyWithProjection, CoreError> {
        let record = row.to_record()?;
        let remaining = project_remaining(&record, self.clock.today());
        Ok(SupplyWithProjection {
            supply: row,
            remaining,
        })
    }
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "food supply",
        id,
    }
}

fn already_finished() -> CoreError {
    CoreError::Conflict("this supply is already finished".into())
}

fn shape_error<E: std::fmt::Display>(errors: E) -> CoreError {
    CoreError::Validation(errors.to_string())
}
