//! Storage and ownership collaborator contracts, with their Postgres
//! implementations.
//!
//! The engine only ever talks to these traits. The Postgres adapters
//! delegate to the `pawtrack_db` repositories and translate storage
//! errors into the domain error kinds; everything unexpected stays an
//! opaque internal error.

use async_trait::async_trait;
use chrono::NaiveDate;

use pawtrack_core::error::CoreError;
use pawtrack_core::types::DbId;
use pawtrack_core::units::FoodCategory;
use pawtrack_db::models::food_supply::{FoodSupply, InsertSupply, SupplyChanges};
use pawtrack_db::repositories::{FoodSupplyRepo, PetRepo};
use pawtrack_db::DbPool;

/// Name of the partial unique index that serializes concurrent creates
/// for the same `(pet_id, category)`.
const ONE_ACTIVE_INDEX: &str = "uq_food_supplies_one_active";

/// User-facing message for a duplicate active supply. Worded per category.
pub fn duplicate_active_message(category: FoodCategory) -> String {
    format!(
        "this pet already has an active {} supply; finish it before adding another",
        category.label()
    )
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Persistence contract for supply records.
///
/// Implementations must provide the uniqueness and conditional-update
/// guarantees the engine relies on: inserts racing on the same
/// `(pet_id, category)` yield exactly one success, and the transition
/// methods only match rows in the expected state.
#[async_trait]
pub trait SupplyStore: Send + Sync {
    /// Insert a new active supply. A concurrent duplicate for the same
    /// pet and category fails with `Conflict`.
    async fn insert(&self, input: &InsertSupply) -> Result<FoodSupply, CoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<FoodSupply>, CoreError>;

    async fn find_active(
        &self,
        pet_id: DbId,
        category: FoodCategory,
    ) -> Result<Option<FoodSupply>, CoreError>;

    async fn list_active(&self, pet_id: DbId) -> Result<Vec<FoodSupply>, CoreError>;

    async fn list_all(&self, pet_id: DbId) -> Result<Vec<FoodSupply>, CoreError>;

    /// Finished supplies, most recently finished first, at most `limit`.
    async fn list_finished(&self, pet_id: DbId, limit: i64)
        -> Result<Vec<FoodSupply>, CoreError>;

    /// Partial update of an active row; `None` when no active row matches.
    async fn update_fields(
        &self,
        id: DbId,
        changes: &SupplyChanges,
    ) -> Result<Option<FoodSupply>, CoreError>;

    /// Conditional finish transition; `None` when no active row matches.
    async fn mark_finished(
        &self,
        id: DbId,
        finished_on: NaiveDate,
    ) -> Result<Option<FoodSupply>, CoreError>;

    /// Conditional finish-date correction; `None` unless the row exists
    /// and is already finished.
    async fn set_finish_date(
        &self,
        id: DbId,
        finished_on: NaiveDate,
    ) -> Result<Option<FoodSupply>, CoreError>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete(&self, id: DbId) -> Result<bool, CoreError>;
}

/// Ownership check performed before any operation touching a pet.
#[async_trait]
pub trait PetOwnership: Send + Sync {
    /// `Ok` when the pet exists and belongs to the user; missing pet and
    /// foreign pet both come back as `NotFound`.
    async fn verify_ownership(&self, pet_id: DbId, user_id: DbId) -> Result<(), CoreError>;
}

// ---------------------------------------------------------------------------
// Postgres adapters
// ---------------------------------------------------------------------------

/// `SupplyStore` backed by the `food_supplies` table.
#[derive(Clone)]
pub struct PgSupplyStore {
    pool: DbPool,
}

impl PgSupplyStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SupplyStore for PgSupplyStore {
    async fn insert(&self, input: &InsertSupply) -> Result<FoodSupply, CoreError> {
        FoodSupplyRepo::create(&self.pool, input)
            .await
            .map_err(|err| classify_insert_error(err, input.category))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<FoodSupply>, CoreError> {
        FoodSupplyRepo::find_by_id(&self.pool, id)
            .await
            .map_err(internal)
    }

    async fn find_active(
        &self,
        pet_id: DbId,
        category: FoodCategory,
    ) -> Result<Option<FoodSupply>, CoreError> {
        FoodSupplyRepo::find_active(&self.pool, pet_id, category.as_str())
            .await
            .map_err(internal)
    }

    async fn list_active(&self, pet_id: DbId) -> Result<Vec<FoodSupply>, CoreError> {
        FoodSupplyRepo::list_active(&self.pool, pet_id)
            .await
            .map_err(internal)
    }

    async fn list_all(&self, pet_id: DbId) -> Result<Vec<FoodSupply>, CoreError> {
        FoodSupplyRepo::list_all(&self.pool, pet_id)
            .await
            .map_err(internal)
    }

    async fn list_finished(
        &self,
        pet_id: DbId,
        limit: i64,
    ) -> Result<Vec<FoodSupply>, CoreError> {
        FoodSupplyRepo::list_finished(&self.pool, pet_id, limit)
            .await
            .map_err(internal)
    }

    async fn update_fields(
        &self,
        id: DbId,
        changes: &SupplyChanges,
    ) -> Result<Option<FoodSupply>, CoreError> {
        FoodSupplyRepo::update_fields(&self.pool, id, changes)
            .await
            .map_err(internal)
    }

    async fn mark_finished(
        &self,
        id: DbId,
        finished_on: NaiveDate,
    ) -> Result<Option<FoodSupply>, CoreError> {
        FoodSupplyRepo::mark_finished(&self.pool, id, finished_on)
            .await
            .map_err(internal)
    }

    async fn set_finish_date(
        &self,
        id: DbId,
        finished_on: NaiveDate,
    ) -> Result<Option<FoodSupply>, CoreError> {
        FoodSupplyRepo::set_finish_date(&self.pool, id, finished_on)
            .await
            .map_err(internal)
    }

    async fn delete(&self, id: DbId) -> Result<bool, CoreError> {
        FoodSupplyRepo::delete(&self.pool, id).await.map_err(internal)
    }
}

/// `PetOwnership` backed by the `pets` table.
#[derive(Clone)]
pub struct PgPetOwnership {
    pool: DbPool,
}

impl PgPetOwnership {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PetOwnership for PgPetOwnership {
    async fn verify_ownership(&self, pet_id: DbId, user_id: DbId) -> Result<(), CoreError> {
        let owned = PetRepo::exists_owned(&self.pool, pet_id, user_id)
            .await
            .map_err(internal)?;
        if owned {
            Ok(())
        } else {
            Err(CoreError::NotFound {
                entity: "pet",
                id: pet_id,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Error translation
// ---------------------------------------------------------------------------

fn internal(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "storage error");
    CoreError::Internal(err.to_string())
}

/// A violation of the one-active index is the losing side of a create
/// race; everything else is unexpected.
fn classify_insert_error(err: sqlx::Error, category: FoodCategory) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505")
            && db_err.constraint() == Some(ONE_ACTIVE_INDEX)
        {
            return CoreError::Conflict(duplicate_active_message(category));
        }
    }
    internal(err)
}
