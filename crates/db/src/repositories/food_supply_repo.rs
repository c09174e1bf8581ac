//! Repository for the `food_supplies` table.
//!
//! The partial unique index `uq_food_supplies_one_active` on
//! `(pet_id, category) WHERE is_active` serializes concurrent creates for
//! the same pet and category, and the state transitions are conditional
//! updates, so exactly one of any set of racing callers wins.

use chrono::NaiveDate;
use sqlx::PgPool;

use pawtrack_core::types::DbId;

use crate::models::food_supply::{FoodSupply, InsertSupply, SupplyChanges};

/// Column list for `food_supplies` queries.
const COLUMNS: &str = "\
    id, pet_id, category, total_quantity, total_quantity_unit, \
    unit_count, quantity_per_unit, quantity_per_unit_unit, \
    daily_amount, daily_amount_unit, brand_name, product_name, \
    date_started, date_finished, is_active, created_at, updated_at";

/// Provides CRUD and lifecycle operations for food supplies.
pub struct FoodSupplyRepo;

impl FoodSupplyRepo {
    /// Insert a new active supply, returning the full row.
    ///
    /// A concurrent duplicate for the same `(pet_id, category)` fails with
    /// a unique-constraint violation from `uq_food_supplies_one_active`.
    pub async fn create(pool: &PgPool, input: &InsertSupply) -> Result<FoodSupply, sqlx::Error> {
        let query = format!(
            "INSERT INTO food_supplies \
                (pet_id, category, total_quantity, total_quantity_unit, \
                 unit_count, quantity_per_unit, quantity_per_unit_unit, \
                 daily_amount, daily_amount_unit, brand_name, product_name, \
                 date_started) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FoodSupply>(&query)
            .bind(input.pet_id)
            .bind(input.category.as_str())
            .bind(input.total_quantity)
            .bind(input.total_quantity_unit)
            .bind(input.unit_count)
            .bind(input.quantity_per_unit)
            .bind(input.quantity_per_unit_unit)
            .bind(input.daily_amount)
            .bind(input.daily_amount_unit)
            .bind(&input.brand_name)
            .bind(&input.product_name)
            .bind(input.date_started)
            .fetch_one(pool)
            .await
    }

    /// Find a supply by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FoodSupply>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM food_supplies WHERE id = $1");
        sqlx::query_as::<_, FoodSupply>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the active supply of a category for a pet, if any.
    pub async fn find_active(
        pool: &PgPool,
        pet_id: DbId,
        category: &str,
    ) -> Result<Option<FoodSupply>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM food_supplies \
             WHERE pet_id = $1 AND category = $2 AND is_active = TRUE"
        );
        sqlx::query_as::<_, FoodSupply>(&query)
            .bind(pet_id)
            .bind(category)
            .fetch_optional(pool)
            .await
    }

    /// List a pet's active supplies (at most one per category).
    pub async fn list_active(pool: &PgPool, pet_id: DbId) -> Result<Vec<FoodSupply>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM food_supplies \
             WHERE pet_id = $1 AND is_active = TRUE \
             ORDER BY date_started DESC"
        );
        sqlx::query_as::<_, FoodSupply>(&query)
            .bind(pet_id)
            .fetch_all(pool)
            .await
    }

    /// List all of a pet's supplies, newest first.
    pub async fn list_all(pool: &PgPool, pet_id: DbId) -> Result<Vec<FoodSupply>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM food_supplies \
             WHERE pet_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, FoodSupply>(&query)
            .bind(pet_id)
            .fetch_all(pool)
            .await
    }

    /// List a pet's finished supplies, most recently finished first.
    ///
    /// History is never pruned from storage; only this read path bounds
    /// what is surfaced.
    pub async fn list_finished(
        pool: &PgPool,
        pet_id: DbId,
        limit: i64,
    ) -> Result<Vec<FoodSupply>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM food_supplies \
             WHERE pet_id = $1 AND is_active = FALSE AND date_finished IS NOT NULL \
             ORDER BY date_finished DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, FoodSupply>(&query)
            .bind(pet_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Partially update an active supply. Returns the updated row, or
    /// `None` when no active row with the given `id` exists.
    pub async fn update_fields(
        pool: &PgPool,
        id: DbId,
        changes: &SupplyChanges,
    ) -> Result<Option<FoodSupply>, sqlx::Error> {
        let query = format!(
            "UPDATE food_supplies SET \
                total_quantity = COALESCE($2, total_quantity), \
                total_quantity_unit = COALESCE($3, total_quantity_unit), \
                unit_count = COALESCE($4, unit_count), \
                quantity_per_unit = COALESCE($5, quantity_per_unit), \
                quantity_per_unit_unit = COALESCE($6, quantity_per_unit_unit), \
                daily_amount = COALESCE($7, daily_amount), \
                daily_amount_unit = COALESCE($8, daily_amount_unit), \
                brand_name = COALESCE($9, brand_name), \
                product_name = COALESCE($10, product_name), \
                updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FoodSupply>(&query)
            .bind(id)
            .bind(changes.total_quantity)
            .bind(changes.total_quantity_unit.map(|u| u.as_str()))
            .bind(changes.unit_count)
            .bind(changes.quantity_per_unit)
            .bind(changes.quantity_per_unit_unit.map(|u| u.as_str()))
            .bind(changes.daily_amount)
            .bind(changes.daily_amount_unit.map(|u| u.as_str()))
            .bind(&changes.brand_name)
            .bind(&changes.product_name)
            .fetch_optional(pool)
            .await
    }

    /// Finish an active supply: flip `is_active` and stamp the finish date
    /// in one conditional update. Returns `None` when no active row with
    /// the given `id` exists, so concurrent callers get exactly one win.
    pub async fn mark_finished(
        pool: &PgPool,
        id: DbId,
        finished_on: NaiveDate,
    ) -> Result<Option<FoodSupply>, sqlx::Error> {
        let query = format!(
            "UPDATE food_supplies SET \
                is_active = FALSE, \
                date_finished = $2, \
                updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FoodSupply>(&query)
            .bind(id)
            .bind(finished_on)
            .fetch_optional(pool)
            .await
    }

    /// Correct the finish date of an already-finished supply. Returns
    /// `None` when the row is missing or still active.
    pub async fn set_finish_date(
        pool: &PgPool,
        id: DbId,
        finished_on: NaiveDate,
    ) -> Result<Option<FoodSupply>, sqlx::Error> {
        let query = format!(
            "UPDATE food_supplies SET \
                date_finished = $2, \
                updated_at = NOW() \
             WHERE id = $1 AND is_active = FALSE AND date_finished IS NOT NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FoodSupply>(&query)
            .bind(id)
            .bind(finished_on)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a supply in any state. Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM food_supplies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
