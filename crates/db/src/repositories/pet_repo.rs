//! Repository for the `pets` table (ownership probe only; pet CRUD is
//! handled outside this workspace).

use sqlx::PgPool;

use pawtrack_core::types::DbId;

pub struct PetRepo;

impl PetRepo {
    /// Whether a pet exists and belongs to the given user. Missing pet and
    /// foreign pet are indistinguishable on purpose.
    pub async fn exists_owned(
        pool: &PgPool,
        pet_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM pets WHERE id = $1 AND user_id = $2")
                .bind(pet_id)
                .bind(user_id)
                .fetch_optional(pool)
                .await?;
        Ok(row.is_some())
    }
}
