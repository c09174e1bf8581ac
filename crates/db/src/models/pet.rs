//! Pet entity model.
//!
//! Pet CRUD lives outside this workspace; the row here exists so the
//! ownership check has something to probe against.

use serde::Serialize;
use sqlx::FromRow;

use pawtrack_core::types::{DbId, Timestamp};

/// A row from the `pets` table. `user_id` is the owner identifier issued
/// by the authentication layer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Pet {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
