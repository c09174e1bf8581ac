use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Missing, or not owned by the caller. The two cases are deliberately
    /// indistinguishable so non-owners learn nothing about existence.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unexpected storage-layer failure, surfaced opaquely.
    #[error("Internal error: {0}")]
    Internal(String),
}
