use crate::types::DbId;

/// Failure reported by a storage backend.
///
/// Backends translate their native errors into one of these two cases so the
/// engine can stay ignorant of the database driver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not complete the operation (connection lost, corrupt
    /// row, failed rollback).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint rejected the write.
    #[error("Duplicate record: {0}")]
    Duplicate(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A business rule rejected the caller (wrong owner, wrong status, self-swap).
    #[error("Not eligible: {0}")]
    NotEligible(String),

    /// The record is in a state that does not admit the requested transition.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Lost a compare-and-swap race. Safe to re-query and retry.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
