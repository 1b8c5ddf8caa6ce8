//! Entity store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by an [`EntityStore`](super::EntityStore).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// No record with the requested id.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// A field is malformed or out of range.
    #[error("{0}")]
    Validation(String),

    /// A destructive operation was attempted without `confirm=true`.
    #[error("Deleting {entity} {id} requires confirmation. Set confirm=true")]
    ConfirmationRequired { entity: &'static str, id: u64 },

    /// The persistence backend rejected a write or returned unreadable data.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl StoreError {
    /// Create a "not found" error.
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a persistence error.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}
