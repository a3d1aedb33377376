//! Errors raised by the pure stock rules

use thiserror::Error;
use uuid::Uuid;

/// Domain rule violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },

    #[error("Stock count {0} is not pending")]
    SubmissionNotPending(Uuid),

    #[error("Unknown ingredient {0}")]
    UnknownIngredient(Uuid),

    #[error("Nothing to commit")]
    EmptyBatch,
}

impl DomainError {
    pub fn invalid(field: &'static str, message: &'static str) -> Self {
        DomainError::Invalid { field, message }
    }

    /// A quantity whose stock math overflows `Decimal`
    pub fn too_large() -> Self {
        DomainError::invalid("quantity", "Quantity is too large")
    }
}
