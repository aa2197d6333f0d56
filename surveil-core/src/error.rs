//! The core's error taxonomy (§7): callers match on kind, not on string
//! content. [`ModelError`] from `surveil-model` (invariant violations raised
//! by the entities themselves) always becomes [`CoreError::Validation`].

use surveil_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed input, out-of-range numeric fields, a forbidden state
    /// transition, or a self-comparison in `ComparePortfolios`.
    #[error("validation error: {0}")]
    Validation(String),

    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// An optimistic-concurrency check failed; the caller may retry.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A repository or cache call failed for reasons unrelated to the
    /// request's validity (timeout, connection reset, serialization bug).
    #[error("dependency error: {0}")]
    Dependency(String),

    /// Catch-all for failures that are neither the caller's fault nor a
    /// recognizable dependency failure.
    #[error("internal error: {0}")]
    Internal(String),

    /// The calling context was cancelled before the command completed.
    #[error("operation cancelled: {0}")]
    Cancelled(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl From<ModelError> for CoreError {
    fn from(err: ModelError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

impl CoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, CoreError::Conflict(_))
    }
}
