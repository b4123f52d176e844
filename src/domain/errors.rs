//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Caller data violates a precondition (non-positive id, empty title, bad priority).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Todo {0} not found")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Never surfaced by the todo use case; notification failures are absorbed there.
    #[error("Notification error: {0}")]
    Notification(String),
}
