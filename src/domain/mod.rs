//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod notification;

pub use entities::{
    NewTodo, Priority, Todo, TodoChanges, TodoDraft, TodoPatch, UnknownPriority,
};
pub use errors::DomainError;
pub use notification::{NotificationKind, NotificationRequest, NotificationResponse};
