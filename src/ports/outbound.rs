//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    DomainError, NewTodo, NotificationRequest, NotificationResponse, Todo, TodoPatch,
};

/// Repository port. Persist todo items.
///
/// Absence is reported as `Ok(None)` for lookups and updates; only `delete`
/// turns a missing row into `DomainError::NotFound`.
#[async_trait::async_trait]
pub trait TodoRepoPort: Send + Sync {
    /// All todos, newest `created_at` first. Empty vec when there are none.
    async fn get_all(&self) -> Result<Vec<Todo>, DomainError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Todo>, DomainError>;

    /// Insert a todo. Storage assigns `id` and both timestamps; `completed` starts false.
    async fn create(&self, todo: &NewTodo) -> Result<Todo, DomainError>;

    /// Merge the set fields of `patch` into the stored row and refresh `updated_at`.
    /// Returns `None` when no row has this id.
    async fn update(&self, id: i64, patch: &TodoPatch) -> Result<Option<Todo>, DomainError>;

    /// Delete a todo. Zero affected rows is `DomainError::NotFound`, not success.
    async fn delete(&self, id: i64) -> Result<(), DomainError>;
}

/// Notification port. Outbound calls to the external notification service.
///
/// Only `send_notification` is used by the todo use case.
#[async_trait::async_trait]
pub trait NotificationPort: Send + Sync {
    async fn send_notification(
        &self,
        request: &NotificationRequest,
    ) -> Result<NotificationResponse, DomainError>;

    /// Delivery status for a previously sent notification (e.g. "sent", "delivered").
    async fn get_notification_status(&self, notification_id: &str)
    -> Result<String, DomainError>;

    async fn batch_send_notifications(
        &self,
        requests: &[NotificationRequest],
    ) -> Result<Vec<NotificationResponse>, DomainError>;
}
