//! Inbound port. HTTP (adapter) calls into the application.

use crate::domain::{DomainError, Todo, TodoChanges, TodoDraft};

/// Todo use cases as seen by driving adapters.
#[async_trait::async_trait]
pub trait TodoUseCase: Send + Sync {
    async fn get_all_todos(&self) -> Result<Vec<Todo>, DomainError>;

    async fn get_todo_by_id(&self, id: i64) -> Result<Todo, DomainError>;

    async fn create_todo(&self, draft: TodoDraft) -> Result<Todo, DomainError>;

    async fn update_todo(&self, id: i64, changes: TodoChanges) -> Result<Todo, DomainError>;

    async fn delete_todo(&self, id: i64) -> Result<(), DomainError>;
}
