//! Todo service. Business rules for todo CRUD.
//!
//! Validates input, coordinates the repository, maps "no row" outcomes to
//! `DomainError::NotFound` and fires a best-effort notification on creation.

use crate::domain::{
    DomainError, NewTodo, NotificationKind, NotificationRequest, Priority, Todo, TodoChanges,
    TodoDraft, TodoPatch,
};
use crate::ports::{NotificationPort, TodoRepoPort, TodoUseCase};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Recipient for creation notices until requests carry an authenticated user.
pub const NOTIFICATION_RECIPIENT_ID: i64 = 1;

const CREATION_NOTICE_TITLE: &str = "New todo created";

/// Todo use case. Stateless; share one instance via `Arc` across requests.
pub struct TodoService {
    repo: Arc<dyn TodoRepoPort>,
    notifier: Arc<dyn NotificationPort>,
}

impl TodoService {
    /// # Arguments
    /// * `repo` - Persistence port (required for every operation)
    /// * `notifier` - Notification port, called only after a successful create
    pub fn new(repo: Arc<dyn TodoRepoPort>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self { repo, notifier }
    }

    fn ensure_valid_id(id: i64) -> Result<(), DomainError> {
        if id <= 0 {
            return Err(DomainError::InvalidInput(format!(
                "id must be positive (got {})",
                id
            )));
        }
        Ok(())
    }

    fn parse_priority(raw: Option<&str>) -> Result<Option<Priority>, DomainError> {
        Priority::parse_optional(raw).map_err(|e| DomainError::InvalidInput(e.to_string()))
    }

    /// Build the notification sent after a todo is created.
    pub fn creation_notice(todo: &Todo) -> NotificationRequest {
        NotificationRequest {
            recipient_id: NOTIFICATION_RECIPIENT_ID,
            title: CREATION_NOTICE_TITLE.to_string(),
            message: format!(
                "\"{}\" was created. Priority: {}",
                todo.title, todo.priority
            ),
            kind: NotificationKind::Push,
        }
    }

    /// Send the creation notice on a separate task and return immediately.
    ///
    /// The outcome is logged and dropped here: success, error or a hung request
    /// must never reach the caller of `create_todo`.
    fn dispatch_creation_notice(&self, todo: &Todo) {
        let notifier = Arc::clone(&self.notifier);
        let request = Self::creation_notice(todo);
        let todo_id = todo.id;
        tokio::spawn(async move {
            match notifier.send_notification(&request).await {
                Ok(response) => debug!(
                    todo_id,
                    notification_id = %response.notification_id,
                    status = %response.status,
                    "creation notice sent"
                ),
                Err(e) => warn!(todo_id, error = %e, "failed to send creation notice"),
            }
        });
    }
}

#[async_trait::async_trait]
impl TodoUseCase for TodoService {
    async fn get_all_todos(&self) -> Result<Vec<Todo>, DomainError> {
        let todos = self.repo.get_all().await?;
        debug!(count = todos.len(), "fetched todos");
        Ok(todos)
    }

    async fn get_todo_by_id(&self, id: i64) -> Result<Todo, DomainError> {
        Self::ensure_valid_id(id)?;
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(DomainError::NotFound(id))
    }

    async fn create_todo(&self, draft: TodoDraft) -> Result<Todo, DomainError> {
        if draft.title.is_empty() {
            return Err(DomainError::InvalidInput("title is required".into()));
        }
        let priority = Self::parse_priority(draft.priority.as_deref())?.unwrap_or_default();

        let new_todo = NewTodo {
            title: draft.title,
            description: draft.description,
            priority,
        };
        let created = self.repo.create(&new_todo).await?;
        info!(id = created.id, priority = %created.priority, "todo created");

        self.dispatch_creation_notice(&created);

        Ok(created)
    }

    async fn update_todo(&self, id: i64, changes: TodoChanges) -> Result<Todo, DomainError> {
        Self::ensure_valid_id(id)?;

        if self.repo.get_by_id(id).await?.is_none() {
            return Err(DomainError::NotFound(id));
        }

        let priority = Self::parse_priority(changes.priority.as_deref())?;
        let patch = TodoPatch {
            title: changes.title.filter(|t| !t.is_empty()),
            description: changes.description.filter(|d| !d.is_empty()),
            priority,
            completed: changes.completed,
        };

        // A row deleted between the check above and this statement is still NotFound.
        let updated = self
            .repo
            .update(id, &patch)
            .await?
            .ok_or(DomainError::NotFound(id))?;
        info!(id, "todo updated");
        Ok(updated)
    }

    async fn delete_todo(&self, id: i64) -> Result<(), DomainError> {
        Self::ensure_valid_id(id)?;
        self.repo.delete(id).await?;
        info!(id, "todo deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NotificationResponse;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    /// In-memory repository. Counts every call so tests can assert storage was untouched.
    #[derive(Default)]
    struct InMemoryRepo {
        rows: Mutex<Vec<Todo>>,
        calls: AtomicUsize,
        /// When set, `update` behaves as if the row vanished after the existence check.
        vanish_on_update: bool,
        /// When set, `update` fails with a storage error after the existence check passes.
        fail_on_update: bool,
    }

    impl InMemoryRepo {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn touch(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl TodoRepoPort for InMemoryRepo {
        async fn get_all(&self) -> Result<Vec<Todo>, DomainError> {
            self.touch();
            let mut rows = self.rows.lock().unwrap().clone();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(rows)
        }

        async fn get_by_id(&self, id: i64) -> Result<Option<Todo>, DomainError> {
            self.touch();
            Ok(self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned())
        }

        async fn create(&self, todo: &NewTodo) -> Result<Todo, DomainError> {
            self.touch();
            let mut rows = self.rows.lock().unwrap();
            let id = rows.len() as i64 + 1;
            // Spread creation times so ordering is deterministic.
            let now = Utc::now() + ChronoDuration::milliseconds(id);
            let created = Todo {
                id,
                title: todo.title.clone(),
                description: todo.description.clone(),
                completed: false,
                priority: todo.priority,
                created_at: now,
                updated_at: now,
            };
            rows.push(created.clone());
            Ok(created)
        }

        async fn update(&self, id: i64, patch: &TodoPatch) -> Result<Option<Todo>, DomainError> {
            self.touch();
            if self.fail_on_update {
                return Err(DomainError::Storage("disk I/O error".into()));
            }
            if self.vanish_on_update {
                return Ok(None);
            }
            let mut rows = self.rows.lock().unwrap();
            let Some(row) = rows.iter_mut().find(|t| t.id == id) else {
                return Ok(None);
            };
            if let Some(title) = &patch.title {
                row.title = title.clone();
            }
            if let Some(description) = &patch.description {
                row.description = description.clone();
            }
            if let Some(priority) = patch.priority {
                row.priority = priority;
            }
            if let Some(completed) = patch.completed {
                row.completed = completed;
            }
            row.updated_at = Utc::now().max(row.updated_at);
            Ok(Some(row.clone()))
        }

        async fn delete(&self, id: i64) -> Result<(), DomainError> {
            self.touch();
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|t| t.id != id);
            if rows.len() == before {
                return Err(DomainError::NotFound(id));
            }
            Ok(())
        }
    }

    struct BrokenRepo;

    #[async_trait::async_trait]
    impl TodoRepoPort for BrokenRepo {
        async fn get_all(&self) -> Result<Vec<Todo>, DomainError> {
            Err(DomainError::Storage("connection refused".into()))
        }

        async fn get_by_id(&self, _id: i64) -> Result<Option<Todo>, DomainError> {
            Err(DomainError::Storage("connection refused".into()))
        }

        async fn create(&self, _todo: &NewTodo) -> Result<Todo, DomainError> {
            Err(DomainError::Storage("connection refused".into()))
        }

        async fn update(&self, _id: i64, _patch: &TodoPatch) -> Result<Option<Todo>, DomainError> {
            Err(DomainError::Storage("connection refused".into()))
        }

        async fn delete(&self, _id: i64) -> Result<(), DomainError> {
            Err(DomainError::Storage("connection refused".into()))
        }
    }

    enum Behavior {
        Succeed,
        Fail,
        Hang,
    }

    /// Notifier that forwards every request it receives to a channel.
    struct ScriptedNotifier {
        behavior: Behavior,
        seen: mpsc::UnboundedSender<NotificationRequest>,
    }

    impl ScriptedNotifier {
        fn new(behavior: Behavior) -> (Arc<Self>, mpsc::UnboundedReceiver<NotificationRequest>) {
            let (seen, rx) = mpsc::unbounded_channel();
            (Arc::new(Self { behavior, seen }), rx)
        }
    }

    #[async_trait::async_trait]
    impl NotificationPort for ScriptedNotifier {
        async fn send_notification(
            &self,
            request: &NotificationRequest,
        ) -> Result<NotificationResponse, DomainError> {
            let _ = self.seen.send(request.clone());
            match self.behavior {
                Behavior::Succeed => Ok(NotificationResponse {
                    notification_id: "notif-1".into(),
                    status: "sent".into(),
                    sent_at: "2025-09-07T15:00:00Z".into(),
                }),
                Behavior::Fail => Err(DomainError::Notification("service unavailable".into())),
                Behavior::Hang => std::future::pending().await,
            }
        }

        async fn get_notification_status(&self, _id: &str) -> Result<String, DomainError> {
            Ok("sent".into())
        }

        async fn batch_send_notifications(
            &self,
            _requests: &[NotificationRequest],
        ) -> Result<Vec<NotificationResponse>, DomainError> {
            Ok(Vec::new())
        }
    }

    fn service_with(
        repo: Arc<InMemoryRepo>,
        behavior: Behavior,
    ) -> (TodoService, mpsc::UnboundedReceiver<NotificationRequest>) {
        let (notifier, rx) = ScriptedNotifier::new(behavior);
        (TodoService::new(repo, notifier), rx)
    }

    fn draft(title: &str, priority: &str) -> TodoDraft {
        TodoDraft {
            title: title.to_string(),
            description: String::new(),
            priority: Some(priority.to_string()),
            completed: None,
        }
    }

    #[tokio::test]
    async fn test_non_positive_ids_rejected_before_storage() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, _rx) = service_with(Arc::clone(&repo), Behavior::Succeed);

        for id in [0, -1, i64::MIN] {
            assert!(matches!(
                service.get_todo_by_id(id).await,
                Err(DomainError::InvalidInput(_))
            ));
            assert!(matches!(
                service.update_todo(id, TodoChanges::default()).await,
                Err(DomainError::InvalidInput(_))
            ));
            assert!(matches!(
                service.delete_todo(id).await,
                Err(DomainError::InvalidInput(_))
            ));
        }
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_defaults_priority_and_completed() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, _rx) = service_with(repo, Behavior::Succeed);

        let mut input = draft("Buy milk", "");
        input.completed = Some(true);
        let todo = service.create_todo(input).await.unwrap();

        assert!(todo.id > 0);
        assert_eq!(todo.priority, Priority::Medium);
        assert!(!todo.completed);
        assert!(todo.created_at <= todo.updated_at);
    }

    #[tokio::test]
    async fn test_create_with_absent_priority_uses_medium() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, _rx) = service_with(repo, Behavior::Succeed);

        let input = TodoDraft {
            title: "No priority".into(),
            ..Default::default()
        };
        let todo = service.create_todo(input).await.unwrap();
        assert_eq!(todo.priority, Priority::Medium);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, _rx) = service_with(Arc::clone(&repo), Behavior::Succeed);

        let result = service.create_todo(draft("", "high")).await;
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_priority() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, _rx) = service_with(Arc::clone(&repo), Behavior::Succeed);

        let result = service.create_todo(draft("X", "urgent")).await;
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_sends_push_notice() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, mut rx) = service_with(repo, Behavior::Succeed);

        service
            .create_todo(draft("Write report", "high"))
            .await
            .unwrap();

        let sent = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("notice was not dispatched")
            .unwrap();
        assert_eq!(sent.recipient_id, NOTIFICATION_RECIPIENT_ID);
        assert_eq!(sent.title, "New todo created");
        assert_eq!(sent.message, "\"Write report\" was created. Priority: high");
        assert_eq!(sent.kind, NotificationKind::Push);
    }

    #[tokio::test]
    async fn test_create_succeeds_when_notification_fails() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, mut rx) = service_with(Arc::clone(&repo), Behavior::Fail);

        let todo = service.create_todo(draft("Still saved", "low")).await.unwrap();
        assert_eq!(todo.title, "Still saved");

        // The notifier was called and failed; the todo is persisted regardless.
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        let stored = service.get_todo_by_id(todo.id).await.unwrap();
        assert_eq!(stored, todo);
    }

    #[tokio::test]
    async fn test_create_does_not_wait_for_hung_notification() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, _rx) = service_with(repo, Behavior::Hang);

        let create = service.create_todo(draft("Quick", ""));
        let result = tokio::time::timeout(Duration::from_secs(1), create).await;
        assert!(result.expect("create blocked on notification").is_ok());
    }

    #[tokio::test]
    async fn test_create_storage_failure_propagates() {
        let (notifier, mut rx) = ScriptedNotifier::new(Behavior::Succeed);
        let service = TodoService::new(Arc::new(BrokenRepo), notifier);

        let result = service.create_todo(draft("X", "")).await;
        assert!(matches!(result, Err(DomainError::Storage(_))));
        // No notice for a todo that was never stored.
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_get_missing_todo_is_not_found() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, _rx) = service_with(repo, Behavior::Succeed);

        assert!(matches!(
            service.get_todo_by_id(42).await,
            Err(DomainError::NotFound(42))
        ));
    }

    #[tokio::test]
    async fn test_get_all_empty_then_newest_first() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, _rx) = service_with(repo, Behavior::Succeed);

        assert!(service.get_all_todos().await.unwrap().is_empty());

        for title in ["first", "second", "third"] {
            service.create_todo(draft(title, "")).await.unwrap();
        }
        let todos = service.get_all_todos().await.unwrap();
        let titles: Vec<&str> = todos.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
        assert!(todos.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn test_get_all_storage_failure_propagates() {
        let (notifier, _rx) = ScriptedNotifier::new(Behavior::Succeed);
        let service = TodoService::new(Arc::new(BrokenRepo), notifier);
        assert!(matches!(
            service.get_all_todos().await,
            Err(DomainError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_storage_failures_keep_their_kind_on_lookup_update_delete() {
        let (notifier, _rx) = ScriptedNotifier::new(Behavior::Succeed);
        let service = TodoService::new(Arc::new(BrokenRepo), notifier);

        assert!(matches!(
            service.get_todo_by_id(1).await,
            Err(DomainError::Storage(_))
        ));
        let changes = TodoChanges {
            title: Some("Y".into()),
            ..Default::default()
        };
        assert!(matches!(
            service.update_todo(1, changes).await,
            Err(DomainError::Storage(_))
        ));
        assert!(matches!(
            service.delete_todo(1).await,
            Err(DomainError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_update_write_failure_is_storage_not_not_found() {
        let repo = Arc::new(InMemoryRepo {
            fail_on_update: true,
            ..Default::default()
        });
        let (service, _rx) = service_with(repo, Behavior::Succeed);
        let todo = service.create_todo(draft("Keep", "low")).await.unwrap();

        let changes = TodoChanges {
            priority: Some("high".into()),
            ..Default::default()
        };
        assert!(matches!(
            service.update_todo(todo.id, changes).await,
            Err(DomainError::Storage(_))
        ));
        let stored = service.get_todo_by_id(todo.id).await.unwrap();
        assert_eq!(stored.priority, Priority::Low);
    }

    #[tokio::test]
    async fn test_update_missing_todo_is_not_found() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, _rx) = service_with(repo, Behavior::Succeed);

        let changes = TodoChanges {
            title: Some("Y".into()),
            ..Default::default()
        };
        assert!(matches!(
            service.update_todo(9999, changes).await,
            Err(DomainError::NotFound(9999))
        ));
    }

    #[tokio::test]
    async fn test_update_priority_only_keeps_other_fields() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, _rx) = service_with(repo, Behavior::Succeed);
        let original = service
            .create_todo(TodoDraft {
                title: "Keep me".into(),
                description: "details".into(),
                priority: Some("low".into()),
                completed: None,
            })
            .await
            .unwrap();

        let changes = TodoChanges {
            priority: Some("high".into()),
            ..Default::default()
        };
        let updated = service.update_todo(original.id, changes).await.unwrap();

        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.title, original.title);
        assert_eq!(updated.description, original.description);
        assert_eq!(updated.completed, original.completed);
        assert!(updated.updated_at >= original.updated_at);
    }

    #[tokio::test]
    async fn test_update_treats_empty_strings_as_unset() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, _rx) = service_with(repo, Behavior::Succeed);
        let original = service.create_todo(draft("Title", "")).await.unwrap();

        let changes = TodoChanges {
            title: Some(String::new()),
            description: Some(String::new()),
            priority: Some(String::new()),
            completed: Some(true),
        };
        let updated = service.update_todo(original.id, changes).await.unwrap();

        assert_eq!(updated.title, "Title");
        assert_eq!(updated.priority, Priority::Medium);
        assert!(updated.completed);
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_priority() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, _rx) = service_with(repo, Behavior::Succeed);
        let original = service.create_todo(draft("Title", "")).await.unwrap();

        let changes = TodoChanges {
            priority: Some("urgent".into()),
            ..Default::default()
        };
        assert!(matches!(
            service.update_todo(original.id, changes).await,
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_update_row_vanishing_mid_update_is_not_found() {
        let repo = Arc::new(InMemoryRepo {
            vanish_on_update: true,
            ..Default::default()
        });
        let (service, _rx) = service_with(repo, Behavior::Succeed);
        let original = service.create_todo(draft("Racy", "")).await.unwrap();

        let changes = TodoChanges {
            title: Some("New".into()),
            ..Default::default()
        };
        assert!(matches!(
            service.update_todo(original.id, changes).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let repo = Arc::new(InMemoryRepo::default());
        let (service, _rx) = service_with(repo, Behavior::Succeed);
        let todo = service.create_todo(draft("Gone soon", "")).await.unwrap();

        service.delete_todo(todo.id).await.unwrap();

        assert!(matches!(
            service.get_todo_by_id(todo.id).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_todo(todo.id).await,
            Err(DomainError::NotFound(_))
        ));
    }
}
