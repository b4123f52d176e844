//! Mock notification adapter for running without a notification service.
//!
//! Logs each request and answers with a synthetic "sent" response.

use crate::domain::{DomainError, NotificationRequest, NotificationResponse};
use crate::ports::NotificationPort;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Mock notification client. Never fails; ids are `mock-1`, `mock-2`, ...
pub struct MockNotificationClient {
    next_id: AtomicU64,
}

impl MockNotificationClient {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    fn fake_response(&self) -> NotificationResponse {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        NotificationResponse {
            notification_id: format!("mock-{}", n),
            status: "sent".to_string(),
            sent_at: Utc::now().to_rfc3339(),
        }
    }
}

impl Default for MockNotificationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl NotificationPort for MockNotificationClient {
    async fn send_notification(
        &self,
        request: &NotificationRequest,
    ) -> Result<NotificationResponse, DomainError> {
        info!(
            recipient_id = request.recipient_id,
            title = %request.title,
            message = %request.message,
            "[MOCK] notification"
        );
        Ok(self.fake_response())
    }

    async fn get_notification_status(&self, notification_id: &str) -> Result<String, DomainError> {
        info!(notification_id, "[MOCK] notification status");
        Ok("sent".to_string())
    }

    async fn batch_send_notifications(
        &self,
        requests: &[NotificationRequest],
    ) -> Result<Vec<NotificationResponse>, DomainError> {
        info!(count = requests.len(), "[MOCK] batch notification");
        Ok(requests.iter().map(|_| self.fake_response()).collect())
    }
}
