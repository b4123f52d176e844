//! HTTP notification adapter. Implements NotificationPort against the notification REST API.
//!
//! Endpoints (relative to the configured base URL):
//! - `POST /notifications`                 send one notification
//! - `GET  /notifications/{id}/status`     delivery status
//! - `POST /notifications/batch`           send many in one request
//!
//! Every request carries `Authorization: Bearer <api_key>`.

use crate::domain::{DomainError, NotificationRequest, NotificationResponse};
use crate::ports::NotificationPort;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub struct HttpNotificationClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    notifications: &'a [NotificationRequest],
}

#[derive(Deserialize)]
struct BatchResponse {
    results: Vec<NotificationResponse>,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
}

impl HttpNotificationClient {
    /// Create a new notification client.
    ///
    /// # Arguments
    /// * `base_url` - Service root, e.g. "https://notify.example.com/v1" (trailing slash ignored)
    /// * `api_key` - Bearer token sent with every request
    /// * `timeout` - Per-request timeout; the use case never waits on it
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Notification(format!("Failed to build client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Reject any status outside `accepted`, keeping a short excerpt of the body.
    async fn check_status(
        response: Response,
        accepted: &[StatusCode],
    ) -> Result<Response, DomainError> {
        let status = response.status();
        if accepted.contains(&status) {
            return Ok(response);
        }
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown".to_string());
        Err(DomainError::Notification(format!(
            "API request failed with status {}: {}",
            status,
            text.chars().take(200).collect::<String>()
        )))
    }
}

#[async_trait::async_trait]
impl NotificationPort for HttpNotificationClient {
    async fn send_notification(
        &self,
        request: &NotificationRequest,
    ) -> Result<NotificationResponse, DomainError> {
        let response = self
            .client
            .post(self.url("/notifications"))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| DomainError::Notification(format!("Request failed: {}", e)))?;
        let response = Self::check_status(response, &[StatusCode::OK, StatusCode::CREATED]).await?;

        let body: NotificationResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Notification(format!("Failed to decode response: {}", e)))?;
        debug!(notification_id = %body.notification_id, status = %body.status, "notification sent");
        Ok(body)
    }

    async fn get_notification_status(&self, notification_id: &str) -> Result<String, DomainError> {
        let response = self
            .client
            .get(self.url(&format!("/notifications/{}/status", notification_id)))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| DomainError::Notification(format!("Request failed: {}", e)))?;
        let response = Self::check_status(response, &[StatusCode::OK]).await?;

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Notification(format!("Failed to decode response: {}", e)))?;
        Ok(body.status)
    }

    async fn batch_send_notifications(
        &self,
        requests: &[NotificationRequest],
    ) -> Result<Vec<NotificationResponse>, DomainError> {
        let response = self
            .client
            .post(self.url("/notifications/batch"))
            .bearer_auth(&self.api_key)
            .json(&BatchRequest {
                notifications: requests,
            })
            .send()
            .await
            .map_err(|e| DomainError::Notification(format!("Request failed: {}", e)))?;
        let response = Self::check_status(response, &[StatusCode::OK, StatusCode::CREATED]).await?;

        let body: BatchResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Notification(format!("Failed to decode response: {}", e)))?;
        debug!(count = body.results.len(), "batch notifications sent");
        Ok(body.results)
    }
}
