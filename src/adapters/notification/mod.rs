//! Notification adapters. Implement NotificationPort.
//!
//! HTTP client for the real service, mock client when none is configured.

pub mod http_client;
pub mod mock_client;

pub use http_client::HttpNotificationClient;
pub use mock_client::MockNotificationClient;
