//! Infrastructure adapters. Implement outbound ports, drive inbound ones.
//!
//! HTTP server, SQLite storage, notification service. Map errors to DomainError.

pub mod http;
pub mod notification;
pub mod persistence;
