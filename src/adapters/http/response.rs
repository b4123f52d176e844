//! Response shaping. Success bodies are `{"message", "data"}`; errors are
//! `{"message", "error_code", "details"}`.

use super::request::ValidationErrorDetail;
use crate::domain::DomainError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(message: &'static str, data: T) -> Self {
        Self {
            message,
            data: Some(data),
        }
    }
}

impl DataResponse<()> {
    pub fn message_only(message: &'static str) -> Self {
        Self {
            message,
            data: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error_code: &'static str,
    pub details: Vec<ValidationErrorDetail>,
}

/// Everything a handler can fail with, mapped to a status and error code.
#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<ValidationErrorDetail>),
    InvalidJson,
    InvalidId,
    Domain(DomainError),
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError::Domain(e)
    }
}

impl ApiError {
    fn parts(self) -> (StatusCode, &'static str, String, Vec<ValidationErrorDetail>) {
        match self {
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "request validation failed".to_string(),
                details,
            ),
            ApiError::InvalidJson => (
                StatusCode::BAD_REQUEST,
                "INVALID_JSON",
                "malformed JSON body".to_string(),
                Vec::new(),
            ),
            ApiError::InvalidId => (
                StatusCode::BAD_REQUEST,
                "INVALID_ID",
                "id must be an integer".to_string(),
                Vec::new(),
            ),
            ApiError::Domain(DomainError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg, Vec::new())
            }
            ApiError::Domain(DomainError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("todo {} not found", id),
                Vec::new(),
            ),
            // Backend detail goes to the log, never to the client.
            ApiError::Domain(e @ DomainError::Storage(_)) => {
                error!(error = %e, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "failed to access todos".to_string(),
                    Vec::new(),
                )
            }
            ApiError::Domain(e) => {
                error!(error = %e, "unexpected failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "internal server error".to_string(),
                    Vec::new(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = self.parts();
        (
            status,
            Json(ErrorResponse {
                message,
                error_code,
                details,
            }),
        )
            .into_response()
    }
}
