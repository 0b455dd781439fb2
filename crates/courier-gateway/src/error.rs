// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`CourierError`] to HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use courier_core::CourierError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The input field a validation error refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// HTTP status returned by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_status: Option<u16>,
    /// Body returned by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_body: Option<Value>,
}

impl ErrorResponse {
    fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: Some(message.into()),
            field: None,
            remote_status: None,
            remote_body: None,
        }
    }
}

/// Handler error: any [`CourierError`] or a malformed request body.
#[derive(Debug)]
pub struct ApiError(pub CourierError);

impl From<CourierError> for ApiError {
    fn from(e: CourierError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(CourierError::validation("body", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            CourierError::Validation { field, message } => {
                let mut body = ErrorResponse::new("validation_error", message);
                body.field = Some(field);
                (StatusCode::BAD_REQUEST, body)
            }
            CourierError::NotFound(what) => {
                (StatusCode::NOT_FOUND, ErrorResponse::new("not_found", what))
            }
            CourierError::MappingUnavailable(what) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("mapping_not_found", what),
            ),
            CourierError::Adapter {
                message,
                status,
                body,
            } => {
                warn!(error = %message, remote_status = ?status, "provider request failed");
                let mut response = ErrorResponse::new("adapter_error", message);
                response.remote_status = status;
                response.remote_body = body;
                (StatusCode::INTERNAL_SERVER_ERROR, response)
            }
            CourierError::Storage { source } => {
                error!(error = %source, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("storage_error", source.to_string()),
                )
            }
            other => {
                error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("internal_error", other.to_string()),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
