// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Courier backend.

use thiserror::Error;

/// The primary error type used across all Courier adapter traits and operations.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Input failed a shape or length check. `field` names the violated field.
    #[error("validation error: {field}: {message}")]
    Validation { field: String, message: String },

    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The instance has no provider mapping with a usable remote session.
    #[error("mapping not found: {0}")]
    MappingUnavailable(String),

    /// Every candidate remote endpoint failed, or the remote answered non-2xx.
    #[error("provider error: {message}")]
    Adapter {
        message: String,
        /// HTTP status of the last remote response, when one was received.
        status: Option<u16>,
        /// Parsed body of the last remote response, when one was received.
        body: Option<serde_json::Value>,
    },

    /// Storage backend errors (database connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors detected after startup validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CourierError {
    /// Shorthand for a [`CourierError::Validation`] on `field`.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`CourierError::Adapter`] without remote detail.
    pub fn adapter(message: impl Into<String>) -> Self {
        Self::Adapter {
            message: message.into(),
            status: None,
            body: None,
        }
    }
}
