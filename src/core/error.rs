//! Error type system for the plugin administration backend
//!
//! This module provides the crate-wide error type with:
//! - Hierarchical error classification
//! - HTTP status code mapping
//! - Conversion into the wire-level `{message, error}` response body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Main error type for the modpanel system
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    // System-level errors
    #[error("System initialization failed: {0}")]
    InitializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    // Plugin-related errors
    //
    // The wire message for an unresolved alias is fixed by the admin UI
    // contract; the alias is kept in the variant for logging.
    #[error("Plugin not exists")]
    PluginNotFound(String),

    #[error("Invalid module manifest: {0}")]
    ManifestError(String),

    #[error("Lifecycle command failed: {0}")]
    CommandFailed(String),

    #[error("Autoload refresh failed: {0}")]
    RefreshFailed(String),

    // API-related errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // I/O errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // Blocking task errors
    #[error("Task error: {0}")]
    TaskError(String),
}

impl PanelError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            PanelError::InvalidRequest(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            PanelError::PluginNotFound(_) => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            PanelError::InitializationError(_)
            | PanelError::ConfigError(_)
            | PanelError::DatabaseError(_)
            | PanelError::ManifestError(_)
            | PanelError::CommandFailed(_)
            | PanelError::RefreshFailed(_)
            | PanelError::IoError(_)
            | PanelError::SerializationError(_)
            | PanelError::TaskError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name for logging
    pub fn error_type(&self) -> &'static str {
        match self {
            PanelError::InitializationError(_) => "InitializationError",
            PanelError::ConfigError(_) => "ConfigError",
            PanelError::DatabaseError(_) => "DatabaseError",
            PanelError::PluginNotFound(_) => "PluginNotFound",
            PanelError::ManifestError(_) => "ManifestError",
            PanelError::CommandFailed(_) => "CommandFailed",
            PanelError::RefreshFailed(_) => "RefreshFailed",
            PanelError::InvalidRequest(_) => "InvalidRequest",
            PanelError::IoError(_) => "IoError",
            PanelError::SerializationError(_) => "SerializationError",
            PanelError::TaskError(_) => "TaskError",
        }
    }
}

/// Error response body for API endpoints
///
/// Every endpoint replies with a message string plus a boolean error
/// indicator; the request trace id travels in the `X-Trace-Id` header.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub message: String,
    /// Error indicator, always true for this body
    pub error: bool,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(message: String) -> Self {
        Self {
            message,
            error: true,
        }
    }

    /// Create an error response from a PanelError
    pub fn from_error(error: &PanelError) -> Self {
        Self::new(error.to_string())
    }
}

/// Implement IntoResponse for PanelError to enable automatic error handling in Axum
impl IntoResponse for PanelError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        tracing::error!(
            error_type = self.error_type(),
            status_code = %status_code,
            "Request failed: {:?}",
            self
        );

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with PanelError
pub type Result<T> = std::result::Result<T, PanelError>;
