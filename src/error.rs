//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// All errors that can occur in the core are represented by this enum.
/// Each variant implements automatic conversion to HTTP responses via
/// `IntoResponse` so the operator surface reports structured failures.
#[derive(Error, Debug)]
pub enum AppError {
    /// No turtle is selected, or the selected turtle's connection is closed
    #[error("No turtle connected.")]
    NoTurtleConnected,

    /// Every label in the configured allocation range is taken
    #[error("No free labels left in the configured range")]
    LabelsExhausted,

    /// Error occurred while persisting or loading the world tables
    #[error("Persistence error: {0}")]
    Persistence(#[from] crate::world::PersistenceError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NoTurtleConnected => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::LabelsExhausted => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
