//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how it is
//! rendered as an HTTP response.

use crate::config::ConfigError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quranakh_core::highlight::HighlightError;
use quranakh_core::ports::PortError;
use serde_json::json;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A highlight operation rejected by the domain model.
    #[error(transparent)]
    Highlight(#[from] HighlightError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON body: {0}")]
    Json(#[from] JsonRejection),

    #[error("Invalid query string: {0}")]
    Query(#[from] QueryRejection),

    #[error("Invalid path: {0}")]
    Path(#[from] PathRejection),

    /// The request was malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Port(PortError::NotFound(what)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", what.clone())
            }
            ApiError::Port(PortError::Unauthorized) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized".to_string(),
            ),
            ApiError::Port(PortError::Forbidden(why)) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", why.clone())
            }
            ApiError::Highlight(
                e @ (HighlightError::InvalidCategory(_) | HighlightError::InvalidRange(_)),
            ) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            ApiError::Highlight(e) => (StatusCode::CONFLICT, "CONFLICT", e.to_string()),
            ApiError::Json(rejection) => {
                (rejection.status(), "BAD_REQUEST", rejection.body_text())
            }
            ApiError::Query(rejection) => {
                (rejection.status(), "BAD_REQUEST", rejection.body_text())
            }
            ApiError::Path(rejection) => {
                (rejection.status(), "BAD_REQUEST", rejection.body_text())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            other => {
                tracing::error!(error = %other, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = json!({
            "error": message,
            "code": code,
        });
        (status, Json(body)).into_response()
    }
}
