//! Tests for `ApiError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `ApiError` values; no router needed.

use api_lib::error::ApiError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use quranakh_core::highlight::HighlightError;
use quranakh_core::ports::PortError;
use uuid::Uuid;

async fn error_to_response(err: ApiError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn not_found_port_error_returns_404() {
    let (status, json) =
        error_to_response(PortError::NotFound("Highlight x not found".into()).into()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Highlight x not found");
}

#[tokio::test]
async fn unauthorized_port_error_returns_401() {
    let (status, json) = error_to_response(PortError::Unauthorized.into()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Unauthorized");
}

#[tokio::test]
async fn forbidden_port_error_returns_403() {
    let (status, json) = error_to_response(PortError::Forbidden("nope".into()).into()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn already_resolved_returns_409() {
    let id = Uuid::nil();
    let (status, json) = error_to_response(HighlightError::AlreadyResolved(id).into()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], format!("Highlight {id} is already resolved"));
}

#[tokio::test]
async fn invalid_category_returns_400() {
    let (status, json) =
        error_to_response(HighlightError::InvalidCategory("blue".into()).into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Unknown mistake category: blue");
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let (status, json) =
        error_to_response(PortError::Unexpected("password=hunter2".into()).into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
