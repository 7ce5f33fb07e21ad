//! services/api/src/web/rest.rs
//!
//! The health endpoint and the master definition for the OpenAPI specification.

use axum::response::Json;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::web::{annotations, highlights};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        highlights::list_categories_handler,
        highlights::create_highlight_handler,
        highlights::list_highlights_handler,
        highlights::resolve_highlight_handler,
        highlights::unresolve_highlight_handler,
        highlights::delete_highlight_handler,
        highlights::page_progress_handler,
        highlights::student_progress_handler,
        annotations::save_annotation_handler,
        annotations::get_annotation_handler,
    ),
    components(
        schemas(
            HealthResponse,
            highlights::CreateHighlightRequest,
            highlights::HighlightResponse,
            highlights::PageProgressResponse,
            highlights::CategoryResponse,
            annotations::SaveSketchRequest,
            annotations::PixelSketchResponse,
        )
    ),
    tags(
        (name = "QuranAkh API", description = "Mistake highlights, page progress and annotation sketches.")
    )
)]
pub struct ApiDoc;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
