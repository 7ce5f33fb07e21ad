//! services/api/src/web/annotations.rs
//!
//! REST handlers for free-hand annotation sketches on a student's page.
//!
//! Sketches arrive in the pixel space of the teacher's drawing surface, are
//! stored in relative space, and are handed back in the pixel space of
//! whatever surface size the reader currently has.

use axum::{extract::State, response::Json, Extension};
use quranakh_core::access::Profile;
use quranakh_core::coordinates::{validate, CoordinateSpace, Dimensions};
use quranakh_core::highlight::check_page;
use quranakh_core::ports::PortError;
use quranakh_core::sketch::{to_pixel_document, to_relative_document, SketchDocument, Stroke};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::web::extract::{AppJson, AppPath, AppQuery};
use crate::web::middleware::{authorize_mark, authorize_view};
use crate::web::state::AppState;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A sketch as captured by the drawing surface, in its pixel space.
#[derive(Deserialize, ToSchema)]
pub struct SaveSketchRequest {
    #[schema(value_type = Vec<Object>)]
    pub paths: Vec<Stroke>,
    /// Width of the drawing surface at capture time, in pixels.
    pub width: f64,
    /// Height of the drawing surface at capture time, in pixels.
    pub height: f64,
}

/// Surface size the sketch should be rendered for.
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RenderQuery {
    pub width: f64,
    pub height: f64,
}

/// A sketch ready to draw on the requested surface.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct PixelSketchResponse {
    /// `{"paths": [...]}` in pixels, or the legacy document exactly as stored.
    #[schema(value_type = Object)]
    pub sketch: Value,
    /// True when the stored data predates relative coordinates and was not rescaled.
    pub legacy: bool,
}

fn surface(width: f64, height: f64) -> ApiResult<Dimensions> {
    if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
        return Err(ApiError::BadRequest(format!(
            "surface dimensions must be finite and non-negative, got {width}x{height}"
        )));
    }
    Ok(Dimensions::new(width, height))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Store the annotation sketch for one page of a student.
#[utoipa::path(
    put,
    path = "/students/{student_id}/pages/{page}/annotations",
    request_body = SaveSketchRequest,
    params(
        ("student_id" = Uuid, Path, description = "The student"),
        ("page" = u32, Path, description = "Mushaf page number")
    ),
    responses(
        (status = 200, description = "Stored sketch in relative coordinates"),
        (status = 400, description = "Invalid surface dimensions or page"),
        (status = 403, description = "Caller may not mark this student")
    )
)]
pub async fn save_annotation_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Profile>,
    AppPath((student_id, page)): AppPath<(Uuid, u32)>,
    AppJson(req): AppJson<SaveSketchRequest>,
) -> ApiResult<Json<Value>> {
    check_page(page)?;
    let dims = surface(req.width, req.height)?;
    authorize_mark(&state, &actor, student_id).await?;

    if !validate(&req.paths, CoordinateSpace::Pixel) {
        warn!(%student_id, page, "Captured sketch has negative pixel coordinates");
    }
    let stored = to_relative_document(&req.paths, dims);
    if let Some(strokes) = stored.relative_strokes() {
        if !validate(strokes, CoordinateSpace::Relative) {
            warn!(%student_id, page, "Sketch strokes extend beyond the drawing surface");
        }
    }

    let json = stored
        .to_json()
        .map_err(|e| ApiError::Internal(format!("Failed to encode sketch: {e}")))?;
    state.db.save_annotation(student_id, page, &json).await?;

    info!(
        %student_id,
        page,
        strokes = req.paths.len(),
        "Annotation sketch saved"
    );
    Ok(Json(json))
}

/// Fetch the annotation sketch of one page, scaled to the given surface.
#[utoipa::path(
    get,
    path = "/students/{student_id}/pages/{page}/annotations",
    params(
        ("student_id" = Uuid, Path, description = "The student"),
        ("page" = u32, Path, description = "Mushaf page number"),
        RenderQuery
    ),
    responses(
        (status = 200, description = "Sketch in pixel coordinates", body = PixelSketchResponse),
        (status = 404, description = "No sketch stored for this page")
    )
)]
pub async fn get_annotation_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Profile>,
    AppPath((student_id, page)): AppPath<(Uuid, u32)>,
    AppQuery(query): AppQuery<RenderQuery>,
) -> ApiResult<Json<PixelSketchResponse>> {
    check_page(page)?;
    let dims = surface(query.width, query.height)?;
    authorize_view(&state, &actor, student_id).await?;

    let stored = state
        .db
        .get_annotation(student_id, page)
        .await?
        .ok_or_else(|| {
            PortError::NotFound(format!(
                "No annotation for student {} on page {}",
                student_id, page
            ))
        })?;
    let document: SketchDocument = SketchDocument::from_json(stored)
        .map_err(|e| ApiError::Internal(format!("Stored sketch is malformed: {e}")))?;

    let sketch = to_pixel_document(&document, dims)
        .to_json()
        .map_err(|e| ApiError::Internal(format!("Failed to encode sketch: {e}")))?;
    Ok(Json(PixelSketchResponse {
        sketch,
        legacy: !document.is_relative(),
    }))
}
