//! services/api/src/web/highlights.rs
//!
//! REST handlers for mistake highlights and the page progress derived from them.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use quranakh_core::access::Profile;
use quranakh_core::highlight::{
    check_page, page_progress, progress_by_page, Highlight, MistakeCategory, NewHighlight,
    PageProgress,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::web::extract::{AppJson, AppPath, AppQuery};
use crate::web::middleware::{authorize_mark, authorize_view};
use crate::web::state::AppState;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Payload for marking a new mistake.
#[derive(Deserialize, ToSchema)]
pub struct CreateHighlightRequest {
    pub student_id: Uuid,
    pub surah: u32,
    pub ayah_start: u32,
    pub ayah_end: u32,
    pub word_start: Option<u32>,
    pub word_end: Option<u32>,
    pub page_number: Option<u32>,
    /// One of `recap`, `tajweed`, `haraka`, `letter`.
    pub category: String,
    pub note: Option<String>,
    pub audio_note_url: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HighlightResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub teacher_id: Option<Uuid>,
    pub surah: u32,
    pub ayah_start: u32,
    pub ayah_end: u32,
    pub word_start: Option<u32>,
    pub word_end: Option<u32>,
    pub page_number: Option<u32>,
    pub color: String,
    pub display_color: String,
    pub previous_color: Option<String>,
    pub note: Option<String>,
    pub audio_note_url: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Highlight> for HighlightResponse {
    fn from(h: Highlight) -> Self {
        Self {
            id: h.id,
            student_id: h.student_id,
            teacher_id: h.teacher_id,
            surah: h.surah,
            ayah_start: h.ayah_start,
            ayah_end: h.ayah_end,
            word_start: h.word_start,
            word_end: h.word_end,
            page_number: h.page_number,
            color: h.color.as_str().to_string(),
            display_color: h.color.display_color().to_string(),
            previous_color: h.previous_color.map(|c| c.as_str().to_string()),
            note: h.note,
            audio_note_url: h.audio_note_url,
            resolved_at: h.resolved_at,
            resolved_by: h.resolved_by,
            created_at: h.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, PartialEq)]
pub struct PageProgressResponse {
    pub page_number: u32,
    pub is_complete: bool,
    pub completed: usize,
    pub total: usize,
}

impl PageProgressResponse {
    fn new(page_number: u32, progress: PageProgress) -> Self {
        Self {
            page_number,
            is_complete: progress.is_complete,
            completed: progress.completed,
            total: progress.total,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub category: String,
    pub display_color: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HighlightListQuery {
    /// Restrict the list to one mushaf page.
    pub page: Option<u32>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// List the mistake categories and their display colors.
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Mistake categories", body = [CategoryResponse]))
)]
pub async fn list_categories_handler() -> Json<Vec<CategoryResponse>> {
    Json(
        MistakeCategory::ALL
            .iter()
            .map(|c| CategoryResponse {
                category: c.as_str().to_string(),
                display_color: c.display_color().to_string(),
            })
            .collect(),
    )
}

/// Mark a new mistake on a student's text.
#[utoipa::path(
    post,
    path = "/highlights",
    request_body = CreateHighlightRequest,
    responses(
        (status = 201, description = "Highlight created", body = HighlightResponse),
        (status = 400, description = "Unknown category or invalid range"),
        (status = 403, description = "Caller may not mark this student")
    )
)]
pub async fn create_highlight_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Profile>,
    AppJson(req): AppJson<CreateHighlightRequest>,
) -> ApiResult<impl IntoResponse> {
    let category = req.category.parse::<MistakeCategory>()?;
    authorize_mark(&state, &actor, req.student_id).await?;

    let new = NewHighlight {
        student_id: req.student_id,
        surah: req.surah,
        ayah_start: req.ayah_start,
        ayah_end: req.ayah_end,
        word_start: req.word_start,
        word_end: req.word_end,
        page_number: req.page_number,
        category,
        note: req.note,
        audio_note_url: req.audio_note_url,
    };
    let highlight = Highlight::create(new, Some(actor.id), Uuid::new_v4(), Utc::now())?;
    state.db.insert_highlight(&highlight).await?;

    info!(
        highlight_id = %highlight.id,
        student_id = %highlight.student_id,
        category = %category,
        "Highlight created"
    );
    Ok((StatusCode::CREATED, Json(HighlightResponse::from(highlight))))
}

/// List a student's highlights, optionally for one page.
#[utoipa::path(
    get,
    path = "/students/{student_id}/highlights",
    params(("student_id" = Uuid, Path, description = "The student"), HighlightListQuery),
    responses(
        (status = 200, description = "Highlights", body = [HighlightResponse]),
        (status = 403, description = "Caller may not view this student")
    )
)]
pub async fn list_highlights_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Profile>,
    AppPath(student_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<HighlightListQuery>,
) -> ApiResult<Json<Vec<HighlightResponse>>> {
    let page = query.page.map(check_page).transpose()?;
    authorize_view(&state, &actor, student_id).await?;
    let highlights = state.db.list_highlights(student_id, page).await?;
    Ok(Json(highlights.into_iter().map(Into::into).collect()))
}

/// Mark a highlight as corrected.
#[utoipa::path(
    post,
    path = "/highlights/{highlight_id}/resolve",
    params(("highlight_id" = Uuid, Path, description = "The highlight")),
    responses(
        (status = 200, description = "Highlight resolved", body = HighlightResponse),
        (status = 404, description = "No such highlight"),
        (status = 409, description = "Highlight already resolved")
    )
)]
pub async fn resolve_highlight_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Profile>,
    AppPath(highlight_id): AppPath<Uuid>,
) -> ApiResult<Json<HighlightResponse>> {
    let highlight = load_markable(&state, &actor, highlight_id).await?;
    let resolved = highlight.resolve(actor.id, Utc::now())?;
    state.db.update_highlight(&resolved).await?;

    info!(%highlight_id, resolved_by = %actor.id, "Highlight resolved");
    Ok(Json(resolved.into()))
}

/// Revert a resolved highlight to its mistake category.
#[utoipa::path(
    post,
    path = "/highlights/{highlight_id}/unresolve",
    params(("highlight_id" = Uuid, Path, description = "The highlight")),
    responses(
        (status = 200, description = "Highlight restored", body = HighlightResponse),
        (status = 404, description = "No such highlight"),
        (status = 409, description = "Highlight is not resolved")
    )
)]
pub async fn unresolve_highlight_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Profile>,
    AppPath(highlight_id): AppPath<Uuid>,
) -> ApiResult<Json<HighlightResponse>> {
    let highlight = load_markable(&state, &actor, highlight_id).await?;
    let restored = highlight.unresolve()?;
    state.db.update_highlight(&restored).await?;

    info!(%highlight_id, "Highlight unresolved");
    Ok(Json(restored.into()))
}

/// Delete a highlight.
#[utoipa::path(
    delete,
    path = "/highlights/{highlight_id}",
    params(("highlight_id" = Uuid, Path, description = "The highlight")),
    responses(
        (status = 204, description = "Highlight deleted"),
        (status = 404, description = "No such highlight")
    )
)]
pub async fn delete_highlight_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Profile>,
    AppPath(highlight_id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    load_markable(&state, &actor, highlight_id).await?;
    state.db.delete_highlight(highlight_id).await?;

    info!(%highlight_id, deleted_by = %actor.id, "Highlight deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Completion state of one page.
#[utoipa::path(
    get,
    path = "/students/{student_id}/pages/{page}/progress",
    params(
        ("student_id" = Uuid, Path, description = "The student"),
        ("page" = u32, Path, description = "Mushaf page number")
    ),
    responses((status = 200, description = "Page progress", body = PageProgressResponse))
)]
pub async fn page_progress_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Profile>,
    AppPath((student_id, page)): AppPath<(Uuid, u32)>,
) -> ApiResult<Json<PageProgressResponse>> {
    check_page(page)?;
    authorize_view(&state, &actor, student_id).await?;
    let highlights = state.db.list_highlights(student_id, Some(page)).await?;
    Ok(Json(PageProgressResponse::new(
        page,
        page_progress(&highlights, page),
    )))
}

/// Completion state of every page the student has highlights on.
#[utoipa::path(
    get,
    path = "/students/{student_id}/progress",
    params(("student_id" = Uuid, Path, description = "The student")),
    responses((status = 200, description = "Progress per page", body = [PageProgressResponse]))
)]
pub async fn student_progress_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Profile>,
    AppPath(student_id): AppPath<Uuid>,
) -> ApiResult<Json<Vec<PageProgressResponse>>> {
    authorize_view(&state, &actor, student_id).await?;
    let highlights = state.db.list_highlights(student_id, None).await?;
    Ok(Json(
        progress_by_page(&highlights)
            .into_iter()
            .map(|(page, progress)| PageProgressResponse::new(page, progress))
            .collect(),
    ))
}

async fn load_markable(
    state: &AppState,
    actor: &Profile,
    highlight_id: Uuid,
) -> ApiResult<Highlight> {
    let highlight = state.db.get_highlight(highlight_id).await?;
    authorize_mark(state, actor, highlight.student_id).await?;
    Ok(highlight)
}
