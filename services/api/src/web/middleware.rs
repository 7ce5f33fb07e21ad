//! services/api/src/web/middleware.rs
//!
//! Caller identification and the per-student access checks handlers share.
//!
//! Token verification happens in the identity layer in front of this service;
//! it forwards the verified profile id in the `x-user-id` header.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use quranakh_core::access::{can_mark_student, can_view_student, Profile, Role};
use quranakh_core::ports::PortError;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::web::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Middleware that resolves the caller's profile row.
///
/// If found, inserts the `Profile` into request extensions for handlers to use.
/// If the header is missing or names no profile, returns 401 Unauthorized.
pub async fn require_profile(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    // 1. Extract the forwarded profile id
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or(PortError::Unauthorized)?;

    // 2. Look up the profile row
    let profile = state.db.get_profile(user_id).await.map_err(|e| match e {
        PortError::NotFound(_) => {
            debug!(%user_id, "No profile for caller");
            PortError::Unauthorized
        }
        other => {
            error!("Failed to load caller profile: {:?}", other);
            other
        }
    })?;

    // 3. Continue to the handler
    req.extensions_mut().insert(profile);
    Ok(next.run(req).await)
}

/// Loads `student_id` and checks that `actor` may read their work.
pub async fn authorize_view(
    state: &AppState,
    actor: &Profile,
    student_id: Uuid,
) -> ApiResult<Profile> {
    let student = load_student(state, student_id).await?;
    let is_parent = actor.role == Role::Parent
        && state.db.is_parent_of(actor.id, student_id).await?;

    if !can_view_student(actor, &student, is_parent) {
        return Err(PortError::Forbidden(format!(
            "{} may not view student {}",
            actor.role, student_id
        ))
        .into());
    }
    Ok(student)
}

/// Loads `student_id` and checks that `actor` may mark their work.
pub async fn authorize_mark(
    state: &AppState,
    actor: &Profile,
    student_id: Uuid,
) -> ApiResult<Profile> {
    let student = load_student(state, student_id).await?;
    if !can_mark_student(actor, &student) {
        return Err(PortError::Forbidden(format!(
            "{} may not mark student {}",
            actor.role, student_id
        ))
        .into());
    }
    Ok(student)
}

async fn load_student(state: &AppState, student_id: Uuid) -> ApiResult<Profile> {
    let student = state.db.get_profile(student_id).await?;
    if student.role != Role::Student {
        return Err(PortError::NotFound(format!("Student {} not found", student_id)).into());
    }
    Ok(student)
}
