pub mod annotations;
pub mod extract;
pub mod highlights;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use state::AppState;

pub use middleware::require_profile;

/// Builds the full API router: public health check plus the profile-guarded routes.
pub fn router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS origin: {e}")))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static(middleware::USER_ID_HEADER),
        ]);

    // Public routes (no profile required)
    let public_routes = Router::new().route("/health", get(rest::health_handler));

    // Protected routes (profile required)
    let protected_routes = Router::new()
        .route("/categories", get(highlights::list_categories_handler))
        .route("/highlights", post(highlights::create_highlight_handler))
        .route(
            "/highlights/{highlight_id}",
            axum::routing::delete(highlights::delete_highlight_handler),
        )
        .route(
            "/highlights/{highlight_id}/resolve",
            post(highlights::resolve_highlight_handler),
        )
        .route(
            "/highlights/{highlight_id}/unresolve",
            post(highlights::unresolve_highlight_handler),
        )
        .route(
            "/students/{student_id}/highlights",
            get(highlights::list_highlights_handler),
        )
        .route(
            "/students/{student_id}/progress",
            get(highlights::student_progress_handler),
        )
        .route(
            "/students/{student_id}/pages/{page}/progress",
            get(highlights::page_progress_handler),
        )
        .route(
            "/students/{student_id}/pages/{page}/annotations",
            get(annotations::get_annotation_handler).put(annotations::save_annotation_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_profile,
        ));

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(app_state.config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
