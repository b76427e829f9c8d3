use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::handlers;
use crate::state::AppState;

/// Body limit above the per-file cap, leaving room for multipart framing
/// and a couple of files per request.
const BODY_LIMIT: usize = 64 * 1024 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/sessions", post(handlers::create_session))
        .route("/api/sessions/:id", get(handlers::get_session))
        .route("/api/sessions/:id/files", post(handlers::upload_files))
        .route("/api/sessions/:id/text", put(handlers::set_text))
        .route("/api/sessions/:id/extract", post(handlers::run_extract))
        .route("/api/sessions/:id/expose", put(handlers::save_expose))
        .route("/api/sessions/:id/export", post(handlers::export_pdf))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
