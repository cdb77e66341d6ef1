pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::profile::handlers as profile;
use crate::state::AppState;

/// Headroom over the file size limit for multipart framing and other fields.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/resumes/extract",
            post(extraction::handle_extract).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/v1/profiles/merge", post(profile::handle_merge))
        .with_state(state)
}
