//! Router configuration for the web front-end.

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{download_file, index, list_files_json, upload_file, AppState};

/// Room left for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the main router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let body_limit = usize::try_from(app_state.max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let api_routes = Router::new().route("/files", get(list_files_json));

    Router::new()
        .route("/", get(index).post(upload_file))
        .route("/files/:file_name", get(download_file))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
