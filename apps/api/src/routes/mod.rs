pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::analytics::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ingest
        .route(
            "/api/analytics/sessions",
            post(handlers::handle_session_start),
        )
        .route("/api/analytics/page-view", post(handlers::handle_page_view))
        .route("/api/analytics/events", post(handlers::handle_event))
        // Dashboard
        .route("/api/analytics/summary", get(handlers::handle_summary))
        .route("/api/analytics/export", get(handlers::handle_export))
        .fallback(not_found)
        .with_state(state)
}
