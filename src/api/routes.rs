use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;

    Router::new()
        // Service
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // CSV files
        .route(
            "/api/upload-csv",
            post(handlers::upload_csv).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/files/:id", get(handlers::get_file))
        .route("/api/files/:id/databases", get(handlers::list_file_databases))
        // Schemas
        .route("/api/generate-schema", post(handlers::generate_schema))
        // Databases
        .route("/api/create-database", post(handlers::create_database))
        .route("/api/databases/:id", get(handlers::get_database))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
