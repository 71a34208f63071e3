use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::api::response::JSend;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub endpoints: serde_json::Value,
    pub message: String,
    pub version: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn root() -> Json<JSend<RootResponse>> {
    JSend::success(RootResponse {
        endpoints: serde_json::json!({
            "upload_csv": "/api/upload-csv",
            "generate_schema": "/api/generate-schema",
            "create_database": "/api/create-database",
            "file": "/api/files/:id",
            "database": "/api/databases/:id",
            "health": "/health",
        }),
        message: "Data Query Backend API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
