use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::registry_error;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::schema::SchemaSource;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateSchemaRequest {
    pub file_id: String,
    /// Schema text supplied by the caller, returned unchanged when present
    #[serde(default)]
    pub sql_schema: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub file_id: String,
    pub source: SchemaSource,
    pub sql_schema: String,
}

pub async fn generate_schema(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<GenerateSchemaRequest>,
) -> Result<Json<JSend<SchemaResponse>>, ApiError> {
    let file = state
        .registry
        .get_file(&req.file_id)
        .map_err(registry_error)?
        .ok_or_else(|| ApiError::not_found(format!("File with ID {} not found", req.file_id)))?;

    let schema = state
        .schemas
        .resolve(&file, req.sql_schema.as_deref())
        .await?;

    tracing::debug!(file_id = %req.file_id, source = ?schema.source, "Generated schema");

    Ok(JSend::success(SchemaResponse {
        file_id: req.file_id,
        source: schema.source,
        sql_schema: schema.sql,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{test_state, USERS_CSV};
    use axum::http::StatusCode;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_generate_schema_uses_fallback_without_provider() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let record = state
            .ingestor
            .ingest(Bytes::from(USERS_CSV), "test.csv")
            .await
            .unwrap();

        let req = GenerateSchemaRequest {
            file_id: record.file_id.clone(),
            sql_schema: None,
        };
        let Json(body) = generate_schema(State(state), AppJson(req)).await.unwrap();

        assert_eq!(body.data.source, SchemaSource::Fallback);
        assert!(body.data.sql_schema.starts_with("CREATE TABLE test ("));
    }

    #[tokio::test]
    async fn test_generate_schema_returns_provided_schema() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let record = state
            .ingestor
            .ingest(Bytes::from(USERS_CSV), "test.csv")
            .await
            .unwrap();

        let schema = "CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT);";
        let req = GenerateSchemaRequest {
            file_id: record.file_id,
            sql_schema: Some(schema.to_string()),
        };
        let Json(body) = generate_schema(State(state), AppJson(req)).await.unwrap();

        assert_eq!(body.data.source, SchemaSource::Provided);
        assert_eq!(body.data.sql_schema, schema);
    }

    #[tokio::test]
    async fn test_generate_schema_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let req = GenerateSchemaRequest {
            file_id: "non-existent-id".to_string(),
            sql_schema: None,
        };
        let err = generate_schema(State(state), AppJson(req)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
