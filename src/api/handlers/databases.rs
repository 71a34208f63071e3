use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::registry_error;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::storage::models::DatabaseRecord;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateDatabaseRequest {
    pub file_id: String,
    pub sql_schema: String,
    /// Optional file stem for the database; defaults to the file id
    #[serde(default)]
    pub db_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DatabaseResponse {
    pub created_at: String,
    pub database_id: String,
    pub database_path: String,
    pub file_id: String,
    pub row_count: u64,
    pub table_name: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_database(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateDatabaseRequest>,
) -> Result<Json<JSend<DatabaseResponse>>, ApiError> {
    let record = state
        .materializer
        .materialize(&req.file_id, &req.sql_schema, req.db_name.as_deref())
        .await?;

    Ok(JSend::success(database_to_response(&record)))
}

pub async fn get_database(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<DatabaseResponse>>, ApiError> {
    let database = state
        .registry
        .get_database(&id)
        .map_err(registry_error)?
        .ok_or_else(|| ApiError::not_found(format!("Database with ID {id} not found")))?;

    Ok(JSend::success(database_to_response(&database)))
}

pub async fn list_file_databases(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Json<JSend<Vec<DatabaseResponse>>>, ApiError> {
    state
        .registry
        .get_file(&file_id)
        .map_err(registry_error)?
        .ok_or_else(|| ApiError::not_found(format!("File with ID {file_id} not found")))?;

    let databases = state
        .registry
        .databases_for_file(&file_id)
        .map_err(registry_error)?;

    Ok(JSend::success(
        databases.iter().map(database_to_response).collect(),
    ))
}

// ============================================================================
// Helpers
// ============================================================================

fn database_to_response(database: &DatabaseRecord) -> DatabaseResponse {
    DatabaseResponse {
        created_at: database.created_at.to_rfc3339(),
        database_id: database.database_id.clone(),
        database_path: database.database_path.clone(),
        file_id: database.file_id.clone(),
        row_count: database.row_count,
        table_name: database.table_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{test_state, USERS_CSV};
    use axum::http::StatusCode;
    use bytes::Bytes;

    const USERS_SCHEMA: &str = "CREATE TABLE users (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT UNIQUE,
        age INTEGER CHECK (age > 0)
    );";

    #[tokio::test]
    async fn test_create_database_with_custom_name() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let file = state
            .ingestor
            .ingest(Bytes::from(USERS_CSV), "users.csv")
            .await
            .unwrap();

        let req = CreateDatabaseRequest {
            file_id: file.file_id.clone(),
            sql_schema: USERS_SCHEMA.to_string(),
            db_name: Some("my_custom_database".to_string()),
        };
        let Json(body) = create_database(State(Arc::clone(&state)), AppJson(req))
            .await
            .unwrap();

        assert_eq!(body.data.row_count, 3);
        assert_eq!(body.data.table_name, "users");
        assert!(body.data.database_path.contains("my_custom_database"));
        assert!(body.data.database_path.ends_with(".db"));

        let Json(listed) = list_file_databases(State(state), Path(file.file_id))
            .await
            .unwrap();
        assert_eq!(listed.data.len(), 1);
        assert_eq!(listed.data[0].database_id, body.data.database_id);
    }

    #[tokio::test]
    async fn test_create_database_invalid_schema() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let file = state
            .ingestor
            .ingest(Bytes::from(USERS_CSV), "users.csv")
            .await
            .unwrap();

        let req = CreateDatabaseRequest {
            file_id: file.file_id,
            sql_schema: "INVALID SQL STATEMENT".to_string(),
            db_name: None,
        };
        let err = create_database(State(state), AppJson(req))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_database_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let req = CreateDatabaseRequest {
            file_id: "non-existent-id".to_string(),
            sql_schema: "CREATE TABLE test (id INTEGER);".to_string(),
            db_name: None,
        };
        let err = create_database(State(state), AppJson(req))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_database_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let err = get_database(State(state), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
