use std::collections::HashMap;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;

use super::registry_error;
use crate::api::response::{ApiError, JSend};
use crate::ingest::has_csv_extension;
use crate::storage::models::{ColumnType, FileRecord, PreviewRow};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub column_count: u64,
    pub column_types: HashMap<String, ColumnType>,
    pub columns: Vec<String>,
    pub created_at: String,
    pub file_id: String,
    pub filename: String,
    pub preview: Vec<PreviewRow>,
    pub row_count: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn upload_csv(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<JSend<FileResponse>>, ApiError> {
    let mut file_data: Option<Bytes> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        if field.name() != Some("file") {
            // Ignore unknown fields
            continue;
        }

        file_name = field.file_name().map(|s| s.to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;

        if data.len() as u64 > state.config.max_upload_size {
            return Err(ApiError::payload_too_large(format!(
                "File exceeds maximum upload size of {} bytes",
                state.config.max_upload_size
            )));
        }

        file_data = Some(data);
    }

    let file_data = file_data.ok_or_else(|| ApiError::bad_request("file field is required"))?;
    let file_name = file_name.ok_or_else(|| ApiError::bad_request("file must have a filename"))?;

    if !has_csv_extension(&file_name) {
        return Err(ApiError::bad_request("Only CSV files are supported"));
    }

    let record = state.ingestor.ingest(file_data, &file_name).await?;

    Ok(JSend::success(file_to_response(&record)))
}

pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<FileResponse>>, ApiError> {
    let file = state
        .registry
        .get_file(&id)
        .map_err(registry_error)?
        .ok_or_else(|| ApiError::not_found(format!("File with ID {id} not found")))?;

    Ok(JSend::success(file_to_response(&file)))
}

// ============================================================================
// Helpers
// ============================================================================

fn file_to_response(file: &FileRecord) -> FileResponse {
    FileResponse {
        column_count: file.column_count,
        column_types: file.column_types.clone(),
        columns: file.columns.clone(),
        created_at: file.created_at.to_rfc3339(),
        file_id: file.file_id.clone(),
        filename: file.original_name.clone(),
        preview: file.preview.clone(),
        row_count: file.row_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::create_router;
    use crate::testutil::{test_state, USERS_CSV};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const BOUNDARY: &str = "data-query-test-boundary";

    fn upload_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: text/csv\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/upload-csv")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(
        state: Arc<AppState>,
        request: Request<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let response = create_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_upload_csv() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let (status, body) = send(
            Arc::clone(&state),
            upload_request("file", "test.csv", USERS_CSV.as_bytes()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["filename"], "test.csv");
        assert_eq!(body["data"]["row_count"], 3);
        assert_eq!(body["data"]["column_count"], 4);
        assert_eq!(
            body["data"]["columns"],
            serde_json::json!(["id", "name", "email", "age"])
        );
        assert_eq!(body["data"]["column_types"]["age"], "INTEGER");
        assert_eq!(body["data"]["preview"][0]["name"], "Alice");

        let file_id = body["data"]["file_id"].as_str().unwrap();
        assert!(state.registry.get_file(file_id).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_upload_rejects_non_csv() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let (status, body) = send(
            Arc::clone(&state),
            upload_request("file", "test.txt", b"not a csv file"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "fail");
        assert_eq!(body["data"]["message"], "Only CSV files are supported");
        assert!(state.registry.list_files().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_requires_file_field() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let (status, body) = send(
            state,
            upload_request("attachment", "test.csv", USERS_CSV.as_bytes()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"]["message"], "file field is required");
    }

    #[tokio::test]
    async fn test_upload_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let (status, body) = send(
            Arc::clone(&state),
            upload_request("file", "empty.csv", b""),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status"], "fail");
        assert!(state.registry.list_files().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let record = state
            .ingestor
            .ingest(Bytes::from(USERS_CSV), "users.csv")
            .await
            .unwrap();

        let Json(body) = get_file(State(state), Path(record.file_id.clone()))
            .await
            .unwrap();
        assert_eq!(body.data.file_id, record.file_id);
        assert_eq!(body.data.filename, "users.csv");
        assert_eq!(body.data.row_count, 3);
        assert_eq!(body.data.columns, vec!["id", "name", "email", "age"]);
    }

    #[tokio::test]
    async fn test_get_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);

        let err = get_file(State(state), Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
