use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::storage::models::{FileRecord, PreviewRow};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Schema service timeout after {0} seconds")]
    Timeout(u64),
    #[error("HTTP error calling schema service: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Schema service returned {0}")]
    Status(reqwest::StatusCode),
    #[error("Unexpected response format from schema service: {0}")]
    UnexpectedResponse(String),
}

/// Payload sent to an external schema generator
#[derive(Debug, Clone, Serialize)]
pub struct SchemaRequest {
    pub file_id: String,
    pub filename: String,
    pub columns: Vec<String>,
    pub sample_data: Vec<PreviewRow>,
    pub row_count: u64,
}

impl SchemaRequest {
    pub fn for_file(file: &FileRecord) -> Self {
        Self {
            file_id: file.file_id.clone(),
            filename: file.original_name.clone(),
            columns: file.columns.clone(),
            sample_data: file.preview.clone(),
            row_count: file.row_count,
        }
    }
}

/// An external collaborator that proposes schema text for an ingested file.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    async fn generate(&self, request: &SchemaRequest) -> Result<String, ProviderError>;
}

/// Schema provider reached over HTTP.
///
/// Accepts a JSON response carrying the schema under either `schema` or `sql`.
pub struct HttpSchemaProvider {
    client: Client,
    timeout: Duration,
    url: String,
}

impl HttpSchemaProvider {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            timeout,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SchemaProvider for HttpSchemaProvider {
    async fn generate(&self, request: &SchemaRequest) -> Result<String, ProviderError> {
        let resp = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !resp.status().is_success() {
            return Err(ProviderError::Status(resp.status()));
        }

        let body: serde_json::Value = resp.json().await.map_err(|e| self.classify(e))?;
        schema_from_response(&body)
    }
}

impl HttpSchemaProvider {
    fn classify(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(self.timeout.as_secs())
        } else {
            ProviderError::Http(e)
        }
    }
}

/// Pull schema text out of a provider response (`{"schema": ...}` or `{"sql": ...}`).
pub fn schema_from_response(body: &serde_json::Value) -> Result<String, ProviderError> {
    let schema = body
        .get("schema")
        .or_else(|| body.get("sql"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| ProviderError::UnexpectedResponse(body.to_string()))?;

    if schema.trim().is_empty() {
        return Err(ProviderError::UnexpectedResponse(body.to_string()));
    }
    Ok(schema.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_key() {
        let body = serde_json::json!({"schema": "CREATE TABLE t (id INTEGER);"});
        assert_eq!(
            schema_from_response(&body).unwrap(),
            "CREATE TABLE t (id INTEGER);"
        );
    }

    #[test]
    fn test_sql_key() {
        let body = serde_json::json!({"sql": "CREATE TABLE t (id INTEGER);"});
        assert!(schema_from_response(&body).is_ok());
    }

    #[test]
    fn test_unexpected_shapes() {
        for body in [
            serde_json::json!({"ddl": "CREATE TABLE t (id INTEGER);"}),
            serde_json::json!({"schema": 42}),
            serde_json::json!({"schema": "   "}),
            serde_json::json!(["CREATE TABLE t (id INTEGER);"]),
        ] {
            assert!(matches!(
                schema_from_response(&body),
                Err(ProviderError::UnexpectedResponse(_))
            ));
        }
    }
}
