//! CSV ingestion: parse, persist the raw upload, and register a [`FileRecord`].

mod parse;

pub use parse::{parse_csv, Cell, ParseError, ParsedCsv, PREVIEW_ROWS};

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;

use crate::error::PipelineError;
use crate::object_store::ObjectStore;
use crate::storage::models::FileRecord;
use crate::storage::Registry;

/// Extension accepted by the upload boundary
pub const CSV_EXTENSION: &str = "csv";

/// Whether a submitted filename names a CSV file.
pub fn has_csv_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CSV_EXTENSION))
}

pub struct Ingestor {
    registry: Registry,
    object_store: Arc<dyn ObjectStore>,
}

impl Ingestor {
    pub fn new(registry: Registry, object_store: Arc<dyn ObjectStore>) -> Self {
        Self {
            registry,
            object_store,
        }
    }

    /// Ingest an uploaded CSV file.
    ///
    /// The bytes are parsed before anything is written, so malformed input leaves no trace.
    /// If registering the record fails, the stored upload is removed again.
    pub async fn ingest(&self, data: Bytes, original_name: &str) -> Result<FileRecord, PipelineError> {
        let parsed = parse_csv(&data)?;

        let file_id = uuid::Uuid::new_v4().to_string();
        let storage_path = self
            .object_store
            .put(&format!("{file_id}.{CSV_EXTENSION}"), data)
            .await?;

        let record = FileRecord {
            file_id: file_id.clone(),
            original_name: original_name.to_string(),
            storage_path: storage_path.clone(),
            row_count: parsed.row_count() as u64,
            column_count: parsed.column_count() as u64,
            columns: parsed.columns.clone(),
            column_types: parsed.type_map(),
            preview: parsed.preview(),
            created_at: Utc::now(),
        };

        if let Err(e) = self.registry.insert_file(&record) {
            if let Err(cleanup) = self.object_store.delete(&storage_path).await {
                tracing::warn!(file_id = %file_id, error = %cleanup, "Failed to remove orphaned upload");
            }
            return Err(e.into());
        }

        tracing::debug!(
            file_id = %file_id,
            rows = record.row_count,
            columns = record.column_count,
            "Ingested CSV file"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_csv_extension() {
        assert!(has_csv_extension("users.csv"));
        assert!(has_csv_extension("Users Export.CSV"));
        assert!(!has_csv_extension("users.txt"));
        assert!(!has_csv_extension("users.csv.gz"));
        assert!(!has_csv_extension("csv"));
        assert!(!has_csv_extension(""));
    }
}
