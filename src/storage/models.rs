use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One preview row: column name -> value in the column's native form.
pub type PreviewRow = serde_json::Map<String, serde_json::Value>;

/// Semantic type tag inferred for a CSV column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Boolean,
    Datetime,
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Datetime => "DATETIME",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// An ingested CSV file, stored in the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredFileRecord")]
pub struct FileRecord {
    pub file_id: String,
    pub original_name: String,
    pub storage_path: String,
    pub row_count: u64,
    pub column_count: u64,
    pub columns: Vec<String>,
    pub column_types: HashMap<String, ColumnType>,
    pub preview: Vec<PreviewRow>,
    pub created_at: DateTime<Utc>,
}

/// On-disk shape of a [`FileRecord`]. Older records name the storage location `filepath`.
#[derive(Deserialize)]
struct StoredFileRecord {
    file_id: String,
    original_name: String,
    #[serde(default)]
    storage_path: Option<String>,
    #[serde(default)]
    filepath: Option<String>,
    row_count: u64,
    column_count: u64,
    columns: Vec<String>,
    column_types: HashMap<String, ColumnType>,
    #[serde(default)]
    preview: Vec<PreviewRow>,
    #[serde(default)]
    created_at: DateTime<Utc>,
}

impl From<StoredFileRecord> for FileRecord {
    fn from(stored: StoredFileRecord) -> Self {
        FileRecord {
            file_id: stored.file_id,
            original_name: stored.original_name,
            storage_path: stored.storage_path.or(stored.filepath).unwrap_or_default(),
            row_count: stored.row_count,
            column_count: stored.column_count,
            columns: stored.columns,
            column_types: stored.column_types,
            preview: stored.preview,
            created_at: stored.created_at,
        }
    }
}

impl FileRecord {
    /// Inferred type of a column, `TEXT` when the column is unknown.
    pub fn column_type(&self, column: &str) -> ColumnType {
        self.column_types
            .get(column)
            .copied()
            .unwrap_or(ColumnType::Text)
    }
}

/// A SQLite database materialized from an ingested file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseRecord {
    pub database_id: String,
    pub file_id: String,
    pub database_path: String,
    pub table_name: String,
    pub row_count: u64,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}
