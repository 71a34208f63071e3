use std::path::Path;

use crate::error::PipelineError;
use crate::storage::models::{ColumnType, FileRecord};

/// Synthetic primary key prepended to every fallback schema
pub const PRIMARY_KEY_COLUMN: &str = "id INTEGER PRIMARY KEY AUTOINCREMENT";

/// Build a `CREATE TABLE` statement from a file's inferred column types.
///
/// The synthetic `id` key is never merged with a source column of the same name.
/// Datetime and boolean columns are stored as `TEXT`.
pub fn synthesize(file: &FileRecord) -> Result<String, PipelineError> {
    if file.column_types.is_empty() {
        return Err(PipelineError::InvalidInput(format!(
            "file {} has no typed columns",
            file.file_id
        )));
    }

    let table_name = table_name_for(&file.original_name);

    let mut columns = Vec::with_capacity(file.columns.len() + 1);
    columns.push(PRIMARY_KEY_COLUMN.to_string());
    for column in &file.columns {
        let sql_type = match file.column_type(column) {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Boolean | ColumnType::Datetime | ColumnType::Text => "TEXT",
        };
        columns.push(format!("{} {sql_type}", clean_identifier(column)));
    }

    let columns_sql = columns.join(",\n    ");
    Ok(format!("CREATE TABLE {table_name} (\n    {columns_sql}\n);"))
}

/// Table name derived from an uploaded filename: its stem with spaces and hyphens replaced.
pub fn table_name_for(original_name: &str) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    clean_identifier(&stem)
}

fn clean_identifier(name: &str) -> String {
    name.replace([' ', '-'], "_")
}
