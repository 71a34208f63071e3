//! Materialization of an ingested file into a standalone SQLite database.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::{params_from_iter, Batch, Connection, ToSql};
use thiserror::Error;

use crate::error::PipelineError;
use crate::ingest::{parse_csv, Cell, ParseError};
use crate::object_store::{ObjectStore, ObjectStoreError};
use crate::schema::extract_table_name;
use crate::storage::models::DatabaseRecord;
use crate::storage::{Registry, RegistryError};

/// Extension of materialized database files
pub const DATABASE_EXTENSION: &str = "db";

/// Files SQLite may leave next to a database
const SIDECAR_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("database file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("schema contains no SQL statement")]
    EmptySchema,
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to re-read source file: {0}")]
    Source(#[from] ParseError),
    #[error("failed to register database: {0}")]
    Registry(#[from] RegistryError),
    #[error("load task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(Value::Null),
            Cell::Integer(i) => ToSqlOutput::from(*i),
            Cell::Real(f) => ToSqlOutput::from(*f),
            Cell::Boolean(b) => ToSqlOutput::from(*b),
            Cell::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

pub struct Materializer {
    registry: Registry,
    object_store: Arc<dyn ObjectStore>,
    db_dir: PathBuf,
}

impl Materializer {
    pub fn new<P: AsRef<Path>>(
        registry: Registry,
        object_store: Arc<dyn ObjectStore>,
        db_dir: P,
    ) -> Result<Self, std::io::Error> {
        let db_dir = db_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&db_dir)?;
        Ok(Self {
            registry,
            object_store,
            db_dir,
        })
    }

    pub fn db_dir(&self) -> &Path {
        &self.db_dir
    }

    /// Create a SQLite database from an ingested file and a schema.
    ///
    /// All-or-nothing: on any failure after the database file is created, the file is
    /// removed and no [`DatabaseRecord`] is registered. `name`, when given, must not be in
    /// use by a concurrent call.
    pub async fn materialize(
        &self,
        file_id: &str,
        schema: &str,
        name: Option<&str>,
    ) -> Result<DatabaseRecord, PipelineError> {
        let file = self
            .registry
            .get_file(file_id)?
            .ok_or_else(|| PipelineError::NotFound(format!("File with ID {file_id}")))?;

        if schema.trim().is_empty() {
            return Err(PipelineError::InvalidInput("schema must not be empty".into()));
        }

        let database_id = uuid::Uuid::new_v4().to_string();
        let database_path = self.database_path(file_id, name)?;
        let table_name = extract_table_name(schema)?;

        let data = self
            .object_store
            .get(&file.storage_path)
            .await
            .map_err(|e| match e {
                ObjectStoreError::NotFound(_) => {
                    PipelineError::NotFound(format!("Stored CSV for file {file_id}"))
                }
                other => PipelineError::ObjectStore(other),
            })?;

        if database_path.exists() {
            return Err(MaterializeError::AlreadyExists(database_path).into());
        }

        let load_path = database_path.clone();
        let load_schema = schema.to_string();
        let load_table = table_name.clone();
        let loaded = tokio::task::spawn_blocking(move || {
            build_database(&load_path, &load_schema, &load_table, &data)
        })
        .await
        .map_err(MaterializeError::from)
        .and_then(|result| result);

        let row_count = match loaded {
            Ok(count) => count,
            Err(e) => {
                remove_database_files(&database_path);
                return Err(e.into());
            }
        };

        if row_count != file.row_count {
            tracing::warn!(
                database_id = %database_id,
                expected = file.row_count,
                actual = row_count,
                "Row count differs from source file"
            );
        }

        let record = DatabaseRecord {
            database_id: database_id.clone(),
            file_id: file_id.to_string(),
            database_path: database_path.to_string_lossy().into_owned(),
            table_name,
            row_count,
            created_at: Utc::now(),
        };

        if let Err(e) = self.registry.insert_database(&record) {
            remove_database_files(&database_path);
            return Err(MaterializeError::from(e).into());
        }

        tracing::debug!(
            database_id = %database_id,
            file_id = %file_id,
            table = %record.table_name,
            rows = row_count,
            "Materialized database"
        );

        Ok(record)
    }

    /// Target path for a database: `<db_dir>/<name or file_id>.db`.
    fn database_path(&self, file_id: &str, name: Option<&str>) -> Result<PathBuf, PipelineError> {
        let stem = match name {
            Some(name) => {
                validate_database_name(name)?;
                name
            }
            None => file_id,
        };
        Ok(self.db_dir.join(format!("{stem}.{DATABASE_EXTENSION}")))
    }
}

fn validate_database_name(name: &str) -> Result<(), PipelineError> {
    if name.trim().is_empty() {
        return Err(PipelineError::InvalidInput(
            "database name must not be empty".into(),
        ));
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(PipelineError::InvalidInput(format!(
            "invalid database name '{name}'"
        )));
    }
    Ok(())
}

/// Create the database, run the schema, and load every CSV row in one transaction.
/// Returns the row count of `table_name` after the load.
fn build_database(
    path: &Path,
    schema: &str,
    table_name: &str,
    data: &[u8],
) -> Result<u64, MaterializeError> {
    let parsed = parse_csv(data)?;

    let mut conn = Connection::open(path)?;
    run_schema(&conn, schema)?;

    let tx = conn.transaction()?;
    {
        let column_list = parsed
            .columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=parsed.column_count())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let insert_sql = format!(
            "INSERT INTO {} ({column_list}) VALUES ({placeholders})",
            quote_identifier(table_name)
        );

        let mut stmt = tx.prepare(&insert_sql)?;
        for row in &parsed.rows {
            stmt.execute(params_from_iter(row.iter()))?;
        }
    }

    let count: i64 = tx.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_identifier(table_name)),
        [],
        |row| row.get(0),
    )?;
    tx.commit()?;

    Ok(count as u64)
}

/// Execute schema text holding exactly one statement.
///
/// Trailing statements are refused before anything runs, so the database only ever
/// holds the table the schema declares.
fn run_schema(conn: &Connection, schema: &str) -> Result<(), MaterializeError> {
    let mut batch = Batch::new(conn, schema);
    let mut stmt = batch.next()?.ok_or(MaterializeError::EmptySchema)?;
    if batch.next()?.is_some() {
        return Err(rusqlite::Error::MultipleStatement.into());
    }
    stmt.execute([])?;
    Ok(())
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Best-effort removal of a database file and its SQLite sidecars.
fn remove_database_files(path: &Path) {
    let mut targets = vec![path.to_path_buf()];
    for suffix in SIDECAR_SUFFIXES {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(suffix);
        targets.push(PathBuf::from(sidecar));
    }

    for target in targets {
        if target.exists() {
            if let Err(e) = std::fs::remove_file(&target) {
                tracing::warn!(path = %target.display(), error = %e, "Failed to remove database file");
            }
        }
    }
}
