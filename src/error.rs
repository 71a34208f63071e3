use thiserror::Error;

use crate::ingest::ParseError;
use crate::materialize::MaterializeError;
use crate::object_store::ObjectStoreError;
use crate::storage::RegistryError;

/// Failure of an ingest, schema, or materialize operation.
///
/// Each variant keeps its underlying cause so callers can branch on the failure kind.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Failed to parse CSV: {0}")]
    Parse(#[from] ParseError),
    #[error("Could not extract table name from schema")]
    SchemaParse,
    #[error("Error creating database: {0}")]
    Materialization(#[from] MaterializeError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("Object store error: {0}")]
    ObjectStore(#[from] ObjectStoreError),
}
