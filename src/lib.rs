//! data-query - CSV ingestion, schema inference and SQLite materialization
//!
//! This crate turns uploaded CSV files into standalone SQLite databases:
//! - CSV ingestion with column-wide type inference
//! - Schema text from an external generator, with a deterministic local fallback
//! - All-or-nothing materialization with row-count verification
//! - redb embedded registry addressing files and databases by id (ACID, crash-safe)
//! - REST API with multipart upload support

pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod materialize;
pub mod object_store;
pub mod schema;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use config::Config;
use ingest::Ingestor;
use materialize::Materializer;
use object_store::LocalStore;
use schema::SchemaService;
use storage::Registry;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub registry: Registry,
    pub ingestor: Ingestor,
    pub materializer: Materializer,
    pub schemas: SchemaService,
}

impl AppState {
    /// Wire the registry, upload store and pipeline services from configuration.
    pub fn new(config: Config, schemas: SchemaService) -> anyhow::Result<Self> {
        let registry = Registry::open(&config.node.data_dir)?;
        let uploads: Arc<dyn object_store::ObjectStore> =
            Arc::new(LocalStore::new(&config.storage.upload_dir)?);

        let ingestor = Ingestor::new(registry.clone(), Arc::clone(&uploads));
        let materializer = Materializer::new(registry.clone(), uploads, &config.storage.db_dir)?;

        Ok(Self {
            config,
            registry,
            ingestor,
            materializer,
            schemas,
        })
    }
}
