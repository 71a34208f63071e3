use redb::{Database as RedbDatabase, ReadTransaction, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::tables::*;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Record already exists: {0}")]
    AlreadyExists(String),
    #[error("Commit error: {0}")]
    Commit(Box<redb::CommitError>),
    #[error("Database error: {0}")]
    Redb(Box<redb::Error>),
    #[error("Database error: {0}")]
    RedbDatabase(Box<redb::DatabaseError>),
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),
    #[error("Storage error: {0}")]
    Storage(Box<redb::StorageError>),
    #[error("Table error: {0}")]
    Table(Box<redb::TableError>),
    #[error("Transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
}

impl From<redb::CommitError> for RegistryError {
    fn from(e: redb::CommitError) -> Self {
        RegistryError::Commit(Box::new(e))
    }
}

impl From<redb::DatabaseError> for RegistryError {
    fn from(e: redb::DatabaseError) -> Self {
        RegistryError::RedbDatabase(Box::new(e))
    }
}

impl From<redb::Error> for RegistryError {
    fn from(e: redb::Error) -> Self {
        RegistryError::Redb(Box::new(e))
    }
}

impl From<redb::StorageError> for RegistryError {
    fn from(e: redb::StorageError) -> Self {
        RegistryError::Storage(Box::new(e))
    }
}

impl From<redb::TableError> for RegistryError {
    fn from(e: redb::TableError) -> Self {
        RegistryError::Table(Box::new(e))
    }
}

impl From<redb::TransactionError> for RegistryError {
    fn from(e: redb::TransactionError) -> Self {
        RegistryError::Transaction(Box::new(e))
    }
}

/// Durable metadata registry for ingested files and materialized databases.
///
/// Every read opens a fresh read transaction, so it observes the latest committed state.
/// Every write is a single write transaction; redb serializes writers, which makes each
/// check-then-insert cycle atomic.
pub struct Registry {
    db: Arc<RedbDatabase>,
}

impl Clone for Registry {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl Registry {
    /// Open or create the registry in the given directory
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, RegistryError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("registry.redb");
        let db = Arc::new(RedbDatabase::create(db_path)?);

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(FILES)?;
            let _ = write_txn.open_table(DATABASES)?;
            let _ = write_txn.open_table(FILE_DATABASES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Begin a read transaction
    pub fn begin_read(&self) -> Result<ReadTransaction, RegistryError> {
        Ok(self.db.begin_read()?)
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> Result<WriteTransaction, RegistryError> {
        Ok(self.db.begin_write()?)
    }
}
