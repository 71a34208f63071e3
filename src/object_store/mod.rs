mod local;

pub use local::LocalStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
}

/// Abstraction over raw upload storage.
///
/// `put` takes a key and returns the location the bytes were written to; every other
/// operation addresses objects by that location, which is what the registry records.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes) -> Result<String, ObjectStoreError>;
    async fn get(&self, location: &str) -> Result<Bytes, ObjectStoreError>;
    async fn delete(&self, location: &str) -> Result<(), ObjectStoreError>;
    async fn exists(&self, location: &str) -> Result<bool, ObjectStoreError>;
}
