mod databases;
mod files;
mod schema;
mod service;

use crate::api::response::ApiError;

pub use databases::{create_database, get_database, list_file_databases};
pub use files::{get_file, upload_csv};
pub use schema::generate_schema;
pub use service::{health, root};

/// Map a registry failure to an ApiError
fn registry_error(e: crate::storage::RegistryError) -> ApiError {
    tracing::error!(error = %e, "Registry operation failed");
    ApiError::internal(e.to_string())
}
