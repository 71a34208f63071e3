//! Schema text for ingested files: caller-provided, externally generated, or synthesized.

mod extract;
pub mod fallback;
mod provider;

pub use extract::extract_table_name;
pub use fallback::synthesize;
pub use provider::{
    schema_from_response, HttpSchemaProvider, ProviderError, SchemaProvider, SchemaRequest,
};

use std::sync::Arc;

use serde::Serialize;

use crate::error::PipelineError;
use crate::storage::models::FileRecord;

/// Where a resolved schema came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSource {
    Fallback,
    Provided,
    Provider,
}

#[derive(Debug, Clone)]
pub struct GeneratedSchema {
    pub sql: String,
    pub source: SchemaSource,
}

/// Resolves schema text for a file, degrading to local synthesis whenever the
/// external provider is missing or fails in any way.
pub struct SchemaService {
    provider: Option<Arc<dyn SchemaProvider>>,
}

impl SchemaService {
    pub fn new(provider: Option<Arc<dyn SchemaProvider>>) -> Self {
        Self { provider }
    }

    /// A service that always synthesizes locally.
    pub fn fallback_only() -> Self {
        Self { provider: None }
    }

    pub async fn resolve(
        &self,
        file: &FileRecord,
        provided: Option<&str>,
    ) -> Result<GeneratedSchema, PipelineError> {
        if let Some(sql) = provided.filter(|s| !s.trim().is_empty()) {
            return Ok(GeneratedSchema {
                sql: sql.to_string(),
                source: SchemaSource::Provided,
            });
        }

        if let Some(provider) = &self.provider {
            match provider.generate(&SchemaRequest::for_file(file)).await {
                Ok(sql) if !sql.trim().is_empty() => {
                    return Ok(GeneratedSchema {
                        sql,
                        source: SchemaSource::Provider,
                    });
                }
                Ok(_) => {
                    tracing::warn!(
                        file_id = %file.file_id,
                        "Schema service returned an empty schema, using fallback schema generation"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        file_id = %file.file_id,
                        error = %e,
                        "Schema service error, using fallback schema generation"
                    );
                }
            }
        }

        Ok(GeneratedSchema {
            sql: synthesize(file)?,
            source: SchemaSource::Fallback,
        })
    }
}
