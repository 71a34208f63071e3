use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub node: NodeConfig,
    pub storage: StorageConfig,
    pub schema_service: SchemaServiceConfig,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_address: String,
    /// Directory holding the metadata registry
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory for raw CSV uploads
    pub upload_dir: String,
    /// Directory for materialized SQLite databases
    pub db_dir: String,
}

#[derive(Debug, Clone)]
pub struct SchemaServiceConfig {
    /// Endpoint of the external schema generator. `None` disables it.
    pub url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            data_dir: "./data".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: "./uploads".to_string(),
            db_dir: "./databases".to_string(),
        }
    }
}

impl Default for SchemaServiceConfig {
    fn default() -> Self {
        Self {
            url: Some("http://localhost:3000/api/generate-schema".to_string()),
            timeout_seconds: 60,
        }
    }
}

impl SchemaServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let node_defaults = NodeConfig::default();
        let storage_defaults = StorageConfig::default();
        let schema_defaults = SchemaServiceConfig::default();

        let bind_address = std::env::var("BIND_ADDRESS").unwrap_or(node_defaults.bind_address);
        let data_dir = std::env::var("DATA_DIR").unwrap_or(node_defaults.data_dir);

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or(storage_defaults.upload_dir);
        let db_dir = std::env::var("DB_DIR").unwrap_or(storage_defaults.db_dir);

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100 * 1024 * 1024); // 100MB

        // An explicitly empty URL turns the external schema service off
        let schema_url = match std::env::var("SCHEMA_SERVICE_URL") {
            Ok(url) if url.trim().is_empty() => None,
            Ok(url) => Some(url),
            Err(_) => schema_defaults.url,
        };

        let timeout_seconds = match std::env::var("SCHEMA_SERVICE_TIMEOUT") {
            Ok(s) => s.parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "SCHEMA_SERVICE_TIMEOUT must be a whole number of seconds, got '{s}'"
                ))
            })?,
            Err(_) => schema_defaults.timeout_seconds,
        };

        let config = Config {
            node: NodeConfig {
                bind_address,
                data_dir,
            },
            storage: StorageConfig { upload_dir, db_dir },
            schema_service: SchemaServiceConfig {
                url: schema_url,
                timeout_seconds,
            },
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.data_dir.is_empty() {
            return Err(ConfigError::ValidationError(
                "DATA_DIR cannot be empty".to_string(),
            ));
        }

        if self.storage.upload_dir.is_empty() || self.storage.db_dir.is_empty() {
            return Err(ConfigError::ValidationError(
                "UPLOAD_DIR and DB_DIR cannot be empty".to_string(),
            ));
        }

        if self.schema_service.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "SCHEMA_SERVICE_TIMEOUT must be greater than 0".to_string(),
            ));
        }

        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.storage.upload_dir == self.storage.db_dir {
            tracing::warn!(
                "UPLOAD_DIR and DB_DIR are the same directory ({}). \
                 Uploads and databases will be mixed.",
                self.storage.upload_dir
            );
        }

        Ok(())
    }
}
