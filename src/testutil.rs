//! Shared test helpers for handler tests.

use std::sync::Arc;

use crate::config::{Config, NodeConfig, SchemaServiceConfig, StorageConfig};
use crate::schema::SchemaService;
use crate::AppState;

pub const USERS_CSV: &str = "id,name,email,age
1,Alice,alice@example.com,30
2,Bob,bob@example.com,25
3,Charlie,charlie@example.com,35
";

/// Create a test AppState rooted in a temporary directory, with no external schema service.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let root = temp_dir.path();

    let config = Config {
        node: NodeConfig {
            bind_address: "127.0.0.1:0".to_string(),
            data_dir: root.join("data").to_string_lossy().to_string(),
        },
        storage: StorageConfig {
            upload_dir: root.join("uploads").to_string_lossy().to_string(),
            db_dir: root.join("databases").to_string_lossy().to_string(),
        },
        schema_service: SchemaServiceConfig {
            url: None,
            timeout_seconds: 1,
        },
        max_upload_size: 10 * 1024 * 1024, // 10MB for tests
    };

    let state =
        AppState::new(config, SchemaService::fallback_only()).expect("Failed to build test state");
    Arc::new(state)
}
