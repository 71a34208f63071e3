use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use data_query::{
    api,
    config::Config,
    schema::{HttpSchemaProvider, SchemaProvider, SchemaService},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "data-query starting");

    // Load configuration
    let config = Config::load()?;

    // External schema service (optional)
    let provider: Option<Arc<dyn SchemaProvider>> = match config.schema_service.url.as_deref() {
        Some(url) => {
            let provider = HttpSchemaProvider::new(url, config.schema_service.timeout())?;
            info!(
                "Using schema service at: {} (timeout {}s)",
                url, config.schema_service.timeout_seconds
            );
            Some(Arc::new(provider) as Arc<dyn SchemaProvider>)
        }
        None => {
            info!("No schema service configured, schemas will use fallback generation");
            None
        }
    };

    // Registry, upload store and pipeline services
    let state = Arc::new(AppState::new(config.clone(), SchemaService::new(provider))?);
    info!("Registry opened at: {}", config.node.data_dir);
    info!("Uploads stored in: {}", config.storage.upload_dir);
    info!("Databases created in: {}", config.storage.db_dir);

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.node.bind_address).await?;
    info!("Listening on: {}", config.node.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
