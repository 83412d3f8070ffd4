//! cvsearch API Server
//!
//! Accepts resume uploads and answers free-text candidate searches.
//!
//! Author: hephaex@gmail.com

use cvsearch_api::{create_router, state::AppState};
use cvsearch_core::config::{AppConfig, LoggingConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
fn default_filter(level: &str) -> String {
    format!(
        "cvsearch_api={level},cvsearch_parser={level},cvsearch_llm={level},\
         cvsearch_vector={level},tower_http={level}"
    )
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&logging.level).into());

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (defaults <- config file <- environment)
    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    let addr = config.bind_addr();
    tracing::info!(
        backend = ?config.vector_store.backend,
        collection = %config.vector_store.collection,
        "Configuration loaded"
    );

    // Create application state
    let state = Arc::new(AppState::initialize(config).await?);

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("cvsearch API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_debug_for_api_and_http() {
        let filter = default_filter(&LoggingConfig::default().level);
        assert!(filter.contains("cvsearch_api=debug"));
        assert!(filter.contains("tower_http=debug"));
        assert!(filter.parse::<EnvFilter>().is_ok());
    }
}
