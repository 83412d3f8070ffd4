//! cvsearch API - HTTP server for resume upload and semantic search
//!
//! Author: hephaex@gmail.com

pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod state;

use crate::handlers::{health, resumes};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use cvsearch_core::config::ServerConfig;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "cvsearch API",
        description = "Resume ingestion and semantic search",
        version = "0.1.0"
    ),
    paths(
        health::health_check,
        resumes::upload_resume,
        resumes::search_resumes,
    ),
    components(schemas(
        health::HealthResponse,
        resumes::UploadForm,
        resumes::UploadResponse,
        resumes::SearchForm,
        resumes::SearchResult,
        resumes::SearchError,
        error::ApiError,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "resumes", description = "Resume upload and search")
    )
)]
pub struct ApiDoc;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server);
    let body_limit = state.config.server.max_body_size;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/upload_resume/", post(resumes::upload_resume))
        .route("/search/", post(resumes::search_resumes))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Build the CORS layer from server settings
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if !server.cors_enabled {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
