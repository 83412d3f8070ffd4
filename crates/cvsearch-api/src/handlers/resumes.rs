//! Resume upload and search handlers
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use cvsearch_core::SearchHit;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Multipart field carrying the resume document
const FILE_FIELD: &str = "file";

/// Multipart upload body (documentation only)
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// Resume document (.pdf or .docx)
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Upload response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "Resume stored successfully")]
    pub message: String,

    /// Identifier of the stored point
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub resume_id: Uuid,
}

/// Upload a resume: extract, structure, embed and store it
#[utoipa::path(
    post,
    path = "/upload_resume/",
    tag = "resumes",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Resume stored", body = UploadResponse),
        (status = 400, description = "Missing file, unsupported format or unreadable document", body = crate::error::ApiError),
        (status = 500, description = "Model, embedding or vector store failure", body = crate::error::ApiError)
    )
)]
pub async fn upload_resume(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    state.increment_requests();

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) && field.file_name().is_none() {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("Missing form field: file".to_string()))?;

    tracing::info!(filename = %filename, size = bytes.len(), "Resume upload received");

    let record = state.upload.run(&filename, bytes).await.map_err(|e| {
        tracing::error!(filename = %filename, error = %e, "Resume upload failed");
        AppError::from(e)
    })?;

    tracing::info!(resume_id = %record.id, "Resume stored");

    Ok(Json(UploadResponse {
        message: "Resume stored successfully".to_string(),
        resume_id: record.id,
    }))
}

/// Search form body
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchForm {
    /// Free-text description of the candidate
    #[schema(example = "software engineer with Go experience")]
    pub query: String,
}

/// Accepts the `query` field as either urlencoded or multipart form data
#[axum::async_trait]
impl<S> FromRequest<S> for SearchForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<SearchForm>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(form);
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        while let Some(field) = multipart.next_field().await? {
            if field.name() == Some("query") {
                let query = field.text().await?;
                return Ok(Self { query });
            }
        }

        Err(AppError::BadRequest("Missing form field: query".to_string()))
    }
}

/// One ranked search result
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchResult {
    /// Cosine similarity
    #[schema(example = 0.82)]
    pub score: f32,

    /// Stored structured text, or null when the point has none
    pub response: Option<String>,

    /// Identifier of the matched resume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<String>,
}

impl From<SearchHit> for SearchResult {
    fn from(hit: SearchHit) -> Self {
        Self {
            score: hit.score,
            response: hit.response,
            resume_id: hit.resume_id,
        }
    }
}

/// Error object returned in place of results
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchError {
    pub error: String,
}

/// Search responds 200 either way; failures are reported in-band
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Hits(Vec<SearchResult>),
    Error(SearchError),
}

/// Rank stored resumes against a free-text query
#[utoipa::path(
    post,
    path = "/search/",
    tag = "resumes",
    request_body(content = SearchForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Ranked results, best first, or an error object", body = [SearchResult]),
        (status = 400, description = "Missing query field", body = crate::error::ApiError)
    )
)]
pub async fn search_resumes(
    State(state): State<Arc<AppState>>,
    form: SearchForm,
) -> Json<SearchResponse> {
    state.increment_requests();

    match state.search.run(&form.query).await {
        Ok(hits) => {
            tracing::info!(hits = hits.len(), "Search served");
            Json(SearchResponse::Hits(
                hits.into_iter().map(SearchResult::from).collect(),
            ))
        }
        Err(e) => {
            tracing::error!(error = %e, "Search failed");
            Json(SearchResponse::Error(SearchError {
                error: e.to_string(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_error_shape() {
        let json = serde_json::to_value(SearchResponse::Error(SearchError {
            error: "embedding failed".into(),
        }))
        .unwrap();
        assert_eq!(json, serde_json::json!({ "error": "embedding failed" }));
    }

    #[test]
    fn test_search_hits_shape() {
        let json = serde_json::to_value(SearchResponse::Hits(vec![SearchResult {
            score: 0.5,
            response: None,
            resume_id: None,
        }]))
        .unwrap();
        assert_eq!(json, serde_json::json!([{ "score": 0.5, "response": null }]));
    }
}
