//! REST endpoints for live previews.
//!
//! POST   /api/previews               : open a preview for a snippet
//! GET    /api/previews/{id}          : current generation, export name, viewport
//! PUT    /api/previews/{id}          : replace the snippet (fresh document, new generation)
//! PUT    /api/previews/{id}/viewport : switch viewport only
//! GET    /api/previews/{id}/document : the sandbox document, served with isolation headers
//! GET    /api/previews/{id}/embed    : viewport wrapper + sandboxed iframe fragment
//! DELETE /api/previews/{id}          : tear down
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::AppState;
use crate::preview::{IsolationPolicy, PreviewError, PreviewSummary, ViewportMode};

#[derive(Deserialize)]
pub struct CreatePreviewRequest {
    pub code: String,
    #[serde(default)]
    pub viewport: ViewportMode,
}

#[derive(Deserialize)]
pub struct ReloadPreviewRequest {
    pub code: String,
}

#[derive(Deserialize)]
pub struct ViewportRequest {
    pub viewport: ViewportMode,
}

fn document_url(id: Uuid) -> String {
    format!("/api/previews/{id}/document")
}

fn summary_json(summary: &PreviewSummary) -> serde_json::Value {
    json!({
        "id": summary.id,
        "generation": summary.generation,
        "export_name": summary.export_name,
        "viewport": summary.viewport,
        "max_width": summary.viewport.constraint().max_width(),
        "document_url": document_url(summary.id),
        "embed_url": format!("/api/previews/{}/embed", summary.id),
    })
}

fn error_response(err: PreviewError) -> Response {
    let status = match err {
        PreviewError::NotFound(_) => StatusCode::NOT_FOUND,
        PreviewError::EmptySnippet => StatusCode::BAD_REQUEST,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

pub(crate) async fn create_preview(
    State(state): State<AppState>,
    Json(body): Json<CreatePreviewRequest>,
) -> impl IntoResponse {
    match state.previews.create(&body.code, body.viewport).await {
        Ok(summary) => (StatusCode::CREATED, Json(summary_json(&summary))).into_response(),
        Err(e) => error_response(e),
    }
}

pub(crate) async fn get_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.previews.summary(id).await {
        Ok(summary) => Json(summary_json(&summary)).into_response(),
        Err(e) => error_response(e),
    }
}

pub(crate) async fn reload_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReloadPreviewRequest>,
) -> impl IntoResponse {
    match state.previews.reload(id, &body.code).await {
        Ok(summary) => Json(summary_json(&summary)).into_response(),
        Err(e) => error_response(e),
    }
}

pub(crate) async fn set_viewport(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ViewportRequest>,
) -> impl IntoResponse {
    match state.previews.set_viewport(id, body.viewport).await {
        Ok(summary) => Json(summary_json(&summary)).into_response(),
        Err(e) => error_response(e),
    }
}

pub(crate) async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.previews.document(id).await {
        Ok(html) => (StatusCode::OK, IsolationPolicy::response_headers(), html).into_response(),
        Err(e) => error_response(e),
    }
}

pub(crate) async fn get_embed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.previews.embed(id, &document_url(id)).await {
        Ok(fragment) => (
            StatusCode::OK,
            [("content-type", "text/html; charset=utf-8")],
            fragment,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

pub(crate) async fn delete_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if state.previews.remove(id).await {
        Json(json!({ "deleted": true })).into_response()
    } else {
        error_response(PreviewError::NotFound(id))
    }
}
