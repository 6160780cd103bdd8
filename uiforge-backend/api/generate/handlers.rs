use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::api::AppState;
use crate::generation::{GenerationRequest, generate_or_fallback};

/// POST /api/generate: prompt in, normalized component source out.
///
/// Provider failures never surface as errors; the response carries the
/// placeholder component with `fallback: true` instead.
#[tracing::instrument(skip_all)]
pub(crate) async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> impl IntoResponse {
    if request.prompt.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "prompt is required" })),
        )
            .into_response();
    }

    let generated = generate_or_fallback(state.generator.as_ref(), &request).await;
    (StatusCode::OK, Json(generated)).into_response()
}
