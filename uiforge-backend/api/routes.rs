use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use hyper::StatusCode;
use hyper::header;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use super::middleware;
use super::AppState;

pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route(
        "/",
        get(|| async {
            Json(json!({
                "status": "ok",
            }))
        }),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(vec![header::CONTENT_TYPE]);

    Router::new()
        .nest("/health", health_routes)
        .nest("/api", api_router())
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(axum::middleware::from_fn(middleware::strip_trailing_slash))
        .layer(axum::middleware::from_fn(
            middleware::enrich_current_span_middleware,
        ))
}

fn api_router() -> Router<AppState> {
    Router::new()
        .merge(super::generate::router())
        .merge(super::previews::router())
        .merge(super::library::router())
}

async fn not_found(req: axum::extract::Request) -> impl IntoResponse {
    tracing::warn!("unhandled path: {}", req.uri());
    (StatusCode::NOT_FOUND, "Not Found")
}
