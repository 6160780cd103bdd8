use axum::{
    body::Body,
    http::{Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::Span;

pub async fn enrich_current_span_middleware(req: Request<Body>, next: Next) -> Response {
    let uri: &Uri = req.uri();

    let host = req
        .headers()
        .get("host")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("UNKNOWN");

    let current_span = Span::current();

    current_span.record("http.uri", uri.path());
    current_span.record("http.host", host);
    if let Some(query) = uri.query() {
        current_span.record("http.query", query);
    }

    next.run(req).await
}

/// Redirect `/path/` to `/path`, keeping the query string.
pub async fn strip_trailing_slash(req: Request<Body>, next: Next) -> Response {
    let uri = req.uri();

    let Some(path) = uri.path().strip_suffix('/').filter(|p| !p.is_empty()) else {
        return next.run(req).await;
    };

    let target = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    match target.parse::<Uri>() {
        Ok(new_uri) => Redirect::permanent(&new_uri.to_string()).into_response(),
        Err(e) => {
            tracing::warn!(uri = %uri, error = %e, "could not rewrite trailing slash");
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

