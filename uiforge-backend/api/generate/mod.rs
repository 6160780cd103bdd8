pub mod handlers;

use axum::routing::post;
use axum::Router;

use crate::api::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(handlers::generate))
}
