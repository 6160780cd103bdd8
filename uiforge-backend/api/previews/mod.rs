pub mod handlers;

use axum::routing::{get, post, put};
use axum::Router;

use crate::api::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/previews", post(handlers::create_preview))
        .route(
            "/previews/{id}",
            get(handlers::get_preview)
                .put(handlers::reload_preview)
                .delete(handlers::delete_preview),
        )
        .route("/previews/{id}/viewport", put(handlers::set_viewport))
        .route("/previews/{id}/document", get(handlers::get_document))
        .route("/previews/{id}/embed", get(handlers::get_embed))
}
