pub mod handlers;

use axum::routing::get;
use axum::Router;

use crate::api::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/library",
            get(handlers::list_components).post(handlers::create_component),
        )
        .route("/library/categories", get(handlers::list_categories))
        .route(
            "/library/{id}",
            get(handlers::get_component)
                .put(handlers::update_component)
                .delete(handlers::delete_component),
        )
        .route("/library/{id}/download", get(handlers::download_component))
        .route("/library/{id}/share", get(handlers::share_component))
}
