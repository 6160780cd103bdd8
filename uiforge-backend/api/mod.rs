pub mod generate;
pub mod library;
pub mod middleware;
pub mod previews;
mod routes;

use axum::Router;
use std::sync::Arc;

use crate::generation::ComponentGenerator;
use crate::library::repository::ComponentRepository;
use crate::preview::PreviewRegistry;

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn ComponentGenerator>,
    pub library: Arc<dyn ComponentRepository>,
    pub previews: Arc<PreviewRegistry>,
}

pub fn create_app(state: AppState) -> Router {
    routes::build_router(state)
}
