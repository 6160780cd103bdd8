use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::actions::{CodeExtension, ShareData, component_filename, format_share_text, mime_type};
use crate::api::AppState;
use crate::library::{LibraryQuery, SavedComponent, categories};

#[derive(Deserialize)]
pub struct ComponentBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub code: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub styling: Option<String>,
}

impl ComponentBody {
    fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.code.trim().is_empty() {
            return Err("code is required");
        }
        Ok(())
    }

    /// Apply onto `component`, leaving id and creation time alone.
    fn apply(self, component: &mut SavedComponent) {
        component.name = self.name.trim().to_string();
        component.description = self.description;
        component.code = self.code;
        if let Some(category) = self.category.filter(|c| !c.trim().is_empty()) {
            component.category = category;
        }
        component.tags = self
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if let Some(framework) = self.framework.filter(|f| !f.is_empty()) {
            component.framework = framework;
        }
        if let Some(styling) = self.styling.filter(|s| !s.is_empty()) {
            component.styling = styling;
        }
    }
}

#[derive(Deserialize, Default)]
pub struct DownloadQuery {
    #[serde(default)]
    pub ext: CodeExtension,
}

#[derive(Deserialize, Default)]
pub struct ShareQuery {
    #[serde(default)]
    pub url: Option<String>,
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("component not found: {id}") })),
    )
        .into_response()
}

fn internal_error(e: anyhow::Error) -> Response {
    tracing::error!(error = %e, "library operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
        .into_response()
}

pub(crate) async fn list_components(
    State(state): State<AppState>,
    Query(query): Query<LibraryQuery>,
) -> impl IntoResponse {
    let components: Vec<SavedComponent> = state
        .library
        .list()
        .await
        .into_iter()
        .filter(|c| query.matches(c))
        .collect();
    Json(json!({ "components": components }))
}

pub(crate) async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    let components = state.library.list().await;
    Json(json!({ "categories": categories(&components) }))
}

pub(crate) async fn get_component(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.library.get(&id).await {
        Some(component) => Json(component).into_response(),
        None => not_found(&id),
    }
}

pub(crate) async fn create_component(
    State(state): State<AppState>,
    Json(body): Json<ComponentBody>,
) -> impl IntoResponse {
    if let Err(message) = body.validate() {
        return bad_request(message);
    }

    let mut component = SavedComponent {
        id: uuid::Uuid::new_v4().to_string(),
        name: String::new(),
        description: String::new(),
        code: String::new(),
        category: "Uncategorized".to_string(),
        tags: Vec::new(),
        created_at: chrono::Utc::now(),
        framework: "react".to_string(),
        styling: "tailwind".to_string(),
    };
    body.apply(&mut component);

    match state.library.save(component.clone()).await {
        Ok(()) => {
            tracing::info!(component_id = %component.id, name = %component.name, "saved component");
            (StatusCode::CREATED, Json(component)).into_response()
        }
        Err(e) => internal_error(e),
    }
}

pub(crate) async fn update_component(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ComponentBody>,
) -> impl IntoResponse {
    if let Err(message) = body.validate() {
        return bad_request(message);
    }
    let Some(mut component) = state.library.get(&id).await else {
        return not_found(&id);
    };
    body.apply(&mut component);

    match state.library.save(component.clone()).await {
        Ok(()) => Json(component).into_response(),
        Err(e) => internal_error(e),
    }
}

pub(crate) async fn delete_component(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.library.delete(&id).await {
        Ok(true) => Json(json!({ "deleted": true })).into_response(),
        Ok(false) => not_found(&id),
        Err(e) => internal_error(e),
    }
}

/// The component source as a file attachment.
pub(crate) async fn download_component(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> impl IntoResponse {
    let Some(component) = state.library.get(&id).await else {
        return not_found(&id);
    };
    let filename = component_filename(&component.name, query.ext);
    (
        StatusCode::OK,
        [
            ("content-type", mime_type(query.ext.as_str()).to_string()),
            (
                "content-disposition",
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        component.code,
    )
        .into_response()
}

/// Plain-text share payload for clients without native sharing.
pub(crate) async fn share_component(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ShareQuery>,
) -> impl IntoResponse {
    let Some(component) = state.library.get(&id).await else {
        return not_found(&id);
    };
    let share = ShareData {
        title: component.name,
        text: component.description,
        url: query.url,
        code: Some(component.code),
    };
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        format_share_text(&share, chrono::Utc::now()),
    )
        .into_response()
}
