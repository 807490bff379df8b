//! HTTP boundary for the gallery: routes requests onto the registry
//! mutators and the notes store, and translates core failures into
//! status codes with generic messages.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use mockdeck_core::config::Settings;
use mockdeck_core::model::{NoteEntry, VariantType, VersionRecord};
use mockdeck_core::notes::NotesStore;
use mockdeck_core::registry::Registry;
use mockdeck_core::CoreError;

#[derive(Clone)]
pub struct AppState {
    registry: Arc<Registry>,
    notes: Arc<NotesStore>,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            registry: Arc::new(Registry::from_settings(settings)),
            notes: Arc::new(NotesStore::new(settings.notes_path())),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/versions", get(list_versions))
        .route("/versions/{id}/type", post(update_type))
        .route("/versions/{id}/title", post(update_title))
        .route("/versions/{id}", delete(delete_version))
        .route("/notes", get(get_notes).post(put_notes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(settings: Settings) -> std::io::Result<()> {
    let state = AppState::new(&settings);
    let addr = SocketAddr::new(settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "mockdeck API listening");
    axum::serve(listener, router(state)).await
}

/// A core failure mapped onto a status code and a message that leaks no
/// internal paths.
struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn from_core(err: CoreError, message: &'static str) -> Self {
        let status = match &err {
            CoreError::InvalidType(_) | CoreError::EmptyTitle | CoreError::UnsafeId(_) => {
                StatusCode::BAD_REQUEST
            }
            CoreError::NotFound { .. } | CoreError::ImportNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(%err, "request failed");
        } else {
            debug!(%err, "request rejected");
        }
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Core calls do blocking file I/O, so they run off the async workers.
async fn run_blocking<T, F>(task: F, message: &'static str) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, CoreError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(ApiError::from_core(err, message)),
        Err(err) => {
            error!(%err, "blocking task failed");
            Err(ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message,
            })
        }
    }
}

async fn list_versions(
    State(state): State<AppState>,
) -> Result<Json<Vec<VersionRecord>>, ApiError> {
    let registry = state.registry.clone();
    let records = run_blocking(move || registry.list(), "Failed to read versions").await?;
    Ok(Json(records))
}

// Bodies use lenient defaults so a missing field surfaces as the same
// 400 as an invalid one, instead of an extractor rejection.

#[derive(Deserialize)]
struct TypeBody {
    #[serde(rename = "type", default)]
    variant: String,
}

async fn update_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TypeBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    const MESSAGE: &str = "Failed to update version type";
    let variant = body
        .variant
        .parse::<VariantType>()
        .map_err(|err| ApiError::from_core(err, MESSAGE))?;
    let registry = state.registry.clone();
    let target = id.clone();
    run_blocking(move || registry.reclassify(&target, variant), MESSAGE).await?;
    Ok(Json(json!({ "success": true, "id": id, "type": variant.as_str() })))
}

#[derive(Deserialize)]
struct TitleBody {
    #[serde(default)]
    title: String,
}

async fn update_title(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TitleBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    const MESSAGE: &str = "Failed to update version title";
    let registry = state.registry.clone();
    let target = id.clone();
    let title = body.title.clone();
    run_blocking(move || registry.rename(&target, &title), MESSAGE).await?;
    Ok(Json(json!({
        "success": true,
        "id": id,
        "title": body.title.trim(),
    })))
}

async fn delete_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    const MESSAGE: &str = "Failed to delete version";
    let registry = state.registry.clone();
    let target = id.clone();
    let outcome = run_blocking(move || registry.delete(&target), MESSAGE).await?;
    // partial success (registry edited, file left behind) is still a 200;
    // the core layer already logged the file phase
    debug!(id = %id, file_removed = ?outcome.file_removed, "version deleted");
    Ok(Json(json!({ "success": true, "id": id })))
}

async fn get_notes(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, NoteEntry>>, ApiError> {
    let store = state.notes.clone();
    let notes = run_blocking(move || store.load(), "Failed to read notes").await?;
    Ok(Json(notes))
}

async fn put_notes(
    State(state): State<AppState>,
    Json(notes): Json<BTreeMap<String, NoteEntry>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = state.notes.clone();
    run_blocking(move || store.replace(&notes), "Failed to write notes").await?;
    Ok(Json(json!({ "success": true })))
}
