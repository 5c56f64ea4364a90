//! REST API handlers for trainboard-server.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{error, info};

use trainboard_core::models::leaderboard;
use trainboard_core::store::{validate_document_id, COLLECTION};
use trainboard_core::{Document, DocumentId, DocumentStore, InputRecord, TrainboardError};

use crate::state::AppState;

// ─── Router ──────────────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/config", get(get_config))
        .route("/model_db", get(list_documents))
        .route("/model_db/{id}", get(get_document).put(put_document))
        .route("/leaderboard", get(get_leaderboard))
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn error_response(e: TrainboardError) -> Response {
    let status = match e {
        TrainboardError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
        TrainboardError::Other(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("{}", e);
    }
    (status, e.to_string()).into_response()
}

fn with_store<T>(
    state: &AppState,
    f: impl FnOnce(&mut trainboard_core::FileDocumentStore) -> trainboard_core::Result<T>,
) -> trainboard_core::Result<T> {
    let mut store = state
        .documents
        .lock()
        .map_err(|_| TrainboardError::Storage("document store lock poisoned".into()))?;
    f(&mut *store)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "collection": COLLECTION,
        "training_endpoint": state.config.training_endpoint,
    }))
}

async fn list_documents(State(state): State<AppState>) -> Response {
    match with_store(&state, |store| store.all_docs()) {
        Ok(docs) => Json(docs).into_response(),
        Err(e) => error_response(e),
    }
}

async fn get_leaderboard(State(state): State<AppState>) -> Response {
    match with_store(&state, |store| store.all_docs()) {
        Ok(docs) => Json(leaderboard(&docs)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn get_document(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = DocumentId::from(id);
    let result = with_store(&state, |store| {
        store
            .get(&id)?
            .ok_or_else(|| TrainboardError::DocumentNotFound(id.to_string()))
    });
    match result {
        Ok(doc) => Json(doc).into_response(),
        Err(e) => error_response(e),
    }
}

/// Write a submission under `id`, replacing any document already there.
async fn put_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(record): Json<InputRecord>,
) -> Response {
    let id = DocumentId::from(id);
    if let Err(e) = validate_document_id(&id) {
        return error_response(e);
    }
    let doc = Document::new(id.clone(), record);
    match with_store(&state, |store| store.put(doc)) {
        Ok(()) => {
            info!(id = %id, "Stored submission");
            (
                StatusCode::CREATED,
                Json(serde_json::json!({"ok": true, "id": id})),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

// ─── Frontend (embedded) ─────────────────────────────────────────────────────

/// Serve the embedded frontend HTML/JS/CSS.
pub async fn serve_frontend(uri: axum::http::Uri) -> impl IntoResponse {
    let path = uri.path().trim_start_matches('/');

    let (actual_path, content) = match Assets::get(path) {
        Some(content) => (path, content),
        None => match Assets::get("index.html") {
            Some(content) => ("index.html", content),
            None => return StatusCode::NOT_FOUND.into_response(),
        },
    };

    let mime = mime_guess::from_path(actual_path).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from(content.data.into_owned()))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[derive(rust_embed::Embed)]
#[folder = "../../frontend/dist"]
#[include = "*.html"]
#[include = "*.js"]
#[include = "*.css"]
#[include = "*.wasm"]
struct Assets;
