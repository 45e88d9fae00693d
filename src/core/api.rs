//! HTTP share server
//!
//! Endpoints:
//! - POST /scores - Validate and store a recording, returns its share hash
//! - GET /scores/:hash - Fetch a stored recording
//! - GET /health - Health check

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::codec;
use crate::core::store::{DirectoryStore, RemoteStore, ShareResponse};

/// App state
pub struct AppState {
    pub store: DirectoryStore,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: message.into() })).into_response()
}

/// Create the API router
pub fn create_router(store: DirectoryStore) -> Router {
    let state = Arc::new(AppState { store });

    Router::new()
        .route("/health", get(health))
        .route("/scores", post(create_score))
        .route("/scores/:hash", get(get_score))
        .with_state(state)
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Store a recording. The body goes through the same validation as any import.
async fn create_score(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> Response {
    let imported = match codec::decode_value(&body) {
        Ok(imported) => imported,
        Err(e) => {
            warn!(error = %e, "rejected shared recording");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    match state.store.write(&imported.to_document()).await {
        Ok(hash) => {
            info!(%hash, entries = imported.timeline.len(), "recording stored");
            let url = format!("/scores/{}", hash);
            (StatusCode::CREATED, Json(ShareResponse { hash, url })).into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to store recording");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to store recording")
        }
    }
}

/// Fetch a stored recording
async fn get_score(State(state): State<Arc<AppState>>, Path(hash): Path<String>) -> Response {
    match state.store.lookup(&hash).await {
        Ok(Some(document)) => Json(document).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("Unable to find score (ID: {})", hash),
        ),
        Err(e) => {
            error!(error = %e, %hash, "failed to read recording");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to read recording")
        }
    }
}

/// Run the API server
pub async fn run_server(addr: &str, store_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(DirectoryStore::new(&store_dir));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, store = %store_dir.display(), "share server listening");
    println!("ClickJudge share server running on {}", addr);
    println!("  POST /scores        - Share a recording");
    println!("  GET  /scores/:hash  - Fetch a recording");
    println!("  GET  /health        - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
