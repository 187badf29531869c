//! API routes
//!
//! Transport contract: query answers are always 200, even when the
//! reasoning pipeline failed internally — callers branch on the `error`
//! key inside `llm_response`. Caller faults (unsupported file types,
//! unreadable documents) are 400; infrastructure faults are 500.

use crate::server::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use policylens_core::PolicyLensError;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

type AppStateArc = Arc<AppState>;

pub fn api_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/upload", post(upload_document))
        .route("/query", post(process_query))
        .route("/health", get(health))
}

async fn upload_document(
    State(state): State<AppStateArc>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .ok_or_else(|| bad_request("file field has no filename".to_string()))?
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(e.to_string()))?;
            file = Some((filename, bytes.to_vec()));
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| bad_request("missing 'file' field in upload".to_string()))?;

    info!(file = %filename, "upload received");

    let receipt = state
        .engine
        .ingest(&bytes, &filename)
        .await
        .map_err(|e| {
            error!(file = %filename, error = %e, "ingestion failed");
            engine_error(e)
        })?;

    Ok(Json(json!({
        "message": "File processed, embedded, and stored.",
        "num_chunks": receipt.num_chunks,
    })))
}

#[derive(Deserialize)]
struct QueryRequest {
    query: String,
}

async fn process_query(
    State(state): State<AppStateArc>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let response = state.engine.answer(&req.query).await.map_err(|e| {
        error!(error = %e, "query failed before reasoning");
        engine_error(e)
    })?;

    let body = serde_json::to_value(&response).map_err(|e| {
        error!(error = %e, "response serialization failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        )
    })?;

    Ok(Json(body))
}

async fn health(State(state): State<AppStateArc>) -> Json<Value> {
    let stored = state.engine.stored_chunks().await.unwrap_or(0);
    Json(json!({"status": "ok", "stored_chunks": stored}))
}

fn bad_request(message: String) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message})))
}

fn engine_error(e: PolicyLensError) -> (StatusCode, Json<Value>) {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(json!({"error": e.to_string()})))
}
