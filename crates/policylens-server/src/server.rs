//! HTTP server setup

use crate::routes;
use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::Router;
use policylens_core::PolicyEngine;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub engine: PolicyEngine,
}

/// Run the HTTP server
pub async fn run(engine: PolicyEngine) -> Result<()> {
    let state = Arc::new(AppState { engine });

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::api_routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr =
        std::env::var("POLICYLENS_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Browser frontend origins; extendable via env for deployed frontends
fn allowed_origins() -> Vec<HeaderValue> {
    let mut origins = vec![HeaderValue::from_static("http://localhost:3000")];
    if let Ok(extra) = std::env::var("POLICYLENS_CORS_ORIGIN") {
        if let Ok(value) = extra.parse() {
            origins.push(value);
        }
    }
    origins
}
