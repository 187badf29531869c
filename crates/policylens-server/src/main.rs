//! PolicyLens HTTP server
//!
//! Thin boundary over the core engine: document upload and claim queries.

use anyhow::Result;
use policylens_core::{Config, PolicyEngine};

mod routes;
mod server;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::load()?;
    let engine = PolicyEngine::from_config(&config)?;

    server::run(engine).await
}
