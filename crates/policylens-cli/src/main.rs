//! PolicyLens CLI
//!
//! Ingest insurance policy documents and query claim decisions.

use anyhow::Result;
use clap::Parser;
use policylens_core::{Config, PolicyEngine};

mod app;
mod commands;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let engine = PolicyEngine::from_config(&config)?;

    match cli.command {
        Commands::Ingest(args) => commands::ingest::run(args, &engine).await,
        Commands::Query(args) => commands::query::run(args, &engine, cli.format).await,
        Commands::Status => commands::status::run(&engine, &config, cli.format).await,
    }
}
