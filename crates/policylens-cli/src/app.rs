//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "policylens")]
#[command(
    author,
    version,
    about = "Retrieval-augmented claim decisions over insurance policy documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest policy documents (pdf, docx, eml, txt)
    Ingest(IngestArgs),

    /// Answer a claim query against the ingested policies
    Query(QueryArgs),

    /// Show store status
    Status,
}

#[derive(Args)]
pub struct IngestArgs {
    /// Files to ingest
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Claim query text
    #[arg(required = true)]
    pub query: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Cli,
    /// Raw JSON
    Json,
}
