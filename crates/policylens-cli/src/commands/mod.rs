//! CLI command handlers

pub mod ingest;
pub mod query;
pub mod status;
