//! Ingest command

use crate::app::IngestArgs;
use anyhow::{Context, Result};
use policylens_core::PolicyEngine;

pub async fn run(args: IngestArgs, engine: &PolicyEngine) -> Result<()> {
    let mut total_chunks = 0usize;

    for path in &args.files {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("invalid file name: {}", path.display()))?;

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let receipt = engine.ingest(&bytes, filename).await?;
        println!("{}: {} chunks stored", filename, receipt.num_chunks);
        total_chunks += receipt.num_chunks;
    }

    if args.files.len() > 1 {
        println!();
        println!(
            "Ingested {} files, {} chunks total",
            args.files.len(),
            total_chunks
        );
    }
    Ok(())
}
