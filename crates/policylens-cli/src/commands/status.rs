//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use policylens_core::{Config, PolicyEngine};
use serde_json::json;

pub async fn run(engine: &PolicyEngine, config: &Config, format: OutputFormat) -> Result<()> {
    let stored = engine.stored_chunks().await?;

    match format {
        OutputFormat::Json => {
            let providers: Vec<_> = config
                .providers
                .iter()
                .map(|p| json!({"id": p.id, "model": p.model, "url": p.url}))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "stored_chunks": stored,
                    "store_path": config.store_path,
                    "top_k": config.top_k,
                    "providers": providers,
                    "routing": config.routing,
                }))?
            );
        }
        _ => {
            println!("Stored clauses:  {}", stored);
            println!("Store path:      {}", config.store_path.display());
            println!("Top-k retrieval: {}", config.top_k);
            println!();
            println!("Providers:");
            for provider in &config.providers {
                println!("  {:<16} {} ({})", provider.id, provider.model, provider.url);
            }
            println!();
            println!("Routing:");
            println!("  Reasoning:     {}", config.routing.reasoning.join(" -> "));
            println!("  Parsing:       {}", config.routing.parsing.join(" -> "));
            println!("  Repair:        {} then {}", config.routing.repair_local, config.routing.repair_remote);
        }
    }
    Ok(())
}
