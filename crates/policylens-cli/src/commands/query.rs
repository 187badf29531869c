//! Query command

use crate::app::{OutputFormat, QueryArgs};
use anyhow::Result;
use policylens_core::{LlmResponse, PolicyEngine, StructuredQuery};

pub async fn run(args: QueryArgs, engine: &PolicyEngine, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");
    let response = engine.answer(&query).await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    match &response.structured_query {
        StructuredQuery::Attributes(attrs) => {
            println!("Structured query: {}", serde_json::to_string(attrs)?);
        }
        StructuredQuery::Unparsed { raw_query, .. } => {
            println!("Structured query: (unparsed) {}", raw_query);
        }
    }

    println!();
    println!("Retrieved clauses:");
    for (idx, clause) in response.retrieved_chunks.iter().enumerate() {
        println!(
            "  {}. [{} p.{}] {}",
            idx + 1,
            clause.metadata.filename,
            clause.metadata.page,
            preview(&clause.text, 100)
        );
    }

    println!();
    match &response.llm_response {
        LlmResponse::Decision(record) => {
            println!("Decision:      {}", record.decision);
            println!("Amount:        {}", record.amount);
            println!("Confidence:    {:.2}", record.confidence);
            println!("Justification: {}", record.justification);
            if !record.clauses_used.is_empty() {
                println!("Clauses used:  {}", record.clauses_used.join(", "));
            }
            println!("Summary:       {}", record.summary);
        }
        LlmResponse::Failure(failure) => {
            println!("Error: {}", failure.error);
            println!("Details: {}", failure.exception);
        }
    }
    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
