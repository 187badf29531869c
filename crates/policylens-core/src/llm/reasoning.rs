//! Claim reasoning pipeline
//!
//! Drives one query through the reliability pipeline: provider chain →
//! normalization → extraction → repair escalation → validation. Every path
//! terminates; there is no retry loop back to the providers.

use crate::llm::decision::{validate_decision, LlmResponse, PipelineFailure};
use crate::llm::extract::extract_json_object;
use crate::llm::normalize::normalize_response;
use crate::llm::router::{ModelRouter, Task};
use crate::store::RetrievedClause;
use serde::{Deserialize, Serialize};

/// Claim attributes extracted from a free-text query, value-or-null
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClaimAttributes {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub procedure: Option<String>,
    pub location: Option<String>,
    pub policy_duration_months: Option<u32>,
    pub policy_name: Option<String>,
    pub policy_id: Option<String>,
}

/// Structured form of an incoming query. When the parsing model's reply is
/// not valid JSON, the raw query and the reply are carried instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StructuredQuery {
    Unparsed { raw_query: String, llm_parse: String },
    Attributes(ClaimAttributes),
}

/// Structure a free-text claim query via the parsing chain
///
/// The parsing reply gets a strict parse only; a reply that is not a clean
/// JSON object (including the chain's sentinel string) falls back to the
/// unparsed carrier rather than failing the query.
pub async fn structure_query(router: &ModelRouter, query: &str) -> StructuredQuery {
    let prompt = build_parsing_prompt(query);
    let reply = router.chain(Task::Parsing).complete(&prompt).await;

    match serde_json::from_str::<ClaimAttributes>(reply.text.trim()) {
        Ok(attributes) => StructuredQuery::Attributes(attributes),
        Err(e) => {
            tracing::debug!(error = %e, "query parsing reply was not valid JSON, keeping raw query");
            StructuredQuery::Unparsed {
                raw_query: query.to_string(),
                llm_parse: reply.text,
            }
        }
    }
}

/// Run the reasoning pipeline over a structured query and retrieved clauses
pub async fn run_reasoning(
    router: &ModelRouter,
    structured_query: &StructuredQuery,
    clauses: &[RetrievedClause],
) -> LlmResponse {
    let prompt = build_reasoning_prompt(structured_query, clauses);
    let raw = router.chain(Task::Reasoning).complete(&prompt).await;

    if raw.is_sentinel() {
        tracing::warn!("reasoning chain exhausted, parsing sentinel text");
    }

    let normalized = normalize_response(&raw.text);
    let extract_failure = match extract_json_object(&normalized) {
        Ok(candidate) => {
            return LlmResponse::Decision(validate_decision(&candidate));
        }
        Err(e) => e,
    };

    tracing::info!("extraction failed, escalating to model repair");
    match router.repair_escalator().repair(&raw.text).await {
        Ok(candidate) => LlmResponse::Decision(validate_decision(&candidate)),
        Err(repair_failure) => LlmResponse::Failure(PipelineFailure {
            error: "Failed to parse and repair LLM response".to_string(),
            raw_response: raw.text,
            exception: format!(
                "{}; {}",
                extract_failure.cause_chain(),
                repair_failure.cause_chain()
            ),
        }),
    }
}

fn build_parsing_prompt(query: &str) -> String {
    format!(
        "Extract the following fields from the query and return as JSON: \
         age, gender, procedure, location, policy_duration_months, policy_name, policy_id. \
         If a field is missing, use null. Query: {}\nRespond in JSON only.",
        query
    )
}

pub(crate) fn build_reasoning_prompt(
    structured_query: &StructuredQuery,
    clauses: &[RetrievedClause],
) -> String {
    let query_json =
        serde_json::to_string(structured_query).unwrap_or_else(|_| "{}".to_string());

    let mut prompt = format!(
        "You are an expert insurance policy assistant.\n\
         Given the following structured query and relevant policy document clauses, \
         reason step by step and output a JSON object with fields: decision, amount, \
         justification, clauses_used, confidence.\n\
         Structured Query: {}\n\
         Relevant Clauses:\n",
        query_json
    );
    for (idx, clause) in clauses.iter().enumerate() {
        prompt.push_str(&format!("Clause {}: {}\n", idx + 1, clause.text));
    }
    prompt.push_str(
        "\nRespond with a valid JSON object only, using double quotes for all keys and \
         string values, double quotes around all array elements, no trailing commas, \
         and do not include any explanation, comments, or text before or after the JSON. \
         Ensure all braces are closed.",
    );
    prompt
}
