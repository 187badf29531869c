//! Decision record validation
//!
//! The final gate of the reasoning pipeline: whatever object the extractor
//! or repair tiers produced is checked against the required schema, and an
//! invalid object is replaced wholesale by the canonical fallback record.
//! The `summary` field is always derived here; a model-supplied summary is
//! never trusted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Decision used by the canonical fallback record
pub const FALLBACK_DECISION: &str = "needs more info";

const FALLBACK_JUSTIFICATION: &str =
    "The model response could not be validated against the decision schema; \
     no decision was made.";

/// The structured output of the reasoning pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionRecord {
    /// approved | denied | pending_info | excluded (or the fallback value)
    pub decision: String,
    pub amount: f64,
    pub justification: String,
    pub clauses_used: Vec<String>,
    /// Always derived from decision/justification, never model-supplied
    pub summary: String,
    /// Confidence in [0.0, 1.0]
    pub confidence: f64,
}

impl DecisionRecord {
    /// The canonical record substituted when validation fails
    pub fn fallback() -> Self {
        Self {
            decision: FALLBACK_DECISION.to_string(),
            amount: 0.0,
            justification: FALLBACK_JUSTIFICATION.to_string(),
            clauses_used: Vec::new(),
            summary: FALLBACK_DECISION.to_string(),
            confidence: 0.0,
        }
    }
}

/// Diagnostic object returned when extraction and both repair tiers fail.
/// Shaped deliberately unlike [`DecisionRecord`]: callers distinguish the
/// two by the presence of the `error` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineFailure {
    pub error: String,
    pub raw_response: String,
    pub exception: String,
}

/// Either a validated decision or the diagnostic failure object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LlmResponse {
    Failure(PipelineFailure),
    Decision(DecisionRecord),
}

impl LlmResponse {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// Model-supplied fields; `summary` is absent on purpose since it is derived
#[derive(Deserialize)]
struct CandidateRecord {
    decision: String,
    amount: f64,
    justification: String,
    clauses_used: Vec<String>,
    confidence: f64,
}

/// Validate a candidate object into a decision record
///
/// A missing or wrong-typed field discards the candidate in favor of the
/// fallback record. Validity aside, `summary` is derived from the candidate
/// and overwrites anything the model put there.
pub fn validate_decision(candidate: &Value) -> DecisionRecord {
    match serde_json::from_value::<CandidateRecord>(candidate.clone()) {
        Ok(fields) => {
            let summary = derive_summary(candidate)
                .unwrap_or_else(|| format!("Decision: {}", fields.decision));
            DecisionRecord {
                decision: fields.decision,
                amount: fields.amount,
                justification: fields.justification,
                clauses_used: fields.clauses_used,
                summary,
                confidence: fields.confidence.clamp(0.0, 1.0),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "decision object failed schema validation, substituting fallback record");
            DecisionRecord::fallback()
        }
    }
}

/// Summary precedence: decision, then justification, then
/// justification.explanation, then `Decision: <decision>`
fn derive_summary(candidate: &Value) -> Option<String> {
    if let Some(decision) = candidate.get("decision").and_then(Value::as_str) {
        return Some(decision.to_string());
    }
    match candidate.get("justification") {
        Some(Value::String(s)) => return Some(s.clone()),
        Some(Value::Object(map)) => {
            if let Some(explanation) = map.get("explanation").and_then(Value::as_str) {
                return Some(explanation.to_string());
            }
        }
        _ => {}
    }
    candidate
        .get("decision")
        .map(|d| format!("Decision: {}", d))
}
