//! Model-assisted JSON repair
//!
//! Last resort after the parser cascade fails: ask a fast local model to
//! rewrite the raw text as a JSON object, and if that still doesn't parse,
//! ask a high-capability remote model once. The remote reply gets strict
//! parsing only; there is no further escalation behind it.

use crate::llm::extract::extract_json_object;
use crate::llm::ModelClient;
use serde_json::Value;
use std::sync::Arc;

/// Both repair tiers exhausted
#[derive(Debug, Clone)]
pub struct RepairFailure {
    pub causes: Vec<String>,
}

impl RepairFailure {
    pub fn cause_chain(&self) -> String {
        self.causes.join("; ")
    }
}

/// Two-tier repair: local rewrite, then remote rewrite
pub struct RepairEscalator {
    local: Arc<dyn ModelClient>,
    remote: Arc<dyn ModelClient>,
}

impl RepairEscalator {
    pub fn new(local: Arc<dyn ModelClient>, remote: Arc<dyn ModelClient>) -> Self {
        Self { local, remote }
    }

    /// Attempt to repair raw (pre-normalization) model text into an object
    pub async fn repair(&self, raw: &str) -> std::result::Result<Value, RepairFailure> {
        let prompt = build_repair_prompt(raw);
        let mut causes = Vec::new();

        // Tier 1: local rewrite, parsed with the full extraction cascade
        match self.local.complete(&prompt).await {
            Ok(reply) => match extract_json_object(&reply) {
                Ok(value) => {
                    tracing::debug!(provider = self.local.provider_id(), "local repair succeeded");
                    return Ok(value);
                }
                Err(e) => causes.push(format!("Local repair failed: {}", e.cause_chain())),
            },
            Err(e) => causes.push(format!("Local repair failed: {}", e)),
        }

        // Tier 2: remote rewrite, strict parse only
        match self.remote.complete(&prompt).await {
            Ok(reply) => match serde_json::from_str::<Value>(reply.trim()) {
                Ok(Value::Object(map)) => {
                    tracing::debug!(provider = self.remote.provider_id(), "remote repair succeeded");
                    return Ok(Value::Object(map));
                }
                Ok(other) => {
                    causes.push(format!("Remote repair failed: produced non-object {}", other))
                }
                Err(e) => causes.push(format!("Remote repair failed: {}", e)),
            },
            Err(e) => causes.push(format!("Remote repair failed: {}", e)),
        }

        Err(RepairFailure { causes })
    }
}

fn build_repair_prompt(raw: &str) -> String {
    format!(
        "Convert the following text into valid JSON. Only return the JSON object.\nText: {}",
        raw
    )
}
