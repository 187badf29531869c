//! LLM integration
//!
//! The response reliability pipeline and its collaborators:
//! - provider clients (OpenAI-compatible services, Ollama)
//! - priority-ordered fallback orchestration with sentinel failures
//! - normalization, JSON extraction, and model-assisted repair
//! - decision validation with a canonical fallback record
//! - embedding generation via external services

mod client;
mod decision;
mod embedding;
mod extract;
mod fallback;
mod normalize;
mod reasoning;
mod repair;
mod router;

pub use client::{client_for, ChatMessage, ModelClient, OllamaClient, OpenAiClient};
pub use decision::{
    validate_decision, DecisionRecord, LlmResponse, PipelineFailure, FALLBACK_DECISION,
};
pub use embedding::{Embedder, HttpEmbedder};
pub use extract::{extract_json_object, ExtractFailure};
pub use fallback::{ProviderAttempt, ProviderChain, RawModelOutput};
pub use normalize::normalize_response;
pub use reasoning::{run_reasoning, structure_query, ClaimAttributes, StructuredQuery};
pub use repair::{RepairEscalator, RepairFailure};
pub use router::{ModelRouter, Task};
