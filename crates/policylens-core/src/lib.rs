//! PolicyLens Core Library
//!
//! Retrieval-augmented claim decisioning over insurance policy documents.
//!
//! # Features
//! - pdf/docx/eml/txt ingestion with word-window chunking
//! - SQLite clause store with cosine-similarity retrieval
//! - Multi-provider LLM fallback with sentinel failure strings
//! - JSON extraction cascade (serde_json, json5, simd-json) with two-tier
//!   model-assisted repair
//! - Schema validation with a canonical fallback decision record

pub mod config;
pub mod error;
pub mod index;
pub mod llm;
pub mod pipeline;
pub mod store;

pub use config::{Config, EmbeddingConfig, ProviderConfig, ProviderKind, RoutingConfig};
pub use error::{Error, PolicyLensError, Result};
pub use index::{chunk_by_words, detect_file_type, DocumentChunk, DocumentParser, FileType};
pub use llm::{
    extract_json_object, normalize_response, run_reasoning, structure_query, validate_decision,
    ChatMessage, ClaimAttributes, DecisionRecord, Embedder, ExtractFailure, HttpEmbedder,
    LlmResponse, ModelClient, ModelRouter, OllamaClient, OpenAiClient, PipelineFailure,
    ProviderAttempt, ProviderChain, RawModelOutput, RepairEscalator, RepairFailure,
    StructuredQuery, Task,
};
pub use pipeline::{IngestReceipt, PolicyEngine, QueryResponse};
pub use store::{ChunkMetadata, ClauseStore, RetrievedClause};

/// Default data directory name
pub const DATA_DIR_NAME: &str = "policylens";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "policylens";
