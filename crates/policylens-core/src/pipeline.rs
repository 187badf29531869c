//! Policy engine
//!
//! Ties ingestion and question answering together over explicit,
//! constructed-once handles (parser, embedder, clause store, model router).
//! Nothing here is lazily discovered per call; the engine is built at
//! process start and shared across requests.

use crate::config::Config;
use crate::error::Result;
use crate::index::DocumentParser;
use crate::llm::{
    run_reasoning, structure_query, Embedder, HttpEmbedder, LlmResponse, ModelRouter,
    StructuredQuery,
};
use crate::store::{ClauseStore, RetrievedClause};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Result of ingesting one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub num_chunks: usize,
}

/// Full answer for one claim query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub structured_query: StructuredQuery,
    pub retrieved_chunks: Vec<RetrievedClause>,
    /// Either a validated decision record or the diagnostic failure object;
    /// callers branch on the presence of its `error` key
    pub llm_response: LlmResponse,
}

/// The retrieval-augmented claim decisioning engine
pub struct PolicyEngine {
    parser: DocumentParser,
    embedder: Arc<dyn Embedder>,
    store: Mutex<ClauseStore>,
    router: ModelRouter,
    top_k: usize,
}

impl PolicyEngine {
    /// Build every handle from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let parser = DocumentParser::new(config.chunk_words, config.overlap_words);
        let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbedder::new(config.embedding.clone())?);
        let store = ClauseStore::open(&config.store_path)?;
        let router = ModelRouter::from_config(config)?;
        Ok(Self::new(parser, embedder, store, router, config.top_k))
    }

    /// Build from explicit handles (tests, embedded use)
    pub fn new(
        parser: DocumentParser,
        embedder: Arc<dyn Embedder>,
        store: ClauseStore,
        router: ModelRouter,
        top_k: usize,
    ) -> Self {
        tracing::info!(embedder = embedder.model_name(), top_k, "policy engine constructed");
        Self {
            parser,
            embedder,
            store: Mutex::new(store),
            router,
            top_k,
        }
    }

    /// Parse, embed, and store one policy document
    pub async fn ingest(&self, file_bytes: &[u8], filename: &str) -> Result<IngestReceipt> {
        let digest = Sha256::digest(file_bytes);
        tracing::info!(
            file = filename,
            bytes = file_bytes.len(),
            sha256 = %format!("{:x}", digest),
            "ingesting document"
        );

        let chunks = self.parser.parse(file_bytes, filename)?;
        if chunks.is_empty() {
            tracing::warn!(file = filename, "document produced no text chunks");
            return Ok(IngestReceipt { num_chunks: 0 });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let store = self.store.lock().await;
        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            store.add(&chunk.text, embedding, &chunk.metadata)?;
        }

        tracing::info!(file = filename, num_chunks = chunks.len(), "document stored");
        Ok(IngestReceipt {
            num_chunks: chunks.len(),
        })
    }

    /// Answer a free-text claim query
    pub async fn answer(&self, query: &str) -> Result<QueryResponse> {
        let structured_query = structure_query(&self.router, query).await;

        let query_embedding = self.embedder.embed(query).await?;
        let retrieved_chunks = {
            let store = self.store.lock().await;
            store.query(&query_embedding, self.top_k)?
        };
        tracing::debug!(retrieved = retrieved_chunks.len(), "clauses retrieved");

        let llm_response = run_reasoning(&self.router, &structured_query, &retrieved_chunks).await;

        Ok(QueryResponse {
            structured_query,
            retrieved_chunks,
            llm_response,
        })
    }

    /// Number of stored clauses (status reporting)
    pub async fn stored_chunks(&self) -> Result<usize> {
        self.store.lock().await.count()
    }
}
