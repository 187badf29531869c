//! Configuration management

use crate::error::{PolicyLensError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model provider descriptors, referenced by id from `routing`
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,

    /// Which providers serve which pipeline task
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Path of the clause store database
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Number of clauses retrieved per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Chunk window size in words
    #[serde(default = "default_chunk_words")]
    pub chunk_words: usize,

    /// Chunk overlap in words
    #[serde(default = "default_overlap_words")]
    pub overlap_words: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            routing: RoutingConfig::default(),
            embedding: EmbeddingConfig::default(),
            store_path: default_store_path(),
            top_k: default_top_k(),
            chunk_words: default_chunk_words(),
            overlap_words: default_overlap_words(),
        }
    }
}

/// Backend protocol spoken by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions (vLLM, OpenAI, etc.)
    OpenAi,
    /// Local Ollama daemon
    Ollama,
}

/// One model provider descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Identifier referenced from routing (also used in failure reports)
    pub id: String,

    pub kind: ProviderKind,

    /// Base URL of the service
    pub url: String,

    /// Model name passed to the service
    pub model: String,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds. Timeouts count as provider failures.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Provider ids per pipeline task, in priority order where a list is given
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Chain for claim-decision reasoning (remote first, local last)
    #[serde(default = "default_reasoning_chain")]
    pub reasoning: Vec<String>,

    /// Chain for structuring incoming queries
    #[serde(default = "default_parsing_chain")]
    pub parsing: Vec<String>,

    /// Fast local model for the first repair tier
    #[serde(default = "default_repair_local")]
    pub repair_local: String,

    /// High-capability remote model for the second repair tier
    #[serde(default = "default_repair_remote")]
    pub repair_remote: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            reasoning: default_reasoning_chain(),
            parsing: default_parsing_chain(),
            repair_local: default_repair_local(),
            repair_remote: default_repair_remote(),
        }
    }
}

/// Embedding service configuration (OpenAI-compatible /v1/embeddings)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub url: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("POLICYLENS_EMBEDDING_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            model: default_embedding_model(),
            api_key: std::env::var("POLICYLENS_EMBEDDING_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_providers() -> Vec<ProviderConfig> {
    let remote_url = std::env::var("POLICYLENS_LLM_URL")
        .unwrap_or_else(|_| "http://localhost:8000".to_string());
    let ollama_url = std::env::var("POLICYLENS_OLLAMA_URL")
        .unwrap_or_else(|_| "http://localhost:11434".to_string());
    let api_key = std::env::var("POLICYLENS_LLM_API_KEY").ok();

    vec![
        ProviderConfig {
            id: "remote-primary".to_string(),
            kind: ProviderKind::OpenAi,
            url: remote_url,
            model: std::env::var("POLICYLENS_LLM_MODEL")
                .unwrap_or_else(|_| "meta-llama/Llama-3.1-8B-Instruct".to_string()),
            api_key,
            timeout_secs: default_timeout(),
        },
        ProviderConfig {
            id: "local-reasoning".to_string(),
            kind: ProviderKind::Ollama,
            url: ollama_url.clone(),
            model: std::env::var("POLICYLENS_OLLAMA_MODEL")
                .unwrap_or_else(|_| "llama3:8b".to_string()),
            api_key: None,
            timeout_secs: default_timeout(),
        },
        ProviderConfig {
            id: "local-fast".to_string(),
            kind: ProviderKind::Ollama,
            url: ollama_url,
            model: std::env::var("POLICYLENS_OLLAMA_FAST_MODEL")
                .unwrap_or_else(|_| "gemma3n:e2b".to_string()),
            api_key: None,
            timeout_secs: default_timeout(),
        },
    ]
}

fn default_reasoning_chain() -> Vec<String> {
    vec![
        "remote-primary".to_string(),
        "local-reasoning".to_string(),
        "local-fast".to_string(),
    ]
}

fn default_parsing_chain() -> Vec<String> {
    vec!["local-fast".to_string()]
}

fn default_repair_local() -> String {
    "local-fast".to_string()
}

fn default_repair_remote() -> String {
    "remote-primary".to_string()
}

fn default_embedding_model() -> String {
    std::env::var("POLICYLENS_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string())
}

fn default_timeout() -> u64 {
    60
}

fn default_top_k() -> usize {
    5
}

fn default_chunk_words() -> usize {
    crate::index::chunker::CHUNK_SIZE_WORDS
}

fn default_overlap_words() -> usize {
    crate::index::chunker::CHUNK_OVERLAP_WORDS
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(crate::DATA_DIR_NAME)
        .join("clauses.db")
}

impl Config {
    /// Load config from default path, falling back to defaults
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Look up a provider descriptor by id
    pub fn provider(&self, id: &str) -> Result<&ProviderConfig> {
        self.providers
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| PolicyLensError::Config(format!("Unknown provider id: {}", id)))
    }

    /// Check that every routed provider id exists
    pub fn validate(&self) -> Result<()> {
        let routed = self
            .routing
            .reasoning
            .iter()
            .chain(self.routing.parsing.iter())
            .chain(std::iter::once(&self.routing.repair_local))
            .chain(std::iter::once(&self.routing.repair_remote));
        for id in routed {
            self.provider(id)?;
        }
        if self.overlap_words >= self.chunk_words {
            return Err(PolicyLensError::Config(format!(
                "overlap_words ({}) must be smaller than chunk_words ({})",
                self.overlap_words, self.chunk_words
            )));
        }
        Ok(())
    }
}
