//! Error types for policylens

use thiserror::Error;

/// Result type alias using PolicyLensError
pub type Result<T> = std::result::Result<T, PolicyLensError>;

/// Error type alias for convenience
pub type Error = PolicyLensError;

/// Main error type for policylens
#[derive(Debug, Error)]
pub enum PolicyLensError {
    /// A single model invocation failed (network, auth, capacity, timeout).
    /// Swallowed at the fallback orchestrator; never surfaced raw.
    /// Extraction and repair failures never reach this enum at all: they
    /// ride inside the pipeline's diagnostic failure object, and schema
    /// violations are healed by the validator's fallback record.
    #[error("Provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl PolicyLensError {
    /// Whether the outer boundary should map this to a client error (400)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFileType(_) | Self::Parse(_) | Self::Config(_)
        )
    }
}
