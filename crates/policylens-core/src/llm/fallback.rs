//! Provider fallback orchestration
//!
//! Tries providers strictly in priority order and returns the first
//! success. Total failure produces a sentinel string rather than an error:
//! the downstream extractor must still attempt to parse *something*, and a
//! sentinel cleanly fails JSON-object detection instead of short-circuiting
//! the query.

use crate::llm::ModelClient;
use std::sync::Arc;

/// One provider invocation outcome, kept only for failure reporting
#[derive(Debug, Clone)]
pub struct ProviderAttempt {
    pub provider: String,
    pub error: String,
}

/// Raw text returned by a provider chain, tagged with provenance
#[derive(Debug, Clone)]
pub struct RawModelOutput {
    pub text: String,
    /// Provider that produced the text; `None` means the text is a sentinel
    pub provider: Option<String>,
}

impl RawModelOutput {
    /// Whether this output is a synthesized failure string
    pub fn is_sentinel(&self) -> bool {
        self.provider.is_none()
    }
}

/// Ordered list of model providers, tried sequentially
#[derive(Clone)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn ModelClient>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn ModelClient>>) -> Self {
        Self { providers }
    }

    pub fn single(provider: Arc<dyn ModelClient>) -> Self {
        Self {
            providers: vec![provider],
        }
    }

    /// Providers in priority order
    pub fn providers(&self) -> &[Arc<dyn ModelClient>] {
        &self.providers
    }

    /// Run the prompt through the chain. Never fails: if every provider
    /// errors, the returned text is a sentinel embedding each attempt's
    /// provider id and cause.
    pub async fn complete(&self, prompt: &str) -> RawModelOutput {
        let mut attempts: Vec<ProviderAttempt> = Vec::new();

        for client in &self.providers {
            match client.complete(prompt).await {
                Ok(text) => {
                    tracing::debug!(
                        provider = client.provider_id(),
                        model = client.model_name(),
                        "provider succeeded"
                    );
                    return RawModelOutput {
                        text,
                        provider: Some(client.provider_id().to_string()),
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        provider = client.provider_id(),
                        error = %e,
                        "provider failed, trying next"
                    );
                    attempts.push(ProviderAttempt {
                        provider: client.provider_id().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        RawModelOutput {
            text: sentinel_text(&attempts),
            provider: None,
        }
    }
}

fn sentinel_text(attempts: &[ProviderAttempt]) -> String {
    if attempts.is_empty() {
        return "All models failed: no providers configured".to_string();
    }
    let causes: Vec<String> = attempts
        .iter()
        .map(|a| format!("{}: {}", a.provider, a.error))
        .collect();
    format!("All models failed: {}", causes.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PolicyLensError, Result};
    use async_trait::async_trait;

    struct ScriptedClient {
        id: String,
        response: Result<String>,
    }

    impl ScriptedClient {
        fn ok(id: &str, text: &str) -> Arc<dyn ModelClient> {
            Arc::new(Self {
                id: id.to_string(),
                response: Ok(text.to_string()),
            })
        }

        fn failing(id: &str, message: &str) -> Arc<dyn ModelClient> {
            Arc::new(Self {
                id: id.to_string(),
                response: Err(PolicyLensError::Provider {
                    provider: id.to_string(),
                    message: message.to_string(),
                }),
            })
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(PolicyLensError::Provider { provider, message }) => {
                    Err(PolicyLensError::Provider {
                        provider: provider.clone(),
                        message: message.clone(),
                    })
                }
                Err(_) => unreachable!(),
            }
        }

        fn provider_id(&self) -> &str {
            &self.id
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let chain = ProviderChain::new(vec![
            ScriptedClient::ok("a", "answer from a"),
            ScriptedClient::ok("b", "answer from b"),
        ]);
        let out = chain.complete("prompt").await;
        assert_eq!(out.text, "answer from a");
        assert_eq!(out.provider.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_falls_through_to_later_provider() {
        let chain = ProviderChain::new(vec![
            ScriptedClient::failing("a", "connection refused"),
            ScriptedClient::ok("b", "answer from b"),
        ]);
        let out = chain.complete("prompt").await;
        assert_eq!(out.text, "answer from b");
        assert_eq!(out.provider.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_total_failure_yields_sentinel_with_every_cause() {
        let chain = ProviderChain::new(vec![
            ScriptedClient::failing("a", "connection refused"),
            ScriptedClient::failing("b", "rate limited"),
            ScriptedClient::failing("c", "model not loaded"),
        ]);
        let out = chain.complete("prompt").await;
        assert!(out.is_sentinel());
        for needle in ["a:", "b:", "c:", "connection refused", "rate limited", "model not loaded"] {
            assert!(out.text.contains(needle), "sentinel missing {:?}", needle);
        }
    }

    #[tokio::test]
    async fn test_empty_chain_is_sentinel() {
        let chain = ProviderChain::new(vec![]);
        let out = chain.complete("prompt").await;
        assert!(out.is_sentinel());
        assert!(out.text.contains("no providers configured"));
    }
}
