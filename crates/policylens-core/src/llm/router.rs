//! Task-based model routing
//!
//! Maps pipeline tasks to provider chains built from configuration, so the
//! orchestration code never names a concrete provider or model.

use crate::config::Config;
use crate::error::Result;
use crate::llm::client::client_for;
use crate::llm::fallback::ProviderChain;
use crate::llm::repair::RepairEscalator;
use crate::llm::ModelClient;
use std::collections::HashMap;
use std::sync::Arc;

/// Pipeline tasks served by a provider chain. Repair tiers are routed
/// separately through [`ModelRouter::repair_escalator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Structure an incoming claim query
    Parsing,
    /// Produce the claim decision
    Reasoning,
}

/// Provider handles resolved from configuration at startup
pub struct ModelRouter {
    reasoning: ProviderChain,
    parsing: ProviderChain,
    repair_local: Arc<dyn ModelClient>,
    repair_remote: Arc<dyn ModelClient>,
}

impl ModelRouter {
    /// Build every routed client once; shared clients are reused per id
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut clients: HashMap<String, Arc<dyn ModelClient>> = HashMap::new();
        let mut resolve = |id: &str| -> Result<Arc<dyn ModelClient>> {
            if let Some(client) = clients.get(id) {
                return Ok(client.clone());
            }
            let client = client_for(config.provider(id)?)?;
            clients.insert(id.to_string(), client.clone());
            Ok(client)
        };

        let reasoning = ProviderChain::new(
            config
                .routing
                .reasoning
                .iter()
                .map(|id| resolve(id))
                .collect::<Result<Vec<_>>>()?,
        );
        let parsing = ProviderChain::new(
            config
                .routing
                .parsing
                .iter()
                .map(|id| resolve(id))
                .collect::<Result<Vec<_>>>()?,
        );
        let repair_local = resolve(&config.routing.repair_local)?;
        let repair_remote = resolve(&config.routing.repair_remote)?;

        Ok(Self {
            reasoning,
            parsing,
            repair_local,
            repair_remote,
        })
    }

    /// Build a router directly from handles (tests, embedded use)
    pub fn from_parts(
        reasoning: ProviderChain,
        parsing: ProviderChain,
        repair_local: Arc<dyn ModelClient>,
        repair_remote: Arc<dyn ModelClient>,
    ) -> Self {
        Self {
            reasoning,
            parsing,
            repair_local,
            repair_remote,
        }
    }

    /// Chain serving a completion task
    pub fn chain(&self, task: Task) -> &ProviderChain {
        match task {
            Task::Reasoning => &self.reasoning,
            Task::Parsing => &self.parsing,
        }
    }

    /// The two-tier repair escalator
    pub fn repair_escalator(&self) -> RepairEscalator {
        RepairEscalator::new(self.repair_local.clone(), self.repair_remote.clone())
    }
}
