//! Provider registry.
//!
//! Constructs and holds all configured LLM provider instances. At startup the
//! registry reads the [`LlmConfig`], resolves authentication (env vars, direct
//! keys), and instantiates the adapter for each configured provider.

use crate::openai_compat::OpenAiCompatProvider;
use crate::traits::LlmProvider;
use pf_domain::config::{LlmConfig, ProviderKind};
use std::collections::HashMap;
use std::sync::Arc;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ProviderRegistry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Holds all instantiated LLM providers, keyed by config id. Read-only
/// after construction.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
}

impl ProviderRegistry {
    /// Build the registry from the application's [`LlmConfig`].
    ///
    /// Providers that fail to initialize (e.g. a missing API key env var)
    /// are logged and skipped rather than aborting startup; the orchestrator
    /// then refuses any roster that still points at them.
    pub fn from_config(config: &LlmConfig) -> Self {
        let mut providers: HashMap<String, Arc<dyn LlmProvider>> = HashMap::new();

        for pc in &config.providers {
            let result = match pc.kind {
                ProviderKind::OpenaiCompat | ProviderKind::AzureOpenai => {
                    OpenAiCompatProvider::from_config(pc)
                        .map(|p| Arc::new(p) as Arc<dyn LlmProvider>)
                }
            };

            match result {
                Ok(provider) => {
                    tracing::info!(
                        provider_id = %pc.id,
                        kind = ?pc.kind,
                        "registered LLM provider"
                    );
                    providers.insert(pc.id.clone(), provider);
                }
                Err(e) => {
                    tracing::warn!(
                        provider_id = %pc.id,
                        kind = ?pc.kind,
                        error = %e,
                        "failed to initialize LLM provider, skipping"
                    );
                }
            }
        }

        Self { providers }
    }

    /// Build from already-constructed providers (useful for testing).
    pub fn from_providers(providers: impl IntoIterator<Item = Arc<dyn LlmProvider>>) -> Self {
        Self {
            providers: providers
                .into_iter()
                .map(|p| (p.provider_id().to_string(), p))
                .collect(),
        }
    }

    /// Look up a provider by its config id.
    pub fn get(&self, provider_id: &str) -> Option<Arc<dyn LlmProvider>> {
        self.providers.get(provider_id).cloned()
    }

    pub fn contains(&self, provider_id: &str) -> bool {
        self.providers.contains_key(provider_id)
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// List all registered provider IDs (sorted).
    pub fn list_providers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_domain::config::{AuthConfig, ProviderConfig};

    #[test]
    fn skips_providers_that_fail_to_initialize() {
        let config = LlmConfig {
            providers: vec![
                ProviderConfig {
                    id: "local".into(),
                    kind: ProviderKind::OpenaiCompat,
                    base_url: "http://localhost:11434/v1".into(),
                    auth: AuthConfig::default(),
                    default_model: None,
                },
                ProviderConfig {
                    id: "broken".into(),
                    kind: ProviderKind::OpenaiCompat,
                    base_url: "https://example.com/v1".into(),
                    auth: AuthConfig {
                        env: Some("PF_TEST_REGISTRY_MISSING_KEY_4242".into()),
                        ..Default::default()
                    },
                    default_model: None,
                },
            ],
            ..Default::default()
        };

        let registry = ProviderRegistry::from_config(&config);
        assert_eq!(registry.list_providers(), vec!["local".to_string()]);
        assert!(registry.contains("local"));
        assert!(!registry.contains("broken"));
    }
}
