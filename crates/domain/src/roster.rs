//! The provider roster: which models to try, and in what order.

use serde::{Deserialize, Serialize};

/// A static description of one provider+model pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Format: "provider_id/model_name"
    pub id: String,
    /// Lower tiers are tried first. Ties keep list order.
    #[serde(default)]
    pub tier: u32,
    /// Whether the provider honors a native JSON-mode flag for this model.
    #[serde(default)]
    pub supports_strict_json_mode: bool,
}

impl ModelDescriptor {
    pub fn new(id: impl Into<String>, tier: u32, supports_strict_json_mode: bool) -> Self {
        Self {
            id: id.into(),
            tier,
            supports_strict_json_mode,
        }
    }

    /// The provider segment of the id (before the first `/`).
    pub fn provider_id(&self) -> &str {
        split_model_id(&self.id).0
    }

    /// The model segment of the id (after the first `/`), empty when absent.
    pub fn model_name(&self) -> &str {
        split_model_id(&self.id).1
    }
}

/// Split a `"provider_id/model_name"` string into its two components.
///
/// If there is no `/`, the entire string is treated as the provider id
/// and an empty model name is returned (the provider's default will be used).
pub fn split_model_id(model_id: &str) -> (&str, &str) {
    match model_id.split_once('/') {
        Some((provider, model)) => (provider, model),
        None => (model_id, ""),
    }
}

/// An ordered, read-only list of model descriptors.
///
/// Sorted once by tier at construction (stable, so list order breaks ties).
/// Shared across concurrent requests behind an `Arc`; never reordered.
#[derive(Debug, Clone, Default)]
pub struct ProviderRoster {
    models: Vec<ModelDescriptor>,
}

impl ProviderRoster {
    pub fn new(mut models: Vec<ModelDescriptor>) -> Self {
        models.sort_by_key(|m| m.tier);
        Self { models }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter()
    }

    pub fn as_slice(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_sorts_by_tier_and_keeps_list_order_for_ties() {
        let roster = ProviderRoster::new(vec![
            ModelDescriptor::new("paid/big", 2, true),
            ModelDescriptor::new("free/a", 0, false),
            ModelDescriptor::new("free/b", 1, false),
            ModelDescriptor::new("free/c", 0, true),
        ]);

        let ids: Vec<&str> = roster.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["free/a", "free/c", "free/b", "paid/big"]);
    }

    #[test]
    fn model_id_splits_on_first_slash() {
        let m = ModelDescriptor::new("openrouter/meta-llama/llama-3.1-8b", 0, false);
        assert_eq!(m.provider_id(), "openrouter");
        assert_eq!(m.model_name(), "meta-llama/llama-3.1-8b");
    }

    #[test]
    fn model_id_without_slash_is_provider_only() {
        assert_eq!(split_model_id("ollama"), ("ollama", ""));
    }

    #[test]
    fn descriptor_defaults_from_toml() {
        let m: ModelDescriptor = toml::from_str(r#"id = "groq/llama3""#).unwrap();
        assert_eq!(m.tier, 0);
        assert!(!m.supports_strict_json_mode);
    }
}
