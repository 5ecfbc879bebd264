use serde::{Deserialize, Serialize};

use crate::roster::{ModelDescriptor, ProviderRoster};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM provider system
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Budget for a single provider attempt.
    #[serde(default = "d_30000u")]
    pub attempt_timeout_ms: u64,
    /// Pause after a 429 before moving on to the next provider.
    #[serde(default = "d_2000u")]
    pub rate_limit_backoff_ms: u64,
    /// Registered upstream endpoints (data-driven: adding a provider = adding config).
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    /// Models to try, cheapest/fastest first.
    #[serde(default)]
    pub roster: Vec<ModelDescriptor>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_ms: d_30000u(),
            rate_limit_backoff_ms: d_2000u(),
            providers: Vec::new(),
            roster: Vec::new(),
        }
    }
}

impl LlmConfig {
    /// Build the immutable, tier-ordered roster.
    pub fn roster(&self) -> ProviderRoster {
        ProviderRoster::new(self.roster.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    #[serde(default)]
    pub kind: ProviderKind,
    pub base_url: String,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI chat completions contract (OpenAI, OpenRouter, Groq, Together, Ollama, ...).
    #[default]
    OpenaiCompat,
    /// Azure OpenAI: deployment in the URL, `api-key` header.
    AzureOpenai,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Header name (e.g. "Authorization", "api-key").
    #[serde(default)]
    pub header: Option<String>,
    /// Header value prefix (e.g. "Bearer ").
    #[serde(default)]
    pub prefix: Option<String>,
    /// Env var containing the key.
    #[serde(default)]
    pub env: Option<String>,
    /// Direct key (for config-only setups; prefer env).
    #[serde(default)]
    pub key: Option<String>,
}

// ── serde default helpers ───────────────────────────────────────────

fn d_30000u() -> u64 {
    30_000
}
fn d_2000u() -> u64 {
    2_000
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
