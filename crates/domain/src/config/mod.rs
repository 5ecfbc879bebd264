mod generation;
mod llm;
mod observability;
mod server;

pub use generation::*;
pub use llm::*;
pub use observability::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError::error("server.port", "port must be greater than 0"));
        }
        if self.server.host.is_empty() {
            errors.push(ConfigError::error("server.host", "host must not be empty"));
        }

        if self.llm.attempt_timeout_ms == 0 {
            errors.push(ConfigError::error(
                "llm.attempt_timeout_ms",
                "per-attempt timeout must be greater than 0",
            ));
        }

        if self.llm.providers.is_empty() {
            errors.push(ConfigError::warning(
                "llm.providers",
                "no LLM providers configured",
            ));
        }

        let mut provider_ids = HashSet::new();
        for (i, provider) in self.llm.providers.iter().enumerate() {
            if provider.id.is_empty() {
                errors.push(ConfigError::error(
                    format!("llm.providers[{i}].id"),
                    "provider id must not be empty",
                ));
            } else if !provider_ids.insert(provider.id.as_str()) {
                errors.push(ConfigError::error(
                    format!("llm.providers[{i}].id"),
                    format!("duplicate provider id '{}'", provider.id),
                ));
            }
            if provider.base_url.is_empty() {
                errors.push(ConfigError::error(
                    format!("llm.providers[{i}].base_url"),
                    "provider base_url must not be empty",
                ));
            }
        }

        if self.llm.roster.is_empty() {
            errors.push(ConfigError::error(
                "llm.roster",
                "roster is empty: every generation would be exhausted immediately",
            ));
        }

        for (i, model) in self.llm.roster.iter().enumerate() {
            let provider_id = model.provider_id();
            if model.id.is_empty() {
                errors.push(ConfigError::error(
                    format!("llm.roster[{i}].id"),
                    "model id must not be empty",
                ));
            } else if !provider_ids.contains(provider_id) {
                errors.push(ConfigError::error(
                    format!("llm.roster[{i}].id"),
                    format!("references unknown provider '{provider_id}'"),
                ));
            }
        }

        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError::warning(
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            ));
        }

        errors
    }
}
