use std::sync::Arc;

use pf_domain::config::{Config, ConfigSeverity};
use pf_providers::FallbackOrchestrator;
use pf_recovery::StructuredGenerator;
use tokio_util::sync::CancellationToken;

/// Shared application state passed to all API handlers.
///
/// Everything here is read-only after startup; concurrent generations
/// share the roster and provider registry through the generator.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: StructuredGenerator,
    /// Cancelled on graceful shutdown. Each request works under a child
    /// token so in-flight generations stop with the server.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Arc<Config>, orchestrator: FallbackOrchestrator, shutdown: CancellationToken) -> Self {
        Self {
            config,
            generator: StructuredGenerator::new(Arc::new(orchestrator)),
            shutdown,
        }
    }

    /// Validate config, then build the provider registry and orchestrator.
    /// This is the shared boot path for `serve` and `generate`; a config
    /// with any error-severity issue is refused.
    pub fn from_config(config: Arc<Config>, shutdown: CancellationToken) -> anyhow::Result<Self> {
        let issues = config.validate();
        for issue in &issues {
            match issue.severity {
                ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
                ConfigSeverity::Error => tracing::error!("config: {issue}"),
            }
        }
        let error_count = issues
            .iter()
            .filter(|i| i.severity == ConfigSeverity::Error)
            .count();
        if error_count > 0 {
            anyhow::bail!("config validation failed with {error_count} error(s)");
        }

        let orchestrator = FallbackOrchestrator::from_config(&config.llm)?;
        tracing::info!(
            providers = orchestrator.registry().len(),
            roster = orchestrator.roster().len(),
            "fallback orchestrator ready"
        );
        Ok(Self::new(config, orchestrator, shutdown))
    }
}
