//! Sequential fallback across the provider roster.
//!
//! The orchestrator walks the roster in tier order and gives each model
//! exactly one attempt under a fixed time budget. The first 2xx answer with
//! non-empty content wins; every other outcome is classified, logged and
//! recorded before moving to the next model. Nothing is retried against
//! the same model and nothing runs in parallel: the roster order is a cost
//! preference, so a lower-priority model is only billed once every model
//! ahead of it has failed.

use crate::registry::ProviderRegistry;
use crate::traits::{ChatRequest, ChatResponse};
use pf_domain::attempt::{AttemptLog, AttemptOutcome, ErrorClass, OrchestrationResult, PendingAttempt};
use pf_domain::config::LlmConfig;
use pf_domain::error::{Error, Result};
use pf_domain::request::GenerationRequest;
use pf_domain::roster::{ModelDescriptor, ProviderRoster};
use pf_domain::trace::TraceEvent;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Settings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Budget for a single provider attempt.
    pub attempt_timeout: Duration,
    /// Pause after a rate-limited attempt before trying the next model.
    pub rate_limit_backoff: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for OrchestratorSettings {
    fn from(cfg: &LlmConfig) -> Self {
        Self {
            attempt_timeout: Duration::from_millis(cfg.attempt_timeout_ms),
            rate_limit_backoff: Duration::from_millis(cfg.rate_limit_backoff_ms),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Orchestrator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Turns one [`GenerationRequest`] into one [`OrchestrationResult`].
///
/// Holds only read-only state; share it behind an `Arc` across concurrent
/// requests.
pub struct FallbackOrchestrator {
    roster: Arc<ProviderRoster>,
    registry: ProviderRegistry,
    settings: OrchestratorSettings,
}

/// What a single attempt produced.
enum Step {
    Won(AttemptOutcome, ChatResponse),
    Failed(AttemptOutcome),
}

impl FallbackOrchestrator {
    /// Build an orchestrator over an injected roster and registry.
    ///
    /// Fails when a roster entry references a provider that is not in the
    /// registry, so every attempt at request time has an adapter to call.
    pub fn new(
        roster: Arc<ProviderRoster>,
        registry: ProviderRegistry,
        settings: OrchestratorSettings,
    ) -> Result<Self> {
        let missing: Vec<&str> = roster
            .iter()
            .map(|m| m.provider_id())
            .filter(|id| !registry.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "roster references unregistered provider(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            roster,
            registry,
            settings,
        })
    }

    /// Construct the registry and roster from the full LLM config.
    pub fn from_config(llm_config: &LlmConfig) -> Result<Self> {
        Self::new(
            Arc::new(llm_config.roster()),
            ProviderRegistry::from_config(llm_config),
            OrchestratorSettings::from(llm_config),
        )
    }

    pub fn roster(&self) -> &ProviderRoster {
        &self.roster
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn settings(&self) -> OrchestratorSettings {
        self.settings
    }

    // ── Public API ─────────────────────────────────────────────────

    /// Try each roster model in order until one produces content.
    pub async fn attempt(&self, req: &GenerationRequest) -> OrchestrationResult {
        self.attempt_with_cancel(req, &CancellationToken::new()).await
    }

    /// Like [`attempt`](Self::attempt), but stops promptly when `cancel`
    /// fires. The in-flight call is dropped (aborting its HTTP request) and
    /// left out of the log; the result is [`OrchestrationResult::Cancelled`].
    pub async fn attempt_with_cancel(
        &self,
        req: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> OrchestrationResult {
        let generation_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "generation",
            generation_id = %generation_id,
            structured = req.wants_structured_output(),
        );
        self.run(req, cancel, &generation_id).instrument(span).await
    }

    // ── Internal ───────────────────────────────────────────────────

    async fn run(
        &self,
        req: &GenerationRequest,
        cancel: &CancellationToken,
        generation_id: &str,
    ) -> OrchestrationResult {
        let started = Instant::now();
        let mut attempts = AttemptLog::new();
        let last_index = self.roster.len().saturating_sub(1);

        for (index, model) in self.roster.iter().enumerate() {
            let json_mode = req.wants_structured_output() && model.supports_strict_json_mode;

            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                step = self.try_model(req, model) => Some(step),
            };

            let Some(step) = step else {
                tracing::info!(model = %model.id, "generation cancelled mid-attempt");
                return finish(generation_id, started, OrchestrationResult::Cancelled { attempts });
            };

            match step {
                Step::Won(outcome, response) => {
                    emit_attempt(generation_id, index, &outcome, json_mode);
                    attempts.record(outcome);
                    return finish(
                        generation_id,
                        started,
                        OrchestrationResult::Success {
                            content: response.content,
                            winning_model: model.id.clone(),
                            usage: response.usage,
                            finish_reason: response.finish_reason,
                            attempts,
                        },
                    );
                }
                Step::Failed(outcome) => {
                    emit_attempt(generation_id, index, &outcome, json_mode);
                    tracing::warn!(
                        model = %model.id,
                        error_class = ?outcome.error_class,
                        http_status = ?outcome.http_status,
                        duration_ms = outcome.duration_ms,
                        error = %outcome.raw_error_text,
                        "model attempt failed, trying next"
                    );
                    let rate_limited = outcome.error_class == Some(ErrorClass::RateLimited);
                    attempts.record(outcome);

                    if rate_limited && index < last_index && !self.settings.rate_limit_backoff.is_zero() {
                        let cancelled = tokio::select! {
                            biased;
                            _ = cancel.cancelled() => true,
                            _ = tokio::time::sleep(self.settings.rate_limit_backoff) => false,
                        };
                        if cancelled {
                            return finish(generation_id, started, OrchestrationResult::Cancelled { attempts });
                        }
                    }
                }
            }
        }

        finish(generation_id, started, OrchestrationResult::Exhausted { attempts })
    }

    /// One attempt against one model, under the per-attempt timeout.
    ///
    /// On expiry the provider future is dropped, which aborts the request.
    async fn try_model(&self, req: &GenerationRequest, model: &ModelDescriptor) -> Step {
        let pending = PendingAttempt::start(&model.id);

        let Some(provider) = self.registry.get(model.provider_id()) else {
            return Step::Failed(pending.fail(
                ErrorClass::UpstreamRejected,
                None,
                format!("provider '{}' is not registered", model.provider_id()),
            ));
        };

        let chat_req = ChatRequest::for_attempt(req, model);
        let timeout = self.settings.attempt_timeout;

        match tokio::time::timeout(timeout, provider.chat(&chat_req)).await {
            Err(_) => Step::Failed(pending.fail(
                ErrorClass::Timeout,
                None,
                format!("no response within {}ms", timeout.as_millis()),
            )),
            Ok(Err(e)) => Step::Failed(pending.fail(classify_error(&e), e.http_status(), e.to_string())),
            Ok(Ok(resp)) if resp.content.trim().is_empty() => Step::Failed(pending.fail(
                ErrorClass::EmptyContent,
                Some(resp.status),
                format!("empty content (finish_reason: {})", resp.finish_reason.as_deref().unwrap_or("none")),
            )),
            Ok(Ok(resp)) => Step::Won(pending.succeed(resp.status), resp),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Map an adapter error onto the attempt taxonomy.
pub fn classify_error(err: &Error) -> ErrorClass {
    match err {
        Error::Timeout(_) => ErrorClass::Timeout,
        Error::Upstream { status, .. } => ErrorClass::from_status(*status),
        Error::Http(_) | Error::Io(_) => ErrorClass::Network,
        // 2xx whose body held nothing usable.
        Error::Provider { .. } | Error::Json(_) => ErrorClass::EmptyContent,
        Error::Config(_) | Error::Auth(_) | Error::Other(_) => ErrorClass::UpstreamRejected,
    }
}

fn emit_attempt(generation_id: &str, index: usize, outcome: &AttemptOutcome, json_mode: bool) {
    TraceEvent::GenerationAttempt {
        generation_id: generation_id.to_string(),
        model_id: outcome.model_id.clone(),
        attempt_index: index,
        succeeded: outcome.succeeded,
        duration_ms: outcome.duration_ms,
        http_status: outcome.http_status,
        error_class: outcome.error_class,
        json_mode,
    }
    .emit();
}

fn finish(generation_id: &str, started: Instant, result: OrchestrationResult) -> OrchestrationResult {
    let (winning_model, usage) = match &result {
        OrchestrationResult::Success {
            winning_model,
            usage,
            ..
        } => (Some(winning_model.clone()), *usage),
        _ => (None, None),
    };

    TraceEvent::GenerationFinished {
        generation_id: generation_id.to_string(),
        outcome: result.outcome_str().to_string(),
        winning_model,
        attempts: result.attempts().len(),
        duration_ms: started.elapsed().as_millis() as u64,
        prompt_tokens: usage.map(|u| u.prompt_tokens),
        completion_tokens: usage.map(|u| u.completion_tokens),
    }
    .emit();

    result
}
