//! Orchestration plus recovery: from a request to a typed artifact.
//!
//! ```text
//! Pending -> Orchestrating -> Success -> Validating -> Accepted
//!                                                  \-> Rejected  -\
//!                          -> Exhausted ---------------------------+-> policy
//!                          -> Cancelled -> error (never substituted)
//! ```
//!
//! `Rejected` and `Exhausted` go through the caller's [`RecoveryPolicy`]:
//! `Propagate` returns the error, `Substitute` returns the static rescue
//! artifact when the task has one.

use crate::artifacts::Artifact;
use crate::error::GenerationError;
use crate::policy::RecoveryPolicy;
use crate::rescue::rescue_artifact;
use pf_domain::attempt::OrchestrationResult;
use pf_domain::request::GenerationRequest;
use pf_domain::trace::TraceEvent;
use pf_providers::FallbackOrchestrator;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Where a returned artifact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Generated,
    Rescue,
}

/// A usable artifact, tagged with its origin.
#[derive(Debug, Clone, Serialize)]
pub struct Generated<T> {
    pub data: T,
    pub source: Source,
    /// The roster model that produced `data`; `None` for rescues.
    pub model: Option<String>,
}

/// Resolve an orchestration outcome into an artifact or an error.
pub fn with_rescue<T: Artifact>(
    outcome: OrchestrationResult,
    policy: RecoveryPolicy,
) -> Result<Generated<T>, GenerationError> {
    let failure = match outcome {
        OrchestrationResult::Success {
            content,
            winning_model,
            ..
        } => match T::from_model_output(&content).and_then(|data| data.check_shape().map(|()| data)) {
            Ok(data) => {
                return Ok(Generated {
                    data,
                    source: Source::Generated,
                    model: Some(winning_model),
                })
            }
            Err(reason) => {
                tracing::warn!(
                    task = %T::KIND,
                    model = %winning_model,
                    reason = %reason,
                    "model output rejected"
                );
                GenerationError::MalformedStructuredOutput {
                    model: winning_model,
                    reason,
                }
            }
        },
        OrchestrationResult::Exhausted { attempts } => GenerationError::Exhausted { attempts },
        OrchestrationResult::Cancelled { .. } => return Err(GenerationError::Cancelled),
    };

    if policy == RecoveryPolicy::Substitute {
        if let Some(data) = rescue_artifact::<T>() {
            TraceEvent::RescueSubstituted {
                task: T::KIND.to_string(),
                reason: failure.to_string(),
            }
            .emit();
            return Ok(Generated {
                data,
                source: Source::Rescue,
                model: None,
            });
        }
    }

    tracing::warn!(task = %T::KIND, error = %failure, "generation failed");
    Err(failure)
}

/// Runs requests through the fallback orchestrator and applies recovery.
#[derive(Clone)]
pub struct StructuredGenerator {
    orchestrator: Arc<FallbackOrchestrator>,
}

impl StructuredGenerator {
    pub fn new(orchestrator: Arc<FallbackOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &FallbackOrchestrator {
        &self.orchestrator
    }

    /// Generate a `T` with the given policy.
    pub async fn generate<T: Artifact>(
        &self,
        req: &GenerationRequest,
        policy: RecoveryPolicy,
        cancel: &CancellationToken,
    ) -> Result<Generated<T>, GenerationError> {
        let span = tracing::info_span!("recover", task = %T::KIND, policy = ?policy);
        async {
            let outcome = self.orchestrator.attempt_with_cancel(req, cancel).await;
            with_rescue::<T>(outcome, policy)
        }
        .instrument(span)
        .await
    }

    /// Generate a `T` with its task's default policy.
    pub async fn generate_default<T: Artifact>(
        &self,
        req: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<Generated<T>, GenerationError> {
        self.generate(req, RecoveryPolicy::for_task(T::KIND), cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{Blueprint, ChatReply, ExecutionPlan};
    use crate::rescue::rescue_json;
    use pf_domain::attempt::{AttemptLog, ErrorClass, PendingAttempt};

    fn success(content: &str) -> OrchestrationResult {
        let mut attempts = AttemptLog::new();
        attempts.record(PendingAttempt::start("paid/gpt-4o").succeed(200));
        OrchestrationResult::Success {
            content: content.into(),
            winning_model: "paid/gpt-4o".into(),
            usage: None,
            finish_reason: None,
            attempts,
        }
    }

    fn exhausted() -> OrchestrationResult {
        let mut attempts = AttemptLog::new();
        for id in ["a", "b", "c"] {
            attempts.record(PendingAttempt::start(id).fail(
                ErrorClass::UpstreamRejected,
                Some(500),
                "boom".to_string(),
            ));
        }
        OrchestrationResult::Exhausted { attempts }
    }

    #[test]
    fn repaired_success_is_accepted() {
        let out = with_rescue::<Blueprint>(
            success("```json\n{\"productName\":\"Foo\"}\n```"),
            RecoveryPolicy::Propagate,
        )
        .unwrap();
        assert_eq!(out.source, Source::Generated);
        assert_eq!(out.model.as_deref(), Some("paid/gpt-4o"));
        assert_eq!(out.data.product_name, "Foo");
    }

    #[test]
    fn exhausted_propagates_with_log() {
        match with_rescue::<Blueprint>(exhausted(), RecoveryPolicy::Propagate) {
            Err(GenerationError::Exhausted { attempts }) => assert_eq!(attempts.len(), 3),
            other => panic!("expected exhausted, got {other:?}"),
        }
    }

    #[test]
    fn exhausted_substitutes_static_plan() {
        let out = with_rescue::<ExecutionPlan>(exhausted(), RecoveryPolicy::Substitute).unwrap();
        assert_eq!(out.source, Source::Rescue);
        assert!(out.model.is_none());
        let expected: ExecutionPlan = serde_json::from_str(rescue_json(ExecutionPlan::KIND).unwrap()).unwrap();
        assert_eq!(out.data, expected);
    }

    #[test]
    fn forced_exhaustion_twice_is_byte_identical() {
        let a = with_rescue::<ExecutionPlan>(exhausted(), RecoveryPolicy::Substitute).unwrap();
        let b = with_rescue::<ExecutionPlan>(exhausted(), RecoveryPolicy::Substitute).unwrap();
        assert_eq!(
            serde_json::to_vec(&a.data).unwrap(),
            serde_json::to_vec(&b.data).unwrap()
        );
    }

    #[test]
    fn unparseable_output_is_malformed_or_substituted() {
        let err = with_rescue::<ExecutionPlan>(success("no plan today"), RecoveryPolicy::Propagate).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedStructuredOutput { .. }));

        let out = with_rescue::<ExecutionPlan>(success("no plan today"), RecoveryPolicy::Substitute).unwrap();
        assert_eq!(out.source, Source::Rescue);
    }

    #[test]
    fn failed_shape_gate_is_substituted_like_exhaustion() {
        let out = with_rescue::<ExecutionPlan>(
            success(r#"{"title":"Plan","phases":[]}"#),
            RecoveryPolicy::Substitute,
        )
        .unwrap();
        assert_eq!(out.source, Source::Rescue);
    }

    #[test]
    fn substitute_without_artifact_propagates() {
        let err = with_rescue::<Blueprint>(exhausted(), RecoveryPolicy::Substitute).unwrap_err();
        assert_eq!(err.kind(), "exhausted");
    }

    #[test]
    fn cancelled_is_never_substituted() {
        let err = with_rescue::<ExecutionPlan>(
            OrchestrationResult::Cancelled {
                attempts: AttemptLog::new(),
            },
            RecoveryPolicy::Substitute,
        )
        .unwrap_err();
        assert!(matches!(err, GenerationError::Cancelled));
    }

    #[test]
    fn chat_reply_skips_repair() {
        let out = with_rescue::<ChatReply>(success("Sure: {not json"), RecoveryPolicy::Propagate).unwrap();
        assert_eq!(out.data.reply, "Sure: {not json");
    }
}
