use serde::Serialize;

use crate::attempt::ErrorClass;

/// Structured trace events emitted across all PlanForge crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    /// One provider trial finished (success or failure).
    GenerationAttempt {
        generation_id: String,
        model_id: String,
        attempt_index: usize,
        succeeded: bool,
        duration_ms: u64,
        http_status: Option<u16>,
        error_class: Option<ErrorClass>,
        json_mode: bool,
    },
    /// The orchestrator reached a terminal state.
    GenerationFinished {
        generation_id: String,
        outcome: String,
        winning_model: Option<String>,
        attempts: usize,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    /// A caller replaced a failed generation with its static rescue artifact.
    RescueSubstituted {
        task: String,
        reason: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "pf_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_event_serializes_with_tag() {
        let ev = TraceEvent::GenerationAttempt {
            generation_id: "g1".into(),
            model_id: "free/a".into(),
            attempt_index: 0,
            succeeded: false,
            duration_ms: 12,
            http_status: Some(429),
            error_class: Some(ErrorClass::RateLimited),
            json_mode: false,
        };
        let v: serde_json::Value = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["event"], "GenerationAttempt");
        assert_eq!(v["error_class"], "rate_limited");
        assert_eq!(v["http_status"], 429);
    }
}
