//! Per-provider attempt records and the terminal result of one orchestration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Why a single provider attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Timeout,
    RateLimited,
    Network,
    UpstreamRejected,
    EmptyContent,
}

impl ErrorClass {
    /// Map an upstream HTTP status to its class. Only meaningful for non-2xx.
    pub fn from_status(status: u16) -> Self {
        if status == 429 {
            ErrorClass::RateLimited
        } else {
            ErrorClass::UpstreamRejected
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::Timeout => "timeout",
            ErrorClass::RateLimited => "rate_limited",
            ErrorClass::Network => "network",
            ErrorClass::UpstreamRejected => "upstream_rejected",
            ErrorClass::EmptyContent => "empty_content",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token usage for a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The record of one provider trial. Finalized once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptOutcome {
    pub model_id: String,
    pub succeeded: bool,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_class: Option<ErrorClass>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub raw_error_text: String,
}

/// A trial that has started but not finished yet.
///
/// Consumed by [`PendingAttempt::succeed`] or [`PendingAttempt::fail`];
/// a trial dropped mid-flight (cancellation) never produces an outcome.
#[derive(Debug)]
pub struct PendingAttempt {
    model_id: String,
    started: Instant,
}

impl PendingAttempt {
    pub fn start(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            started: Instant::now(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn succeed(self, http_status: u16) -> AttemptOutcome {
        AttemptOutcome {
            duration_ms: self.elapsed_ms(),
            model_id: self.model_id,
            succeeded: true,
            http_status: Some(http_status),
            error_class: None,
            raw_error_text: String::new(),
        }
    }

    pub fn fail(
        self,
        error_class: ErrorClass,
        http_status: Option<u16>,
        raw_error_text: impl Into<String>,
    ) -> AttemptOutcome {
        AttemptOutcome {
            duration_ms: self.elapsed_ms(),
            model_id: self.model_id,
            succeeded: false,
            http_status,
            error_class: Some(error_class),
            raw_error_text: raw_error_text.into(),
        }
    }
}

/// Append-only, ordered history of every finished attempt in one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttemptLog {
    entries: Vec<AttemptOutcome>,
}

impl AttemptLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: AttemptOutcome) {
        self.entries.push(outcome);
    }

    pub fn entries(&self) -> &[AttemptOutcome] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Error classes of the failed attempts, in order.
    pub fn failure_classes(&self) -> Vec<ErrorClass> {
        self.entries.iter().filter_map(|a| a.error_class).collect()
    }
}

/// Terminal value of one orchestration.
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestrationResult {
    /// First attempt that returned 2xx with non-empty content.
    Success {
        content: String,
        winning_model: String,
        usage: Option<Usage>,
        finish_reason: Option<String>,
        attempts: AttemptLog,
    },
    /// Every provider in the roster failed.
    Exhausted { attempts: AttemptLog },
    /// The caller cancelled; holds only attempts finished before that.
    Cancelled { attempts: AttemptLog },
}

impl OrchestrationResult {
    pub fn attempts(&self) -> &AttemptLog {
        match self {
            OrchestrationResult::Success { attempts, .. }
            | OrchestrationResult::Exhausted { attempts }
            | OrchestrationResult::Cancelled { attempts } => attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OrchestrationResult::Success { .. })
    }

    pub fn outcome_str(&self) -> &'static str {
        match self {
            OrchestrationResult::Success { .. } => "success",
            OrchestrationResult::Exhausted { .. } => "exhausted",
            OrchestrationResult::Cancelled { .. } => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(ErrorClass::from_status(429), ErrorClass::RateLimited);
        assert_eq!(ErrorClass::from_status(500), ErrorClass::UpstreamRejected);
        assert_eq!(ErrorClass::from_status(400), ErrorClass::UpstreamRejected);
        assert_eq!(ErrorClass::from_status(503), ErrorClass::UpstreamRejected);
    }

    #[test]
    fn pending_attempt_finalizes_once() {
        let ok = PendingAttempt::start("a/b").succeed(200);
        assert!(ok.succeeded);
        assert_eq!(ok.http_status, Some(200));
        assert_eq!(ok.error_class, None);

        let failed = PendingAttempt::start("c/d").fail(ErrorClass::RateLimited, Some(429), "slow down");
        assert!(!failed.succeeded);
        assert_eq!(failed.model_id, "c/d");
        assert_eq!(failed.error_class, Some(ErrorClass::RateLimited));
        assert_eq!(failed.raw_error_text, "slow down");
    }

    #[test]
    fn log_keeps_insertion_order() {
        let mut log = AttemptLog::new();
        log.record(PendingAttempt::start("one").fail(ErrorClass::Timeout, None, ""));
        log.record(PendingAttempt::start("two").fail(ErrorClass::EmptyContent, Some(200), ""));
        log.record(PendingAttempt::start("three").succeed(200));

        let ids: Vec<&str> = log.entries().iter().map(|a| a.model_id.as_str()).collect();
        assert_eq!(ids, vec!["one", "two", "three"]);
        assert_eq!(
            log.failure_classes(),
            vec![ErrorClass::Timeout, ErrorClass::EmptyContent]
        );
    }

    #[test]
    fn error_class_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorClass::UpstreamRejected).unwrap();
        assert_eq!(json, r#""upstream_rejected""#);
    }
}
