//! Static rescue artifacts.
//!
//! Generic but valid placeholders handed out when a substitutable task
//! cannot be generated. They ship with the binary and are never derived
//! from a model response, so the same task kind always yields the same
//! document.

use crate::artifacts::Artifact;
use pf_domain::task::TaskKind;

const EXECUTION_PLAN: &str = r#"{
  "title": "Launch plan",
  "summary": "A general four-phase plan to take the idea from validation to first users. Regenerate it once the blueprint is final.",
  "phases": [
    {
      "name": "Validate the problem",
      "durationWeeks": 2,
      "goals": [
        "Interview at least ten people in the target audience",
        "Write down the three most painful problems you heard"
      ],
      "milestones": ["Problem statement confirmed by interviews"]
    },
    {
      "name": "Build the smallest useful version",
      "durationWeeks": 4,
      "goals": [
        "Pick the one feature that solves the top problem",
        "Ship it to a handful of early users"
      ],
      "milestones": ["First external user completes the core flow"]
    },
    {
      "name": "Launch",
      "durationWeeks": 2,
      "goals": [
        "Publish a landing page with a clear call to action",
        "Announce in the communities your audience already uses"
      ],
      "milestones": ["First 50 sign-ups"]
    },
    {
      "name": "Learn and iterate",
      "durationWeeks": 4,
      "goals": [
        "Talk to active users every week",
        "Fix the biggest drop-off point in the core flow"
      ],
      "milestones": ["Weekly retention measured and improving"]
    }
  ]
}"#;

const DAILY_TASKS: &str = r#"{
  "day": 1,
  "focus": "Get clear on the problem",
  "tasks": [
    {
      "title": "Write a one-paragraph problem statement",
      "description": "Describe who has the problem, when it happens and what it costs them.",
      "estimatedMinutes": 30,
      "priority": "high"
    },
    {
      "title": "List ten people to interview",
      "description": "Pick people who match your target audience and can spare fifteen minutes.",
      "estimatedMinutes": 45,
      "priority": "high"
    },
    {
      "title": "Draft five interview questions",
      "description": "Ask about past behaviour, not opinions about your idea.",
      "estimatedMinutes": 30,
      "priority": "medium"
    },
    {
      "title": "Send the first three interview requests",
      "description": "Keep the message short and say why you picked them.",
      "estimatedMinutes": 20,
      "priority": "medium"
    }
  ]
}"#;

/// The raw rescue document for a task kind, if it has one.
pub fn rescue_json(kind: TaskKind) -> Option<&'static str> {
    match kind {
        TaskKind::ExecutionPlan => Some(EXECUTION_PLAN),
        TaskKind::DailyTasks => Some(DAILY_TASKS),
        TaskKind::Blueprint | TaskKind::Chat => None,
    }
}

/// The rescue artifact for `T`, parsed from its static document.
pub fn rescue_artifact<T: Artifact>() -> Option<T> {
    let json = rescue_json(T::KIND)?;
    match serde_json::from_str(json) {
        Ok(artifact) => Some(artifact),
        Err(e) => {
            tracing::error!(task = %T::KIND, error = %e, "rescue artifact does not parse");
            None
        }
    }
}
