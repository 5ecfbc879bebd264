//! Domain artifacts produced by generation tasks, and their shape gates.
//!
//! Field names follow the camelCase JSON the prompts ask models for. Most
//! fields default when missing so a slightly sparse answer still parses;
//! [`Artifact::check_shape`] then decides whether it is usable.

use crate::repair::extract_structured;
use pf_domain::task::TaskKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A typed result of one generation task.
pub trait Artifact: Sized + Serialize + DeserializeOwned + Send {
    const KIND: TaskKind;

    /// Minimal shape check on a parsed value: required fields present,
    /// lists non-empty. The error is a short human-readable reason.
    fn check_shape(&self) -> Result<(), String>;

    /// Build the artifact from raw model output.
    fn from_model_output(raw: &str) -> Result<Self, String> {
        let repaired = extract_structured(raw);
        serde_json::from_str(&repaired).map_err(|e| format!("invalid JSON after repair: {e}"))
    }
}

fn require(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} is empty"))
    } else {
        Ok(())
    }
}

fn require_items<T>(items: &[T], field: &str) -> Result<(), String> {
    if items.is_empty() {
        Err(format!("{field} has no entries"))
    } else {
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Blueprint
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub product_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub target_audience: Vec<String>,
    #[serde(default)]
    pub core_features: Vec<Feature>,
    #[serde(default)]
    pub monetization: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Artifact for Blueprint {
    const KIND: TaskKind = TaskKind::Blueprint;

    fn check_shape(&self) -> Result<(), String> {
        require(&self.product_name, "productName")?;
        for feature in &self.core_features {
            require(&feature.name, "coreFeatures[].name")?;
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Execution plan
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub phases: Vec<Phase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub name: String,
    #[serde(default)]
    pub duration_weeks: u32,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<String>,
}

impl Artifact for ExecutionPlan {
    const KIND: TaskKind = TaskKind::ExecutionPlan;

    fn check_shape(&self) -> Result<(), String> {
        require(&self.title, "title")?;
        require_items(&self.phases, "phases")?;
        for phase in &self.phases {
            require(&phase.name, "phases[].name")?;
            require_items(&phase.goals, "phases[].goals")?;
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Daily tasks
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTaskSet {
    #[serde(default = "d_day")]
    pub day: u32,
    #[serde(default)]
    pub focus: String,
    pub tasks: Vec<DailyTask>,
}

fn d_day() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_minutes: u32,
    #[serde(default)]
    pub priority: TaskPriority,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl Artifact for DailyTaskSet {
    const KIND: TaskKind = TaskKind::DailyTasks;

    fn check_shape(&self) -> Result<(), String> {
        require_items(&self.tasks, "tasks")?;
        for task in &self.tasks {
            require(&task.title, "tasks[].title")?;
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A free-form assistant reply. Taken verbatim; never repaired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

impl Artifact for ChatReply {
    const KIND: TaskKind = TaskKind::Chat;

    fn check_shape(&self) -> Result<(), String> {
        require(&self.reply, "reply")
    }

    fn from_model_output(raw: &str) -> Result<Self, String> {
        Ok(Self {
            reply: raw.trim().to_string(),
        })
    }
}
