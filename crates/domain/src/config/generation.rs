use serde::{Deserialize, Serialize};

use crate::task::TaskKind;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Per-task generation parameters
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "d_blueprint")]
    pub blueprint: TaskParams,
    #[serde(default = "d_execution_plan")]
    pub execution_plan: TaskParams,
    #[serde(default = "d_daily_tasks")]
    pub daily_tasks: TaskParams,
    #[serde(default = "d_chat")]
    pub chat: TaskParams,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            blueprint: d_blueprint(),
            execution_plan: d_execution_plan(),
            daily_tasks: d_daily_tasks(),
            chat: d_chat(),
        }
    }
}

impl GenerationConfig {
    pub fn params(&self, kind: TaskKind) -> &TaskParams {
        match kind {
            TaskKind::Blueprint => &self.blueprint,
            TaskKind::ExecutionPlan => &self.execution_plan,
            TaskKind::DailyTasks => &self.daily_tasks,
            TaskKind::Chat => &self.chat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

fn d_blueprint() -> TaskParams {
    TaskParams {
        temperature: 0.7,
        max_output_tokens: 2_000,
    }
}
fn d_execution_plan() -> TaskParams {
    TaskParams {
        temperature: 0.4,
        max_output_tokens: 3_000,
    }
}
fn d_daily_tasks() -> TaskParams {
    TaskParams {
        temperature: 0.4,
        max_output_tokens: 1_500,
    }
}
fn d_chat() -> TaskParams {
    TaskParams {
        temperature: 0.8,
        max_output_tokens: 800,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg: GenerationConfig = toml::from_str(
            r#"
            [chat]
            temperature = 0.2
            max_output_tokens = 300
            "#,
        )
        .unwrap();
        assert_eq!(cfg.params(TaskKind::Chat).max_output_tokens, 300);
        assert_eq!(cfg.params(TaskKind::ExecutionPlan), &d_execution_plan());
    }
}
