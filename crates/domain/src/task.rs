use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kinds of generation the application asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// Product blueprint from a raw idea.
    Blueprint,
    /// Phased execution plan for a blueprint.
    ExecutionPlan,
    /// Concrete tasks for one day of the plan.
    DailyTasks,
    /// Free-form assistant reply.
    Chat,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [
        TaskKind::Blueprint,
        TaskKind::ExecutionPlan,
        TaskKind::DailyTasks,
        TaskKind::Chat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Blueprint => "blueprint",
            TaskKind::ExecutionPlan => "execution-plan",
            TaskKind::DailyTasks => "daily-tasks",
            TaskKind::Chat => "chat",
        }
    }

    /// Whether this task expects a JSON document back.
    pub fn wants_structured_output(self) -> bool {
        !matches!(self, TaskKind::Chat)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown task kind: {s}"))
    }
}
