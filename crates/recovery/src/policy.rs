use pf_domain::task::TaskKind;
use serde::{Deserialize, Serialize};

/// What a caller does when a generation cannot produce a usable artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryPolicy {
    /// Return the error to the caller.
    Propagate,
    /// Return the task's static rescue artifact instead. Kinds without
    /// one fall back to [`Propagate`](Self::Propagate).
    Substitute,
}

impl RecoveryPolicy {
    /// Tasks whose output feeds a larger workflow substitute; the rest
    /// propagate.
    pub fn for_task(kind: TaskKind) -> Self {
        match kind {
            TaskKind::ExecutionPlan | TaskKind::DailyTasks => RecoveryPolicy::Substitute,
            TaskKind::Blueprint | TaskKind::Chat => RecoveryPolicy::Propagate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_per_task() {
        assert_eq!(RecoveryPolicy::for_task(TaskKind::Blueprint), RecoveryPolicy::Propagate);
        assert_eq!(RecoveryPolicy::for_task(TaskKind::ExecutionPlan), RecoveryPolicy::Substitute);
        assert_eq!(RecoveryPolicy::for_task(TaskKind::DailyTasks), RecoveryPolicy::Substitute);
        assert_eq!(RecoveryPolicy::for_task(TaskKind::Chat), RecoveryPolicy::Propagate);
    }
}
