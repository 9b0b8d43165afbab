//! Task and workflow state machines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Task status.
///
/// State transitions:
/// - Queued -> Running -> Completed
/// - Queued -> Running -> Failed
/// - Queued -> Completed | Failed (outcome recorded without a claim)
///
/// Completed and Failed are terminal: no further transitions happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting to be picked up by the scheduler.
    Queued,

    /// Claimed by a scheduler, job in flight.
    Running,

    Completed,

    Failed,
}

impl TaskStatus {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Workflow status (aggregated from its tasks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Created, nothing has run yet.
    Initial,

    /// At least one task has started and at least one is not terminal.
    InProgress,

    /// Every task is terminal and none failed.
    Completed,

    /// Every task is terminal and at least one failed.
    Failed,
}

impl WorkflowStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }

    /// Aggregate a workflow status from the statuses of its tasks.
    pub fn from_tasks(statuses: &[TaskStatus]) -> Self {
        if statuses.iter().all(|s| *s == TaskStatus::Queued) {
            WorkflowStatus::Initial
        } else if statuses.iter().any(|s| !s.is_terminal()) {
            WorkflowStatus::InProgress
        } else if statuses.contains(&TaskStatus::Failed) {
            WorkflowStatus::Failed
        } else {
            WorkflowStatus::Completed
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowStatus::Initial => "initial",
            WorkflowStatus::InProgress => "in_progress",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}
