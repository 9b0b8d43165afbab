//! Task records: the persisted unit the scheduler drives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::EngineError;
use super::ids::{TaskId, WorkflowId};
use super::outcome::JobOutcome;
use super::state::TaskStatus;

/// Key selecting the job implementation for a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskType(String);

impl TaskType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A task that has not been persisted yet.
///
/// It has no identity. `depends_on` can only hold a `TaskId`, which only a
/// repository hands out, so a draft can never point at another draft.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub workflow_id: WorkflowId,
    pub client_id: String,
    pub task_type: TaskType,
    pub step_number: u32,
    pub payload: serde_json::Value,
    pub depends_on: Option<TaskId>,
}

impl NewTask {
    pub fn new(
        workflow_id: WorkflowId,
        client_id: impl Into<String>,
        task_type: TaskType,
        step_number: u32,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            workflow_id,
            client_id: client_id.into(),
            task_type,
            step_number,
            payload,
            depends_on: None,
        }
    }

    pub fn with_dependency(mut self, depends_on: TaskId) -> Self {
        self.depends_on = Some(depends_on);
        self
    }
}

/// A persisted task.
///
/// Design:
/// - Single source of truth for one task's state.
/// - State transitions go through methods, not direct field writes.
/// - `output` is written once, when the outcome is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub workflow_id: WorkflowId,
    pub client_id: String,
    pub task_type: TaskType,
    pub step_number: u32,
    pub status: TaskStatus,

    /// Initial payload shared by every task of the workflow.
    pub payload: serde_json::Value,

    /// Output handed down from the completed dependency, if any.
    pub input: Option<serde_json::Value>,

    pub output: Option<serde_json::Value>,
    pub depends_on: Option<TaskId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Materialize a draft with the identity assigned by the store.
    pub fn from_new(task_id: TaskId, new: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            task_id,
            workflow_id: new.workflow_id,
            client_id: new.client_id,
            task_type: new.task_type,
            step_number: new.step_number,
            status: TaskStatus::Queued,
            payload: new.payload,
            input: None,
            output: None,
            depends_on: new.depends_on,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Queued -> Running. Returns false (and changes nothing) from any other state.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != TaskStatus::Queued {
            return false;
        }
        self.status = TaskStatus::Running;
        self.updated_at = now;
        true
    }

    /// Attach the dependency's output before execution.
    pub fn hand_down_input(&mut self, input: Option<serde_json::Value>) {
        self.input = input;
    }

    /// Record the job outcome: terminal status plus output.
    pub fn record_outcome(
        &mut self,
        outcome: JobOutcome,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        if self.is_terminal() {
            return Err(EngineError::TaskAlreadyTerminal(self.task_id));
        }
        self.status = outcome.status();
        self.output = Some(outcome.into_output());
        self.updated_at = now;
        Ok(())
    }
}
