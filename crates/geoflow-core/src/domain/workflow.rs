//! Workflow records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::WorkflowId;
use super::state::{TaskStatus, WorkflowStatus};
use super::task::TaskRecord;

/// A workflow that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewWorkflow {
    pub client_id: String,
    pub name: String,
}

impl NewWorkflow {
    pub fn new(client_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            name: name.into(),
        }
    }
}

/// A persisted workflow row. Tasks point back at it through `workflow_id`;
/// the row itself holds no task references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    pub workflow_id: WorkflowId,
    pub client_id: String,
    pub name: String,
    pub status: WorkflowStatus,
    pub final_result: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowRecord {
    pub fn from_new(workflow_id: WorkflowId, new: NewWorkflow, now: DateTime<Utc>) -> Self {
        Self {
            workflow_id,
            client_id: new.client_id,
            name: new.name,
            status: WorkflowStatus::Initial,
            final_result: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `status`. The final result is only kept for terminal states.
    pub fn transition(
        &mut self,
        status: WorkflowStatus,
        final_result: Option<serde_json::Value>,
        now: DateTime<Utc>,
    ) {
        self.status = status;
        self.final_result = if status.is_terminal() {
            final_result
        } else {
            None
        };
        self.updated_at = now;
    }
}

/// A workflow together with all of its tasks, ordered by step number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub record: WorkflowRecord,
    pub tasks: Vec<TaskRecord>,
}

impl Workflow {
    pub fn new(record: WorkflowRecord, mut tasks: Vec<TaskRecord>) -> Self {
        tasks.sort_by_key(|t| t.step_number);
        Self { record, tasks }
    }

    pub fn workflow_id(&self) -> WorkflowId {
        self.record.workflow_id
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count()
    }

    pub fn total_tasks(&self) -> usize {
        self.tasks.len()
    }
}
