//! Repository port: the persisted task/workflow store.
//!
//! The core relies on find / save semantics only:
//! - `save_*` on a draft assigns the identity (first persist),
//! - `save_tasks` is atomic per batch: either every draft is stored or none,
//! - `claim` is a conditional write (Queued -> Running),
//! - `save_task` never overwrites a Completed or Failed row.

use async_trait::async_trait;

use crate::domain::{
    NewTask, NewWorkflow, StoreError, TaskId, TaskRecord, TaskStatus, WorkflowId, WorkflowRecord,
};

/// Criteria for `find_tasks`. Results are always ordered by ascending
/// `step_number`; ties keep creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub workflow_id: Option<WorkflowId>,
}

impl TaskQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn queued() -> Self {
        Self {
            status: Some(TaskStatus::Queued),
            workflow_id: None,
        }
    }

    pub fn in_workflow(workflow_id: WorkflowId) -> Self {
        Self {
            status: None,
            workflow_id: Some(workflow_id),
        }
    }

    pub fn matches(&self, task: &TaskRecord) -> bool {
        self.status.is_none_or(|s| task.status == s)
            && self.workflow_id.is_none_or(|w| task.workflow_id == w)
    }
}

#[async_trait]
pub trait Repository: Send + Sync {
    /// Persist a new workflow (status Initial) and assign its identity.
    async fn save_workflow(&self, workflow: NewWorkflow) -> Result<WorkflowRecord, StoreError>;

    /// Overwrite an existing workflow row.
    async fn update_workflow(&self, workflow: &WorkflowRecord) -> Result<(), StoreError>;

    async fn find_workflow(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Option<WorkflowRecord>, StoreError>;

    /// Persist drafts (status Queued), assigning identities, as one batch.
    ///
    /// Fails without storing anything if a draft's `depends_on` is unknown.
    async fn save_tasks(&self, tasks: Vec<NewTask>) -> Result<Vec<TaskRecord>, StoreError>;

    /// Overwrite an existing task row.
    ///
    /// Fails with `TaskTerminal` when the stored row is already Completed or
    /// Failed: a terminal output is written once.
    async fn save_task(&self, task: &TaskRecord) -> Result<(), StoreError>;

    async fn find_task(&self, task_id: TaskId) -> Result<Option<TaskRecord>, StoreError>;

    async fn find_tasks(&self, query: TaskQuery) -> Result<Vec<TaskRecord>, StoreError>;

    /// Atomically move a task from Queued to Running.
    ///
    /// Returns the claimed record, or `None` when the task is no longer
    /// Queued (someone else claimed it, or it already finished).
    async fn claim(&self, task_id: TaskId) -> Result<Option<TaskRecord>, StoreError>;
}
