//! Engine error taxonomy.
//!
//! Job failures never show up here: they are recorded as task output.
//! These errors cover graph construction, dispatch, storage and queries.

use thiserror::Error;

use super::ids::{TaskId, WorkflowId};
use super::state::WorkflowStatus;
use super::task::TaskType;

/// Errors raised by a repository implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("workflow not found: {0}")]
    WorkflowNotFound(WorkflowId),

    #[error("task {0} is already terminal and cannot be overwritten")]
    TaskTerminal(TaskId),

    #[error("dependency {dependency} of a new task does not exist")]
    DanglingDependency { dependency: TaskId },

    #[error("store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Task dependency {dependency} not found for task {step}")]
    UnresolvedDependency { dependency: String, step: String },

    #[error(
        "step {step} is both a dependency target and depends on {dependency}; only two levels are supported"
    )]
    NestedDependency { step: String, dependency: String },

    #[error("no job registered for task type {0}")]
    UnknownTaskType(TaskType),

    #[error("invalid workflow definition: {0}")]
    InvalidDefinition(String),

    #[error("failed to parse workflow definition: {0}")]
    DefinitionParse(#[from] serde_yaml_ng::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task {0} already reached a terminal state")]
    TaskAlreadyTerminal(TaskId),

    #[error("workflow not found: {0}")]
    WorkflowNotFound(WorkflowId),

    #[error("workflow {workflow_id} is not completed (status: {status})")]
    WorkflowNotCompleted {
        workflow_id: WorkflowId,
        status: WorkflowStatus,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
