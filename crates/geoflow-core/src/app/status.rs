//! Workflow status queries and aggregation.
//!
//! Read side:
//! - `workflow_status`: `{workflowId, status, completedTasks, totalTasks}`
//! - `workflow_results`: `{workflowId, status, finalResult}`, Completed only
//!
//! Write side:
//! - `refresh_workflow_status`: recompute the workflow status from its tasks
//!   and record the final result once terminal.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{
    EngineError, ReportTask, TaskStatus, Workflow, WorkflowId, WorkflowRecord, WorkflowStatus,
};
use crate::jobs::{JobRegistry, JobRole};
use crate::ports::{Clock, Repository, SystemClock, TaskQuery};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatusView {
    pub workflow_id: WorkflowId,
    pub status: WorkflowStatus,
    pub completed_tasks: usize,
    pub total_tasks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResults {
    pub workflow_id: WorkflowId,
    pub status: WorkflowStatus,
    pub final_result: Option<serde_json::Value>,
}

pub struct StatusService {
    store: Arc<dyn Repository>,
    registry: Arc<JobRegistry>,
    clock: Arc<dyn Clock>,
}

impl StatusService {
    pub fn new(store: Arc<dyn Repository>, registry: Arc<JobRegistry>) -> Self {
        Self {
            store,
            registry,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The workflow row plus all of its tasks.
    pub async fn load_workflow(&self, workflow_id: WorkflowId) -> Result<Workflow, EngineError> {
        let record = self
            .store
            .find_workflow(workflow_id)
            .await?
            .ok_or(EngineError::WorkflowNotFound(workflow_id))?;
        let tasks = self
            .store
            .find_tasks(TaskQuery::in_workflow(workflow_id))
            .await?;
        Ok(Workflow::new(record, tasks))
    }

    pub async fn workflow_status(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<WorkflowStatusView, EngineError> {
        let workflow = self.load_workflow(workflow_id).await?;
        Ok(WorkflowStatusView {
            workflow_id,
            status: workflow.record.status,
            completed_tasks: workflow.completed_tasks(),
            total_tasks: workflow.total_tasks(),
        })
    }

    pub async fn workflow_results(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<WorkflowResults, EngineError> {
        let record = self
            .store
            .find_workflow(workflow_id)
            .await?
            .ok_or(EngineError::WorkflowNotFound(workflow_id))?;
        if record.status != WorkflowStatus::Completed {
            return Err(EngineError::WorkflowNotCompleted {
                workflow_id,
                status: record.status,
            });
        }
        Ok(WorkflowResults {
            workflow_id,
            status: record.status,
            final_result: record.final_result,
        })
    }

    /// Recompute and persist the aggregate status. No write when unchanged.
    pub async fn refresh_workflow_status(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<WorkflowRecord, EngineError> {
        let workflow = self.load_workflow(workflow_id).await?;
        let statuses: Vec<TaskStatus> = workflow.tasks.iter().map(|t| t.status).collect();
        let status = WorkflowStatus::from_tasks(&statuses);

        let mut record = workflow.record.clone();
        if record.status == status {
            return Ok(record);
        }

        let final_result = status.is_terminal().then(|| self.final_result(&workflow));
        record.transition(status, final_result, self.clock.now());
        self.store.update_workflow(&record).await?;

        tracing::info!(%workflow_id, %status, "workflow status changed");
        Ok(record)
    }

    /// Output of the last aggregation task, else a listing of every task.
    fn final_result(&self, workflow: &Workflow) -> serde_json::Value {
        let aggregated = workflow
            .tasks
            .iter()
            .rev()
            .find(|t| self.registry.role_of(&t.task_type) == Some(JobRole::Aggregation))
            .and_then(|t| t.output.clone());

        aggregated.unwrap_or_else(|| {
            let tasks: Vec<ReportTask> = workflow.tasks.iter().map(ReportTask::from).collect();
            serde_json::json!({
                "workflowId": workflow.workflow_id(),
                "tasks": tasks,
            })
        })
    }
}
