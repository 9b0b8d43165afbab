//! `reportGeneration`: summarize every earlier step of the workflow.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{JobOutcome, ReportOutput, ReportTask, StoreError, TaskRecord};
use crate::ports::{Repository, TaskQuery};

use super::job::{Job, JobRole};

#[derive(Debug, Error)]
enum ReportError {
    #[error("failed to load workflow tasks: {0}")]
    Store(#[from] StoreError),

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Aggregation job. The scheduler only runs it once every task with a
/// smaller step number is terminal, so the predecessors it reads are final.
pub struct ReportGenerationJob {
    store: Arc<dyn Repository>,
}

impl ReportGenerationJob {
    pub const TASK_TYPE: &'static str = "reportGeneration";

    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self { store }
    }

    async fn generate(&self, task: &TaskRecord) -> Result<serde_json::Value, ReportError> {
        let tasks = self
            .store
            .find_tasks(TaskQuery::in_workflow(task.workflow_id))
            .await?;
        let preceding: Vec<ReportTask> = tasks
            .iter()
            .filter(|t| t.step_number < task.step_number)
            .map(ReportTask::from)
            .collect();

        let report = ReportOutput::summarize(task.workflow_id, preceding);
        tracing::debug!(
            workflow_id = %task.workflow_id,
            tasks = report.tasks.len(),
            summary = %report.final_report,
            "report generated"
        );
        Ok(serde_json::to_value(report)?)
    }
}

#[async_trait]
impl Job for ReportGenerationJob {
    async fn execute(&self, task: &TaskRecord) -> JobOutcome {
        let result = self.generate(task).await;
        if let Err(e) = &result {
            tracing::error!(task_id = %task.task_id, error = %e, "report generation failed");
        }
        JobOutcome::from_result(result)
    }

    fn role(&self) -> JobRole {
        JobRole::Aggregation
    }
}
