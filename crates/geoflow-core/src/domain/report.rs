//! Report payloads produced by aggregation jobs.

use serde::{Deserialize, Serialize};

use super::ids::{TaskId, WorkflowId};
use super::state::TaskStatus;
use super::task::{TaskRecord, TaskType};

pub const ALL_SUCCEEDED_SUMMARY: &str =
    "All tasks completed successfully. Aggregated data is available.";
pub const SOME_FAILED_SUMMARY: &str = "Some tasks failed. Review the task outputs for details.";

/// One line of a report: a preceding task's final state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTask {
    pub task_id: TaskId,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub output: Option<serde_json::Value>,
    pub status: TaskStatus,
}

impl From<&TaskRecord> for ReportTask {
    fn from(task: &TaskRecord) -> Self {
        Self {
            task_id: task.task_id,
            task_type: task.task_type.clone(),
            output: task.output.clone(),
            status: task.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutput {
    pub workflow_id: WorkflowId,
    pub tasks: Vec<ReportTask>,
    pub final_report: String,
}

impl ReportOutput {
    /// Build a report over `tasks`; any Failed task flips the summary.
    pub fn summarize(workflow_id: WorkflowId, tasks: Vec<ReportTask>) -> Self {
        let has_failures = tasks.iter().any(|t| t.status == TaskStatus::Failed);
        let final_report = if has_failures {
            SOME_FAILED_SUMMARY
        } else {
            ALL_SUCCEEDED_SUMMARY
        };
        Self {
            workflow_id,
            tasks,
            final_report: final_report.to_string(),
        }
    }
}
