//! Readiness gates, evaluated on a queued task right before it would run.
//!
//! - **Barrier gate** (aggregation jobs only): every other task of the
//!   workflow with a smaller `step_number` is terminal. Failed counts as
//!   terminal, so a failure upstream does not block a report.
//! - **Dependency gate**: no `depends_on`, or the dependency is Completed.
//!   A Failed dependency never becomes Completed, so its dependent stays
//!   queued for good.
//!
//! A task that is not ready is left untouched and looked at again next cycle.

use crate::domain::{StoreError, TaskId, TaskRecord, TaskStatus};
use crate::jobs::JobRole;
use crate::ports::{Repository, TaskQuery};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,

    /// Earlier steps still running or queued.
    WaitingOnBarrier { pending: Vec<TaskId> },

    /// Dependency not Completed. `status` is `None` when it is missing.
    WaitingOnDependency {
        dependency: TaskId,
        status: Option<TaskStatus>,
    },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

pub fn barrier_gate(task: &TaskRecord, workflow_tasks: &[TaskRecord]) -> Readiness {
    let pending: Vec<TaskId> = workflow_tasks
        .iter()
        .filter(|t| t.task_id != task.task_id)
        .filter(|t| t.step_number < task.step_number && !t.is_terminal())
        .map(|t| t.task_id)
        .collect();

    if pending.is_empty() {
        Readiness::Ready
    } else {
        Readiness::WaitingOnBarrier { pending }
    }
}

/// `dependency` is the current record of `task.depends_on`, if it exists.
pub fn dependency_gate(task: &TaskRecord, dependency: Option<&TaskRecord>) -> Readiness {
    let Some(dependency_id) = task.depends_on else {
        return Readiness::Ready;
    };
    match dependency.map(|d| d.status) {
        Some(TaskStatus::Completed) => Readiness::Ready,
        status => Readiness::WaitingOnDependency {
            dependency: dependency_id,
            status,
        },
    }
}

/// Apply every gate that applies to `task`, reading current state from the store.
pub async fn evaluate(
    task: &TaskRecord,
    role: JobRole,
    store: &dyn Repository,
) -> Result<Readiness, StoreError> {
    if let Some(dependency_id) = task.depends_on {
        let dependency = store.find_task(dependency_id).await?;
        let readiness = dependency_gate(task, dependency.as_ref());
        if !readiness.is_ready() {
            return Ok(readiness);
        }
    }

    if role == JobRole::Aggregation {
        let siblings = store
            .find_tasks(TaskQuery::in_workflow(task.workflow_id))
            .await?;
        return Ok(barrier_gate(task, &siblings));
    }

    Ok(Readiness::Ready)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JobOutcome, NewTask, NewWorkflow, TaskType, WorkflowId};
    use crate::impls::InMemoryRepository;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;
    use ulid::Ulid;

    fn task(step: u32, status: TaskStatus) -> TaskRecord {
        let new = NewTask::new(
            WorkflowId::from_ulid(Ulid::nil()),
            "client-1",
            TaskType::new("step"),
            step,
            json!({}),
        );
        let mut record = TaskRecord::from_new(TaskId::from_ulid(Ulid::new()), new, Utc::now());
        record.status = status;
        record
    }

    #[rstest]
    #[case::failed_does_not_block(TaskStatus::Completed, TaskStatus::Failed, true)]
    #[case::all_completed(TaskStatus::Completed, TaskStatus::Completed, true)]
    #[case::queued_blocks(TaskStatus::Completed, TaskStatus::Queued, false)]
    #[case::running_blocks(TaskStatus::Running, TaskStatus::Completed, false)]
    fn barrier(#[case] first: TaskStatus, #[case] second: TaskStatus, #[case] ready: bool) {
        let tasks = vec![
            task(1, first),
            task(2, second),
            task(3, TaskStatus::Queued),
        ];
        let report = &tasks[2];

        assert_eq!(barrier_gate(report, &tasks).is_ready(), ready);
    }

    #[test]
    fn barrier_ignores_later_and_equal_steps() {
        let tasks = vec![
            task(2, TaskStatus::Queued),
            task(2, TaskStatus::Queued),
            task(5, TaskStatus::Queued),
        ];
        assert_eq!(barrier_gate(&tasks[0], &tasks), Readiness::Ready);
    }

    #[test]
    fn barrier_lists_pending_steps() {
        let tasks = vec![task(1, TaskStatus::Running), task(2, TaskStatus::Queued)];
        let pending_id = tasks[0].task_id;
        assert_eq!(
            barrier_gate(&tasks[1], &tasks),
            Readiness::WaitingOnBarrier {
                pending: vec![pending_id]
            }
        );
    }

    #[rstest]
    #[case::completed(TaskStatus::Completed, true)]
    #[case::queued(TaskStatus::Queued, false)]
    #[case::running(TaskStatus::Running, false)]
    #[case::failed(TaskStatus::Failed, false)]
    fn dependency(#[case] status: TaskStatus, #[case] ready: bool) {
        let dep = task(1, status);
        let mut dependent = task(2, TaskStatus::Queued);
        dependent.depends_on = Some(dep.task_id);

        assert_eq!(dependency_gate(&dependent, Some(&dep)).is_ready(), ready);
    }

    #[test]
    fn no_dependency_is_ready_and_missing_dependency_is_not() {
        let mut t = task(1, TaskStatus::Queued);
        assert_eq!(dependency_gate(&t, None), Readiness::Ready);

        let ghost = TaskId::from_ulid(Ulid::new());
        t.depends_on = Some(ghost);
        assert_eq!(
            dependency_gate(&t, None),
            Readiness::WaitingOnDependency {
                dependency: ghost,
                status: None
            }
        );
    }

    #[tokio::test]
    async fn evaluate_reads_current_store_state() {
        let store = InMemoryRepository::new();
        let wf = store
            .save_workflow(NewWorkflow::new("client-1", "gates"))
            .await
            .unwrap()
            .workflow_id;
        let first = store
            .save_tasks(vec![NewTask::new(wf, "client-1", TaskType::new("area"), 1, json!({}))])
            .await
            .unwrap()
            .remove(0);
        let report = store
            .save_tasks(vec![
                NewTask::new(wf, "client-1", TaskType::new("report"), 2, json!({}))
                    .with_dependency(first.task_id),
            ])
            .await
            .unwrap()
            .remove(0);

        let before = evaluate(&report, JobRole::Aggregation, &store).await.unwrap();
        assert_eq!(
            before,
            Readiness::WaitingOnDependency {
                dependency: first.task_id,
                status: Some(TaskStatus::Queued)
            }
        );

        let mut done = first.clone();
        done.record_outcome(JobOutcome::failed("bad geometry"), Utc::now())
            .unwrap();
        store.save_task(&done).await.unwrap();

        // barrier alone would pass, the failed dependency still blocks
        let after = evaluate(&report, JobRole::Aggregation, &store).await.unwrap();
        assert_eq!(
            after,
            Readiness::WaitingOnDependency {
                dependency: first.task_id,
                status: Some(TaskStatus::Failed)
            }
        );
        let mut no_dep = report.clone();
        no_dep.depends_on = None;
        assert!(
            evaluate(&no_dep, JobRole::Aggregation, &store)
                .await
                .unwrap()
                .is_ready()
        );
    }
}
