//! TaskRunner: resolve the job, execute it, persist the outcome.
//!
//! No business logic lives here. Whatever happens inside the job ends up as
//! a terminal task status:
//! - `JobOutcome::Failed` -> Failed, output `{"error": ...}`
//! - panic -> Failed, `"job panicked: ..."`
//! - deadline exceeded -> Failed, `"job timed out after ...ms"`

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{EngineError, JobOutcome, StoreError, TaskRecord};
use crate::jobs::{Job, JobRegistry};
use crate::ports::{Clock, Repository, SystemClock};

pub struct TaskRunner {
    store: Arc<dyn Repository>,
    registry: Arc<JobRegistry>,
    clock: Arc<dyn Clock>,
    timeout: Option<Duration>,
}

impl TaskRunner {
    pub fn new(store: Arc<dyn Repository>, registry: Arc<JobRegistry>) -> Self {
        Self {
            store,
            registry,
            clock: Arc::new(SystemClock),
            timeout: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Per-task execution deadline. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Execute `task` and persist its terminal state.
    ///
    /// Returns the saved record. An unregistered task type is persisted as
    /// Failed and reported as `UnknownTaskType`. A task that is terminal,
    /// in `task` or in the store, is refused with `TaskAlreadyTerminal`
    /// before the job is invoked.
    pub async fn run(&self, mut task: TaskRecord) -> Result<TaskRecord, EngineError> {
        let current = self
            .store
            .find_task(task.task_id)
            .await?
            .ok_or(StoreError::TaskNotFound(task.task_id))?;
        if task.is_terminal() || current.is_terminal() {
            return Err(EngineError::TaskAlreadyTerminal(task.task_id));
        }

        let Some(job) = self.registry.get(&task.task_type) else {
            let err = EngineError::UnknownTaskType(task.task_type.clone());
            task.record_outcome(JobOutcome::failed(err.to_string()), self.clock.now())?;
            self.store.save_task(&task).await?;
            return Err(err);
        };

        tracing::info!(
            task_id = %task.task_id,
            task_type = %task.task_type,
            step = task.step_number,
            "running task"
        );

        let outcome = self.invoke(job, &task).await;
        if let JobOutcome::Failed { error } = &outcome {
            tracing::warn!(task_id = %task.task_id, error = %error, "task failed");
        }

        task.record_outcome(outcome, self.clock.now())?;
        self.store.save_task(&task).await?;

        tracing::info!(task_id = %task.task_id, status = %task.status, "task finished");
        Ok(task)
    }

    async fn invoke(&self, job: Arc<dyn Job>, task: &TaskRecord) -> JobOutcome {
        let owned = task.clone();
        let mut handle = tokio::spawn(async move { job.execute(&owned).await });

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    handle.abort();
                    return JobOutcome::failed(format!(
                        "job timed out after {}ms",
                        limit.as_millis()
                    ));
                }
            },
            None => handle.await,
        };

        match joined {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => {
                JobOutcome::failed(format!("job panicked: {}", panic_message(e.into_panic())))
            }
            Err(e) => JobOutcome::failed(format!("job was cancelled: {e}")),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
