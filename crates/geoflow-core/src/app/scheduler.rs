//! Scheduler: the polling loop that drives queued tasks.
//!
//! One cycle:
//! 1. fetch every Queued task, ascending `step_number`, across workflows
//! 2. evaluate readiness; a waiting task is skipped (stays Queued)
//! 3. claim (Queued -> Running, compare-and-swap); a lost claim is skipped
//! 4. hand the dependency's output down as `input`, run the task
//! 5. refresh the owning workflow's status
//!
//! Errors are logged and counted; a cycle never aborts the loop. A task
//! that errors after its claim is persisted Failed rather than left Running.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::{EngineError, JobOutcome, TaskId, TaskRecord, TaskStatus};
use crate::jobs::JobRegistry;
use crate::ports::{Clock, Repository, SystemClock, TaskQuery};

use super::readiness::{self, Readiness};
use super::runner::TaskRunner;
use super::status::StatusService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Pause between cycles.
    pub poll_interval: Duration,
    /// Pause after each executed task.
    pub task_pause: Duration,
    /// Per-task execution deadline.
    pub execution_timeout: Option<Duration>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            task_pause: Duration::ZERO,
            execution_timeout: Some(Duration::from_secs(300)),
        }
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Queued tasks looked at.
    pub examined: usize,
    /// Tasks run to a terminal state.
    pub executed: usize,
    /// Tasks left queued by a readiness gate.
    pub waiting: usize,
    /// Errors caught and logged.
    pub errors: usize,
}

enum Step {
    Executed,
    Waiting(Readiness),
    ClaimLost,
}

pub struct Scheduler {
    store: Arc<dyn Repository>,
    registry: Arc<JobRegistry>,
    runner: TaskRunner,
    status: StatusService,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn Repository>,
        registry: Arc<JobRegistry>,
        config: SchedulerConfig,
    ) -> Self {
        Self::with_clock(store, registry, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn Repository>,
        registry: Arc<JobRegistry>,
        config: SchedulerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let runner = TaskRunner::new(store.clone(), registry.clone())
            .with_clock(clock.clone())
            .with_timeout(config.execution_timeout);
        let status = StatusService::new(store.clone(), registry.clone()).with_clock(clock.clone());
        Self {
            store,
            registry,
            runner,
            status,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn status(&self) -> &StatusService {
        &self.status
    }

    /// Run one pass over the queued tasks.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        let queued = match self.store.find_tasks(TaskQuery::queued()).await {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch queued tasks");
                report.errors += 1;
                return report;
            }
        };

        for task in queued {
            report.examined += 1;
            let task_id = task.task_id;
            match self.process(task).await {
                Ok(Step::Executed) => {
                    report.executed += 1;
                    self.pause_between_tasks().await;
                }
                Ok(Step::Waiting(readiness)) => {
                    tracing::debug!(%task_id, ?readiness, "task not ready, leaving it queued");
                    report.waiting += 1;
                }
                Ok(Step::ClaimLost) => {
                    tracing::debug!(%task_id, "task claimed elsewhere, skipping");
                }
                Err(e) => {
                    tracing::error!(%task_id, error = %e, "task execution failed");
                    report.errors += 1;
                    self.pause_between_tasks().await;
                }
            }
        }

        report
    }

    async fn process(&self, task: TaskRecord) -> Result<Step, EngineError> {
        let role = self.registry.role_of(&task.task_type).unwrap_or_default();
        let readiness = readiness::evaluate(&task, role, self.store.as_ref()).await?;
        if !readiness.is_ready() {
            return Ok(Step::Waiting(readiness));
        }

        let Some(claimed) = self.store.claim(task.task_id).await? else {
            return Ok(Step::ClaimLost);
        };

        let workflow_id = claimed.workflow_id;
        let task_id = claimed.task_id;
        let result = self.execute_claimed(claimed).await;
        if let Err(e) = &result {
            self.settle_claimed(task_id, e).await;
        }

        // refresh even when the runner failed: it may have persisted a Failed task
        if let Err(e) = self.status.refresh_workflow_status(workflow_id).await {
            tracing::warn!(%workflow_id, error = %e, "failed to refresh workflow status");
        }

        result.map(|_| Step::Executed)
    }

    async fn execute_claimed(&self, mut claimed: TaskRecord) -> Result<TaskRecord, EngineError> {
        if let Some(dependency_id) = claimed.depends_on {
            let input = self
                .store
                .find_task(dependency_id)
                .await?
                .and_then(|dependency| dependency.output);
            claimed.hand_down_input(input);
        }
        self.runner.run(claimed).await
    }

    /// A claimed task must not stay Running after an error: nothing would
    /// pick it up again. Best effort; a second failure is only logged.
    async fn settle_claimed(&self, task_id: TaskId, cause: &EngineError) {
        let mut task = match self.store.find_task(task_id).await {
            Ok(Some(task)) if task.status == TaskStatus::Running => task,
            Ok(_) => return,
            Err(e) => {
                tracing::error!(%task_id, error = %e, "could not reload claimed task");
                return;
            }
        };

        let outcome = JobOutcome::failed(cause.to_string());
        let saved = match task.record_outcome(outcome, self.clock.now()) {
            Ok(()) => self.store.save_task(&task).await.map_err(EngineError::from),
            Err(e) => Err(e),
        };
        match saved {
            Ok(()) => tracing::warn!(%task_id, error = %cause, "claimed task marked failed"),
            Err(e) => tracing::error!(%task_id, error = %e, "claimed task left running"),
        }
    }

    async fn pause_between_tasks(&self) {
        if !self.config.task_pause.is_zero() {
            tokio::time::sleep(self.config.task_pause).await;
        }
    }

    /// Run cycles in the background until shut down.
    pub fn spawn(self: Arc<Self>) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            self.run_until_shutdown(&mut shutdown_rx).await;
        });
        SchedulerHandle { shutdown_tx, join }
    }

    async fn run_until_shutdown(&self, shutdown_rx: &mut watch::Receiver<bool>) {
        tracing::info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "scheduler started"
        );

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let report = self.run_cycle().await;
            if report.executed > 0 || report.errors > 0 {
                tracing::info!(
                    examined = report.examined,
                    executed = report.executed,
                    waiting = report.waiting,
                    errors = report.errors,
                    "cycle finished"
                );
            } else {
                tracing::trace!(examined = report.examined, waiting = report.waiting, "idle cycle");
            }

            tokio::select! {
                changed = shutdown_rx.changed() => {
                    // sender dropped: nobody can stop us any more, so stop now
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        tracing::info!("scheduler stopped");
    }
}

/// Handle to a spawned scheduler.
/// - `shutdown()` stops it from starting another cycle
/// - an in-flight job is allowed to finish
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn shutdown(&self) {
        // receiver may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.shutdown();
        if let Err(e) = self.join.await {
            tracing::error!(error = %e, "scheduler task ended abnormally");
        }
    }
}
