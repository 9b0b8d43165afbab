use async_trait::async_trait;

use crate::domain::{JobOutcome, TaskRecord};

/// How the scheduler gates a job's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobRole {
    /// Runs once its point dependency (if any) is Completed.
    #[default]
    Standard,

    /// Also waits until every earlier step of the workflow is terminal.
    Aggregation,
}

/// A unit of work executed for one task.
///
/// `execute` cannot fail: anything that goes wrong is reported as
/// `JobOutcome::Failed`. The runner persists the outcome; the job never
/// writes task status itself.
///
/// # Example
/// ```ignore
/// struct EchoJob;
///
/// #[async_trait]
/// impl Job for EchoJob {
///     async fn execute(&self, task: &TaskRecord) -> JobOutcome {
///         JobOutcome::completed(task.payload.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait Job: Send + Sync {
    async fn execute(&self, task: &TaskRecord) -> JobOutcome;

    fn role(&self) -> JobRole {
        JobRole::Standard
    }
}
