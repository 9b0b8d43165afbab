//! Shared fixtures for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::{JobOutcome, TaskRecord};
use crate::jobs::{Job, JobRegistry, JobRole};

/// Returns a fixed outcome.
pub struct StaticJob {
    outcome: JobOutcome,
    role: JobRole,
}

impl StaticJob {
    pub fn ok() -> Self {
        Self {
            outcome: JobOutcome::completed(json!({ "ok": true })),
            role: JobRole::Standard,
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            outcome: JobOutcome::failed(error),
            role: JobRole::Standard,
        }
    }

    pub fn aggregation() -> Self {
        Self {
            role: JobRole::Aggregation,
            ..Self::ok()
        }
    }
}

#[async_trait]
impl Job for StaticJob {
    async fn execute(&self, _task: &TaskRecord) -> JobOutcome {
        self.outcome.clone()
    }

    fn role(&self) -> JobRole {
        self.role
    }
}

/// Completes with `{"run": n}`, n counting its own executions.
#[derive(Default)]
pub struct CountingJob {
    runs: AtomicUsize,
}

impl CountingJob {
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Job for CountingJob {
    async fn execute(&self, _task: &TaskRecord) -> JobOutcome {
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        JobOutcome::completed(json!({ "run": run }))
    }
}

pub struct PanicJob;

#[async_trait]
impl Job for PanicJob {
    async fn execute(&self, _task: &TaskRecord) -> JobOutcome {
        panic!("geometry exploded");
    }
}

/// Sleeps far longer than any test deadline.
pub struct HangingJob;

#[async_trait]
impl Job for HangingJob {
    async fn execute(&self, _task: &TaskRecord) -> JobOutcome {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        JobOutcome::completed(json!({}))
    }
}

/// Registry with a `StaticJob::ok()` for every name, plus `report` as aggregation.
pub fn registry_with(task_types: &[&str]) -> JobRegistry {
    let mut registry = JobRegistry::new();
    for task_type in task_types {
        let job: Arc<dyn Job> = if *task_type == "report" {
            Arc::new(StaticJob::aggregation())
        } else {
            Arc::new(StaticJob::ok())
        };
        registry
            .register(*task_type, job)
            .expect("unique task types");
    }
    registry
}
