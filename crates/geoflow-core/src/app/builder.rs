//! EngineBuilder: wire store, jobs and scheduler settings into an `Engine`.
//!
//! Fail-fast: `expect_task_types` declares the task types the deployment's
//! workflow definitions use, and `build()` refuses to start when one of them
//! has no registered job.

use std::sync::Arc;

use crate::domain::TaskType;
use crate::jobs::{Job, JobRegistry, PolygonAreaJob, RegistryError, ReportGenerationJob};
use crate::ports::{Clock, Repository, SystemClock};

use super::factory::WorkflowFactory;
use super::scheduler::{Scheduler, SchedulerConfig};
use super::status::StatusService;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing task types: {0:?}; these were expected but have no registered job")]
    MissingTaskTypes(Vec<TaskType>),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// # Example
/// ```ignore
/// let engine = EngineBuilder::new(store)
///     .with_builtin_jobs()?
///     .expect_task_types(&["polygonArea", "reportGeneration"])
///     .scheduler_config(SchedulerConfig::default())
///     .build()?;
/// ```
pub struct EngineBuilder {
    store: Arc<dyn Repository>,
    registry: JobRegistry,
    config: SchedulerConfig,
    clock: Arc<dyn Clock>,
    expected: Option<Vec<TaskType>>,
}

impl EngineBuilder {
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self {
            store,
            registry: JobRegistry::new(),
            config: SchedulerConfig::default(),
            clock: Arc::new(SystemClock),
            expected: None,
        }
    }

    pub fn register(
        mut self,
        task_type: impl Into<TaskType>,
        job: Arc<dyn Job>,
    ) -> Result<Self, BuildError> {
        self.registry.register(task_type, job)?;
        Ok(self)
    }

    /// Register `polygonArea` and `reportGeneration`.
    pub fn with_builtin_jobs(self) -> Result<Self, BuildError> {
        let report = Arc::new(ReportGenerationJob::new(self.store.clone()));
        self.register(PolygonAreaJob::TASK_TYPE, Arc::new(PolygonAreaJob))?
            .register(ReportGenerationJob::TASK_TYPE, report)
    }

    pub fn expect_task_types(mut self, task_types: &[&str]) -> Self {
        self.expected = Some(task_types.iter().map(|t| TaskType::new(*t)).collect());
        self
    }

    pub fn scheduler_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<Engine, BuildError> {
        if let Some(expected) = &self.expected {
            let missing: Vec<TaskType> = expected
                .iter()
                .filter(|t| !self.registry.contains(t))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingTaskTypes(missing));
            }
        }

        let registry = Arc::new(self.registry);
        let factory = WorkflowFactory::new(self.store.clone(), registry.clone());
        let scheduler = Scheduler::with_clock(
            self.store.clone(),
            registry.clone(),
            self.config,
            self.clock,
        );
        tracing::debug!(jobs = registry.len(), "engine built");

        Ok(Engine {
            registry,
            factory,
            scheduler: Arc::new(scheduler),
        })
    }
}

/// A wired engine: graph builder, scheduler and status queries over one store.
pub struct Engine {
    registry: Arc<JobRegistry>,
    factory: WorkflowFactory,
    scheduler: Arc<Scheduler>,
}

impl Engine {
    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn factory(&self) -> &WorkflowFactory {
        &self.factory
    }

    pub fn scheduler(&self) -> Arc<Scheduler> {
        self.scheduler.clone()
    }

    pub fn status(&self) -> &StatusService {
        self.scheduler.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryRepository;
    use crate::jobs::JobRole;
    use crate::testing::StaticJob;

    fn store() -> Arc<dyn Repository> {
        Arc::new(InMemoryRepository::new())
    }

    #[test]
    fn build_with_builtin_jobs() {
        let engine = EngineBuilder::new(store())
            .with_builtin_jobs()
            .unwrap()
            .expect_task_types(&["polygonArea", "reportGeneration"])
            .build()
            .unwrap();

        let registry = engine.registry();
        assert_eq!(
            registry.registered_types(),
            vec![TaskType::new("polygonArea"), TaskType::new("reportGeneration")]
        );
        assert_eq!(registry.role_of(&TaskType::new("polygonArea")), Some(JobRole::Standard));
        assert_eq!(
            registry.role_of(&TaskType::new("reportGeneration")),
            Some(JobRole::Aggregation)
        );
        assert_eq!(registry.role_of(&TaskType::new("missing")), None);
    }

    #[test]
    fn build_reports_missing_task_types() {
        let result = EngineBuilder::new(store())
            .register("area", Arc::new(StaticJob::ok()))
            .unwrap()
            .expect_task_types(&["area", "analysis"])
            .build();
        assert!(matches!(
            result,
            Err(BuildError::MissingTaskTypes(missing)) if missing == vec![TaskType::new("analysis")]
        ));
    }

    #[test]
    fn duplicate_registration_surfaces_as_build_error() {
        let result = EngineBuilder::new(store())
            .with_builtin_jobs()
            .unwrap()
            .register("polygonArea", Arc::new(StaticJob::ok()));
        assert!(matches!(result, Err(BuildError::Registry(_))));
    }
}
