//! JobRegistry: task type -> job implementation.
//!
//! Built once during initialization, then shared read-only (`Arc<JobRegistry>`)
//! by the graph builder, runner and scheduler. No locks needed.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::TaskType;

use super::job::{Job, JobRole};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("job for task type '{0}' is already registered")]
    AlreadyRegistered(TaskType),
}

#[derive(Default)]
pub struct JobRegistry {
    jobs: HashMap<TaskType, Arc<dyn Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        task_type: impl Into<TaskType>,
        job: Arc<dyn Job>,
    ) -> Result<(), RegistryError> {
        let task_type = task_type.into();
        if self.jobs.contains_key(&task_type) {
            return Err(RegistryError::AlreadyRegistered(task_type));
        }
        self.jobs.insert(task_type, job);
        Ok(())
    }

    pub fn get(&self, task_type: &TaskType) -> Option<Arc<dyn Job>> {
        self.jobs.get(task_type).cloned()
    }

    pub fn contains(&self, task_type: &TaskType) -> bool {
        self.jobs.contains_key(task_type)
    }

    pub fn role_of(&self, task_type: &TaskType) -> Option<JobRole> {
        self.jobs.get(task_type).map(|job| job.role())
    }

    /// Registered task types, sorted.
    pub fn registered_types(&self) -> Vec<TaskType> {
        let mut types: Vec<TaskType> = self.jobs.keys().cloned().collect();
        types.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        types
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
