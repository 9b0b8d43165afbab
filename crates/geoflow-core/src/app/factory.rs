//! WorkflowFactory: workflow definition -> persisted task graph.
//!
//! Two-phase save:
//! 1. prerequisite steps (named by some `dependsOn`) are saved first, so each
//!    gets a stable identity;
//! 2. dependent steps resolve `dependsOn` against those saved tasks by
//!    `taskType` and are saved as one batch.
//!
//! Only two levels are supported; `WorkflowDefinition::validate` rejects a
//! step that is both a prerequisite and dependent.
//!
//! Phase 1 is committed before phase 2 is attempted. If a dependency cannot
//! be resolved the prerequisite rows stay behind.

use std::path::Path;
use std::sync::Arc;

use crate::domain::{
    EngineError, NewTask, NewWorkflow, TaskRecord, Workflow, WorkflowDefinition, WorkflowId,
    WorkflowStep,
};
use crate::jobs::JobRegistry;
use crate::ports::Repository;

pub struct WorkflowFactory {
    store: Arc<dyn Repository>,
    registry: Arc<JobRegistry>,
}

impl WorkflowFactory {
    pub fn new(store: Arc<dyn Repository>, registry: Arc<JobRegistry>) -> Self {
        Self { store, registry }
    }

    /// Build and persist a workflow. `payload` is shared by every task.
    pub async fn create_workflow(
        &self,
        definition: &WorkflowDefinition,
        client_id: &str,
        payload: serde_json::Value,
    ) -> Result<Workflow, EngineError> {
        self.check(definition)?;

        let record = self
            .store
            .save_workflow(NewWorkflow::new(client_id, &definition.name))
            .await?;
        let workflow_id = record.workflow_id;

        let (prerequisites, dependents) = definition.partition();

        let drafts = prerequisites
            .iter()
            .map(|step| draft(workflow_id, client_id, step, &payload))
            .collect();
        let saved = self.store.save_tasks(drafts).await?;

        let mut dependent_drafts = Vec::with_capacity(dependents.len());
        for step in dependents {
            let mut task = draft(workflow_id, client_id, step, &payload);
            if let Some(dependency) = &step.depends_on {
                let target = resolve(&saved, dependency).ok_or_else(|| {
                    tracing::warn!(
                        %workflow_id,
                        dependency = %dependency,
                        step = %step.task_type,
                        persisted = saved.len(),
                        "unresolved dependency; prerequisite tasks were already persisted"
                    );
                    EngineError::UnresolvedDependency {
                        dependency: dependency.clone(),
                        step: step.task_type.to_string(),
                    }
                })?;
                task = task.with_dependency(target.task_id);
            }
            dependent_drafts.push(task);
        }
        let saved_dependents = self.store.save_tasks(dependent_drafts).await?;

        let mut tasks = saved;
        tasks.extend(saved_dependents);

        tracing::info!(
            %workflow_id,
            name = %definition.name,
            client_id,
            tasks = tasks.len(),
            "workflow created"
        );
        Ok(Workflow::new(record, tasks))
    }

    /// Load a YAML definition from disk and build it.
    pub async fn create_workflow_from_file(
        &self,
        path: impl AsRef<Path>,
        client_id: &str,
        payload: serde_json::Value,
    ) -> Result<Workflow, EngineError> {
        let definition = WorkflowDefinition::load_from_path(path)?;
        self.create_workflow(&definition, client_id, payload).await
    }

    /// Checks that need no store writes: structure and registered task types.
    pub fn check(&self, definition: &WorkflowDefinition) -> Result<(), EngineError> {
        definition.validate()?;
        if let Some(step) = definition
            .steps
            .iter()
            .find(|s| !self.registry.contains(&s.task_type))
        {
            return Err(EngineError::UnknownTaskType(step.task_type.clone()));
        }
        Ok(())
    }
}

fn draft(
    workflow_id: WorkflowId,
    client_id: &str,
    step: &WorkflowStep,
    payload: &serde_json::Value,
) -> NewTask {
    NewTask::new(
        workflow_id,
        client_id,
        step.task_type.clone(),
        step.step_number,
        payload.clone(),
    )
}

fn resolve<'a>(saved: &'a [TaskRecord], task_type: &str) -> Option<&'a TaskRecord> {
    saved.iter().find(|t| t.task_type.as_str() == task_type)
}
