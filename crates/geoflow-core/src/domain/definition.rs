//! Workflow definitions: the declarative input of the graph builder.
//!
//! The on-disk format is YAML:
//!
//! ```yaml
//! name: example_workflow
//! steps:
//!   - taskType: polygonArea
//!     stepNumber: 1
//!   - taskType: reportGeneration
//!     stepNumber: 2
//!     dependsOn: polygonArea
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::EngineError;
use super::task::TaskType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub steps: Vec<WorkflowStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    pub task_type: TaskType,
    pub step_number: u32,

    /// `taskType` of the step this one waits for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
}

impl WorkflowStep {
    pub fn new(task_type: impl Into<TaskType>, step_number: u32) -> Self {
        Self {
            task_type: task_type.into(),
            step_number,
            depends_on: None,
        }
    }

    pub fn depends_on(mut self, task_type: impl Into<String>) -> Self {
        self.depends_on = Some(task_type.into());
        self
    }
}

impl WorkflowDefinition {
    pub fn new(name: impl Into<String>, steps: Vec<WorkflowStep>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, EngineError> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Task types named as a `dependsOn` target by any step.
    pub fn prerequisite_types(&self) -> HashSet<&str> {
        self.steps
            .iter()
            .filter_map(|s| s.depends_on.as_deref())
            .collect()
    }

    /// Split steps into (prerequisites, dependents), keeping definition order.
    ///
    /// A prerequisite is any step whose `taskType` some step depends on;
    /// every other step is a dependent (with or without a `dependsOn`).
    pub fn partition(&self) -> (Vec<&WorkflowStep>, Vec<&WorkflowStep>) {
        let targets = self.prerequisite_types();
        self.steps
            .iter()
            .partition(|s| targets.contains(s.task_type.as_str()))
    }

    /// Structural checks that need no store and no registry.
    ///
    /// Unresolvable `dependsOn` names are not checked here; the graph builder
    /// reports them while wiring dependents.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.name.trim().is_empty() {
            return Err(EngineError::InvalidDefinition(
                "workflow name must not be empty".to_string(),
            ));
        }
        if self.steps.is_empty() {
            return Err(EngineError::InvalidDefinition(format!(
                "workflow {} must have at least one step",
                self.name
            )));
        }
        if let Some(step) = self.steps.iter().find(|s| s.step_number == 0) {
            return Err(EngineError::InvalidDefinition(format!(
                "step {} has stepNumber 0; step numbers start at 1",
                step.task_type
            )));
        }

        let targets = self.prerequisite_types();
        for step in &self.steps {
            if let Some(dependency) = &step.depends_on
                && targets.contains(step.task_type.as_str())
            {
                return Err(EngineError::NestedDependency {
                    step: step.task_type.to_string(),
                    dependency: dependency.clone(),
                });
            }
        }
        Ok(())
    }
}
