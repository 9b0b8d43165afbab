//! Job outcome: the only thing a job hands back to the runner.
//!
//! A job never returns an error. Whatever goes wrong inside it is folded into
//! `JobOutcome::Failed`, which the runner persists as `{"error": "..."}`.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::state::TaskStatus;

/// Result of one job execution.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// The job succeeded and produced `output`.
    Completed(serde_json::Value),

    /// The job failed; `error` is a human-readable message.
    Failed { error: String },
}

/// Output payload written for a failed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorOutput {
    pub error: String,
}

impl JobOutcome {
    pub fn completed(output: serde_json::Value) -> Self {
        JobOutcome::Completed(output)
    }

    pub fn failed(error: impl Into<String>) -> Self {
        JobOutcome::Failed {
            error: error.into(),
        }
    }

    /// Fold a fallible job body into an outcome.
    pub fn from_result<E: Display>(result: Result<serde_json::Value, E>) -> Self {
        match result {
            Ok(output) => JobOutcome::Completed(output),
            Err(e) => JobOutcome::failed(e.to_string()),
        }
    }

    /// Terminal status this outcome maps to.
    pub fn status(&self) -> TaskStatus {
        match self {
            JobOutcome::Completed(_) => TaskStatus::Completed,
            JobOutcome::Failed { .. } => TaskStatus::Failed,
        }
    }

    /// Serialized output to store on the task.
    pub fn into_output(self) -> serde_json::Value {
        match self {
            JobOutcome::Completed(output) => output,
            JobOutcome::Failed { error } => serde_json::json!({ "error": error }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failed_outcome_serializes_as_error_object() {
        let outcome = JobOutcome::failed("boom");
        assert_eq!(outcome.status(), TaskStatus::Failed);

        let output = outcome.into_output();
        assert_eq!(output, json!({ "error": "boom" }));

        let parsed: ErrorOutput = serde_json::from_value(output).unwrap();
        assert_eq!(parsed.error, "boom");
    }

    #[test]
    fn from_result_maps_err_to_failed() {
        let result: Result<serde_json::Value, String> = Err("bad geometry".to_string());
        let outcome = JobOutcome::from_result(result);
        assert_eq!(outcome, JobOutcome::failed("bad geometry"));
    }

    #[test]
    fn completed_outcome_keeps_output() {
        let outcome = JobOutcome::from_result::<String>(Ok(json!({ "area": 1.0 })));
        assert_eq!(outcome.status(), TaskStatus::Completed);
        assert_eq!(outcome.into_output(), json!({ "area": 1.0 }));
    }
}
