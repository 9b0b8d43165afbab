//! Domain model (ids, task/workflow records, states, definitions, outcomes).

pub mod definition;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod report;
pub mod state;
pub mod task;
pub mod workflow;

pub use definition::{WorkflowDefinition, WorkflowStep};
pub use errors::{EngineError, StoreError};
pub use ids::{TaskId, WorkflowId};
pub use outcome::{ErrorOutput, JobOutcome};
pub use report::{ReportOutput, ReportTask};
pub use state::{TaskStatus, WorkflowStatus};
pub use task::{NewTask, TaskRecord, TaskType};
pub use workflow::{NewWorkflow, Workflow, WorkflowRecord};
