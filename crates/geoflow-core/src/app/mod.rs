//! App: combines ports and jobs into the engine's behavior.
//!
//! # Components
//! - **WorkflowFactory**: workflow definition -> persisted task graph
//! - **readiness**: barrier and dependency gates
//! - **TaskRunner**: execute one task and persist its outcome
//! - **Scheduler**: polling loop (`run_cycle`, `spawn`)
//! - **StatusService**: status/results queries, workflow status aggregation
//! - **EngineBuilder**: wiring with fail-fast task type checks

pub mod builder;
pub mod factory;
pub mod readiness;
pub mod runner;
pub mod scheduler;
pub mod status;

pub use self::builder::{BuildError, Engine, EngineBuilder};
pub use self::factory::WorkflowFactory;
pub use self::readiness::Readiness;
pub use self::runner::TaskRunner;
pub use self::scheduler::{CycleReport, Scheduler, SchedulerConfig, SchedulerHandle};
pub use self::status::{StatusService, WorkflowResults, WorkflowStatusView};
