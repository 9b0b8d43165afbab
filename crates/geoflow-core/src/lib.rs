//! geoflow-core
//!
//! Workflow orchestration: declarative step lists become persisted task
//! graphs, which a polling scheduler drives through their lifecycle.
//!
//! # Modules
//! - **domain**: ids, task/workflow records and states, definitions, outcomes, errors
//! - **ports**: Repository, Clock, IdGenerator
//! - **jobs**: Job trait, JobRegistry, built-in jobs (polygon area, report)
//! - **app**: graph builder, readiness gates, runner, scheduler, status queries
//! - **impls**: InMemoryRepository
//! - **config**: TOML engine configuration

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod jobs;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;
