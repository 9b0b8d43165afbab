mod cli;
mod logging;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;

use geoflow_core::app::{Engine, EngineBuilder, SchedulerConfig, WorkflowResults, WorkflowStatusView};
use geoflow_core::config::{EngineConfig, default_config_path};
use geoflow_core::domain::{TaskRecord, WorkflowDefinition, WorkflowStatus};
use geoflow_core::impls::InMemoryRepository;

use crate::cli::{CliArgs, Command, RunArgs, ValidateArgs};

/// Printed to stdout after `run`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary {
    cycles: usize,
    status: WorkflowStatusView,
    results: Option<WorkflowResults>,
    tasks: Vec<TaskRecord>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let config = EngineConfig::load_or_default(&config_path)
        .with_context(|| format!("loading config from {config_path:?}"))?;

    logging::init_logging(args.log_level, &config.logging.level)?;
    tracing::debug!(?config_path, ?config, "configuration loaded");

    match args.command {
        Command::Run(run) => run_workflow(run, &config).await,
        Command::Validate(validate) => validate_definition(validate),
    }
}

fn build_engine(config: &EngineConfig) -> Result<Engine> {
    let store = Arc::new(InMemoryRepository::new());
    let engine = EngineBuilder::new(store)
        .with_builtin_jobs()?
        .scheduler_config(SchedulerConfig::from(&config.scheduler))
        .build()?;
    Ok(engine)
}

async fn run_workflow(args: RunArgs, config: &EngineConfig) -> Result<()> {
    let engine = build_engine(config)?;

    let payload_text = std::fs::read_to_string(&args.payload)
        .with_context(|| format!("reading payload from {:?}", args.payload))?;
    let payload: serde_json::Value = serde_json::from_str(&payload_text)
        .with_context(|| format!("parsing payload JSON from {:?}", args.payload))?;

    let workflow = engine
        .factory()
        .create_workflow_from_file(&args.definition, &args.client_id, payload)
        .await
        .with_context(|| format!("creating workflow from {:?}", args.definition))?;
    let workflow_id = workflow.workflow_id();

    let scheduler = engine.scheduler();
    let mut cycles = 0;
    let mut status = engine.status().workflow_status(workflow_id).await?;
    while cycles < args.max_cycles && !status.status.is_terminal() {
        let report = scheduler.run_cycle().await;
        cycles += 1;
        status = engine.status().workflow_status(workflow_id).await?;

        if report.executed == 0 && report.errors == 0 {
            tracing::warn!(
                %workflow_id,
                waiting = report.waiting,
                "no task could run; remaining tasks are blocked"
            );
            break;
        }
    }

    let results = match status.status {
        WorkflowStatus::Completed => Some(engine.status().workflow_results(workflow_id).await?),
        _ => None,
    };
    let tasks = engine.status().load_workflow(workflow_id).await?.tasks;
    let final_status = status.status;

    let summary = RunSummary {
        cycles,
        status,
        results,
        tasks,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if final_status != WorkflowStatus::Completed {
        bail!("workflow {workflow_id} finished with status {final_status}");
    }
    Ok(())
}

fn validate_definition(args: ValidateArgs) -> Result<()> {
    let definition = WorkflowDefinition::load_from_path(&args.definition)
        .with_context(|| format!("loading definition from {:?}", args.definition))?;

    // registered task types are part of validity
    let engine = build_engine(&EngineConfig::default())?;
    engine.factory().check(&definition)?;

    let (prerequisites, dependents) = definition.partition();
    println!(
        "definition {:?} is valid: {} steps ({} prerequisite, {} dependent)",
        definition.name,
        definition.steps.len(),
        prerequisites.len(),
        dependents.len()
    );
    Ok(())
}
