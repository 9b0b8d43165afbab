use std::sync::Arc;
use std::time::Duration;

use geoflow_core::app::{CycleReport, EngineBuilder, SchedulerConfig};
use geoflow_core::domain::report::{ALL_SUCCEEDED_SUMMARY, SOME_FAILED_SUMMARY};
use geoflow_core::domain::{EngineError, TaskStatus, WorkflowDefinition, WorkflowStatus};
use geoflow_core::impls::InMemoryRepository;
use geoflow_core::ports::Repository;
use serde_json::{Value, json};

const DEFINITION: &str = r#"
name: example_workflow
steps:
  - taskType: polygonArea
    stepNumber: 1
  - taskType: reportGeneration
    stepNumber: 2
    dependsOn: polygonArea
"#;

fn field_polygon() -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [-63.624885020050996, -10.311050368263523],
            [-63.624885020050996, -10.367865108370523],
            [-63.61278302732815, -10.367865108370523],
            [-63.61278302732815, -10.311050368263523],
            [-63.624885020050996, -10.311050368263523]
        ]]
    })
}

fn engine(store: Arc<InMemoryRepository>) -> geoflow_core::app::Engine {
    EngineBuilder::new(store)
        .with_builtin_jobs()
        .unwrap()
        .expect_task_types(&["polygonArea", "reportGeneration"])
        .scheduler_config(SchedulerConfig {
            poll_interval: Duration::from_millis(10),
            task_pause: Duration::ZERO,
            execution_timeout: Some(Duration::from_secs(5)),
        })
        .build()
        .unwrap()
}

#[tokio::test]
async fn area_then_report_completes_workflow() {
    let store = Arc::new(InMemoryRepository::new());
    let engine = engine(store.clone());
    let definition = WorkflowDefinition::from_yaml(DEFINITION).unwrap();

    let workflow = engine
        .factory()
        .create_workflow(&definition, "client-42", field_polygon())
        .await
        .unwrap();
    let area_id = workflow.tasks[0].task_id;
    let report_id = workflow.tasks[1].task_id;

    let cycle = engine.scheduler().run_cycle().await;
    assert_eq!(
        cycle,
        CycleReport { examined: 2, executed: 2, waiting: 0, errors: 0 }
    );

    let area = store.find_task(area_id).await.unwrap().unwrap();
    assert_eq!(area.status, TaskStatus::Completed);
    let output = area.output.clone().unwrap();
    assert_eq!(output["unit"], "square meters");
    assert!(output["area"].as_f64().unwrap() > 0.0);

    let report = store.find_task(report_id).await.unwrap().unwrap();
    assert_eq!(report.status, TaskStatus::Completed);
    assert_eq!(report.input, Some(output.clone()));
    let report_output = report.output.clone().unwrap();
    assert_eq!(report_output["finalReport"], ALL_SUCCEEDED_SUMMARY);
    assert_eq!(report_output["tasks"][0]["type"], "polygonArea");
    assert_eq!(report_output["tasks"][0]["output"], output);

    let status = engine.status().workflow_status(workflow.workflow_id()).await.unwrap();
    assert_eq!(status.status, WorkflowStatus::Completed);
    assert_eq!(status.completed_tasks, 2);
    assert_eq!(status.total_tasks, 2);

    let results = engine.status().workflow_results(workflow.workflow_id()).await.unwrap();
    assert_eq!(results.final_result, Some(report_output));
}

#[tokio::test]
async fn invalid_geometry_fails_area_and_blocks_report() {
    let store = Arc::new(InMemoryRepository::new());
    let engine = engine(store.clone());
    let definition = WorkflowDefinition::from_yaml(DEFINITION).unwrap();

    let workflow = engine
        .factory()
        .create_workflow(
            &definition,
            "client-42",
            json!({ "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 1.0]]] }),
        )
        .await
        .unwrap();
    let area_id = workflow.tasks[0].task_id;
    let report_id = workflow.tasks[1].task_id;

    let scheduler = engine.scheduler();
    scheduler.run_cycle().await;
    let second = scheduler.run_cycle().await;
    assert_eq!(
        second,
        CycleReport { examined: 1, executed: 0, waiting: 1, errors: 0 }
    );

    let area = store.find_task(area_id).await.unwrap().unwrap();
    assert_eq!(area.status, TaskStatus::Failed);
    let error = area.output.unwrap()["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Polygon coordinates"));

    let report = store.find_task(report_id).await.unwrap().unwrap();
    assert_eq!(report.status, TaskStatus::Queued);
    assert!(report.output.is_none());

    let err = engine
        .status()
        .workflow_results(workflow.workflow_id())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::WorkflowNotCompleted { status: WorkflowStatus::InProgress, .. }
    ));
}

#[tokio::test]
async fn report_without_point_dependency_summarizes_failure() {
    let store = Arc::new(InMemoryRepository::new());
    let engine = engine(store.clone());
    let definition = WorkflowDefinition::from_yaml(
        r#"
name: barrier_only
steps:
  - taskType: polygonArea
    stepNumber: 1
  - taskType: reportGeneration
    stepNumber: 2
"#,
    )
    .unwrap();

    let workflow = engine
        .factory()
        .create_workflow(&definition, "client-42", json!({ "type": "Circle" }))
        .await
        .unwrap();

    engine.scheduler().run_cycle().await;

    let record = engine.status().load_workflow(workflow.workflow_id()).await.unwrap();
    assert_eq!(record.record.status, WorkflowStatus::Failed);
    let report = &record.tasks[1];
    assert_eq!(report.status, TaskStatus::Completed);
    assert_eq!(report.output.as_ref().unwrap()["finalReport"], SOME_FAILED_SUMMARY);
    assert_eq!(
        record.record.final_result.as_ref().unwrap()["finalReport"],
        SOME_FAILED_SUMMARY
    );
}
