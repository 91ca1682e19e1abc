//! End-to-end runs of the built-in pipeline against files on disk.

use std::fs;

use serde_json::{Value, json};
use sluice_config::load_config_file;
use sluice_pipeline::{WorkflowKind, WorkflowRegistry, WorkflowState, WorkflowStatus};
use tempfile::TempDir;

fn read_lines(path: &std::path::Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_usage_from_jsonl_file_to_file_sink() {
    let dir = TempDir::new().unwrap();
    let queries = dir.path().join("queries.jsonl");
    let output = dir.path().join("usage.jsonl");
    fs::write(
        &queries,
        [
            r#"{"table": "orders", "user": "ana"}"#,
            r#"{"tables": ["orders", "customers"], "user": "bo"}"#,
            "",
            r#"{"table": "orders", "user": "ana"}"#,
        ]
        .join("\n"),
    )
    .unwrap();

    let config = dir.path().join("usage.yaml");
    fs::write(
        &config,
        format!(
            r#"
source:
  type: file
  serviceName: warehouse
  serviceConnection:
    config:
      path: {}
  sourceConfig:
    config:
      type: DatabaseUsage
sink:
  type: file
  config:
    path: {}
"#,
            queries.display(),
            output.display()
        ),
    )
    .unwrap();

    let document = load_config_file(&config).unwrap();
    let registry = WorkflowRegistry::builtin();
    let mut workflow = registry.create(WorkflowKind::Usage, &document).unwrap();

    workflow.execute().await.unwrap();
    workflow.stop().await;
    assert_eq!(workflow.state(), WorkflowState::Stopped);
    assert_eq!(workflow.status(), Some(WorkflowStatus::Success));
    workflow.raise_from_status().unwrap();

    let rows = read_lines(&output);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["table"], "customers");
    assert_eq!(rows[1]["table"], "orders");
    assert_eq!(rows[1]["queryCount"], 3);
    assert_eq!(rows[1]["users"], json!(["ana", "bo"]));
}

#[tokio::test]
async fn test_unparseable_source_file_is_a_failure_status() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("tables.json");
    fs::write(&source, "{ not json").unwrap();

    let document = sluice_config::ConfigDocument::from_value(json!({
        "source": {
            "type": "file",
            "serviceName": "warehouse",
            "serviceConnection": {"config": {"path": source}},
            "sourceConfig": {"config": {"type": "DatabaseMetadata"}}
        },
        "sink": {"type": "null"}
    }))
    .unwrap();

    let mut workflow = WorkflowRegistry::builtin()
        .create(WorkflowKind::Metadata, &document)
        .unwrap();
    workflow.execute().await.unwrap();
    workflow.stop().await;

    assert_eq!(workflow.status(), Some(WorkflowStatus::Failure));
    let err = workflow.raise_from_status().unwrap_err();
    assert!(err.reason.contains("source (1 failures)"), "{}", err.reason);
}

#[tokio::test]
async fn test_test_suite_reports_each_case() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("results.jsonl");
    let document = sluice_config::ConfigDocument::from_value(json!({
        "source": {
            "type": "inline",
            "serviceName": "crm",
            "serviceConnection": {"config": {"records": [
                {"id": 1, "age": 34},
                {"id": 2, "age": null},
                {"id": 2, "age": 140}
            ]}},
            "sourceConfig": {"config": {
                "type": "TestSuite",
                "testCases": [
                    {"name": "id_unique", "column": "id", "testType": "columnValuesToBeUnique"},
                    {"name": "age_range", "column": "age", "testType": "columnValuesToBeBetween",
                     "minValue": 0, "maxValue": 130}
                ]
            }}
        },
        "sink": {"type": "file", "config": {"path": output}}
    }))
    .unwrap();

    let mut workflow = WorkflowRegistry::builtin()
        .create(WorkflowKind::TestSuite, &document)
        .unwrap();
    workflow.execute().await.unwrap();
    workflow.stop().await;
    assert_eq!(workflow.status(), Some(WorkflowStatus::Success));

    let results = read_lines(&output);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["testCase"], "id_unique");
    assert_eq!(results[0]["result"], "Failed");
    assert_eq!(results[0]["failedRows"], 1);
    assert_eq!(results[1]["testCase"], "age_range");
    assert_eq!(results[1]["failedRows"], 1);
    assert_eq!(results[1]["rowCount"], 3);
}
