//! Integration tests for loading workflow configuration files.

use std::fs;

use sluice_config::{ConfigError, WorkflowConfig, load_config_file};
use tempfile::TempDir;

#[test]
fn test_json_and_yaml_load_to_the_same_document() {
    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("lineage.json");
    let yaml_path = dir.path().join("lineage.yml");

    fs::write(
        &json_path,
        r#"{
  "source": {
    "type": "inline",
    "serviceName": "warehouse",
    "serviceConnection": {"config": {"records": [{"from": "a", "to": "b"}]}},
    "sourceConfig": {"config": {"type": "DatabaseLineage"}}
  },
  "sink": {"type": "console"}
}"#,
    )
    .unwrap();
    fs::write(
        &yaml_path,
        r#"
source:
  type: inline
  serviceName: warehouse
  serviceConnection:
    config:
      records:
        - from: a
          to: b
  sourceConfig:
    config:
      type: DatabaseLineage
sink:
  type: console
"#,
    )
    .unwrap();

    let from_json = load_config_file(&json_path).unwrap();
    let from_yaml = load_config_file(&yaml_path).unwrap();
    assert_eq!(from_json, from_yaml);

    let typed: WorkflowConfig = serde_json::from_value(from_yaml.to_value()).unwrap();
    assert_eq!(typed.source.service_name, "warehouse");
    assert_eq!(
        typed.source.service_connection.config.records.unwrap().len(),
        1
    );
}

#[test]
fn test_unset_variables_survive_loading() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("usage.yaml");
    fs::write(
        &path,
        r#"
source:
  type: file
  serviceName: "${SLUICE_TEST_SURELY_UNSET_VARIABLE}"
  sourceConfig:
    config:
      type: DatabaseUsage
sink:
  type: console
"#,
    )
    .unwrap();

    let doc = load_config_file(&path).unwrap();
    assert_eq!(
        doc.service_name(),
        Some("${SLUICE_TEST_SURELY_UNSET_VARIABLE}")
    );
}

#[test]
fn test_invalid_yaml_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "source:\n  type: [unclosed\n").unwrap();

    let err = load_config_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseYaml { .. }), "got {err:?}");
    assert!(!err.hints().is_empty());
}

#[test]
fn test_unsupported_extension_is_rejected_before_reading() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("workflow.toml");
    fs::write(&path, "[source]\ntype = 'file'\n").unwrap();

    let err = load_config_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    assert!(err.to_string().contains(".toml"));
}
