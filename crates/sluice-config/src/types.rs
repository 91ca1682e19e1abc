//! Typed workflow schema.
//!
//! ```yaml
//! source:
//!   type: file
//!   serviceName: warehouse
//!   serviceConnection:
//!     config:
//!       path: ./queries.jsonl
//!   sourceConfig:
//!     config:
//!       type: DatabaseUsage
//! sink:
//!   type: file
//!   config:
//!     path: ./usage.jsonl
//! workflowConfig:
//!   successThreshold: 90
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default minimum per-step success percentage.
pub const DEFAULT_SUCCESS_THRESHOLD: f64 = 90.0;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level
// ─────────────────────────────────────────────────────────────────────────────

/// Root of a workflow configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    /// Where records come from.
    pub source: SourceConfig,

    /// Where processed records go.
    pub sink: SinkConfig,

    /// Run-wide settings.
    #[serde(default)]
    pub workflow_config: RunSettings,
}

// ─────────────────────────────────────────────────────────────────────────────
// Source
// ─────────────────────────────────────────────────────────────────────────────

/// The `source` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    /// Connector name (`file`, `inline`).
    #[serde(rename = "type")]
    pub connector: String,

    /// Logical name of the service the records describe.
    pub service_name: String,

    /// Connector-specific connection settings.
    #[serde(default)]
    pub service_connection: ServiceConnection,

    /// Pipeline type and its options.
    pub source_config: PipelineSource,
}

/// `source.serviceConnection`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConnection {
    #[serde(default)]
    pub config: ConnectionConfig,
}

/// `source.serviceConnection.config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// File to read (file connector).
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Records embedded in the config (inline connector).
    #[serde(default)]
    pub records: Option<Vec<Value>>,
}

/// `source.sourceConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSource {
    pub config: PipelineOptions,
}

/// `source.sourceConfig.config`: the declared pipeline type plus the options
/// the different pipeline types understand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOptions {
    /// Pipeline type, e.g. `DatabaseMetadata` or `DatabaseUsage`.
    #[serde(rename = "type")]
    pub pipeline_type: String,

    /// Entity name filter (metadata pipelines).
    #[serde(default)]
    pub table_filter_pattern: Option<FilterPattern>,

    /// Assertions to evaluate (test suite pipelines).
    #[serde(default)]
    pub test_cases: Vec<TestCaseConfig>,
}

/// Include/exclude regular expressions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterPattern {
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
}

/// One data quality assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseConfig {
    /// Unique name of the test case.
    pub name: String,
    /// Column the assertion runs against.
    pub column: String,
    /// Assertion type, e.g. `columnValuesToBeNotNull`.
    pub test_type: String,
    /// Lower bound for `columnValuesToBeBetween`.
    #[serde(default)]
    pub min_value: Option<f64>,
    /// Upper bound for `columnValuesToBeBetween`.
    #[serde(default)]
    pub max_value: Option<f64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Sink
// ─────────────────────────────────────────────────────────────────────────────

/// The `sink` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Connector name (`file`, `console`, `null`).
    #[serde(rename = "type")]
    pub connector: String,

    #[serde(default)]
    pub config: SinkOptions,
}

/// `sink.config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinkOptions {
    /// Output file (file sink).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Run settings
// ─────────────────────────────────────────────────────────────────────────────

/// The `workflowConfig` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSettings {
    /// Minimum success percentage each step must reach.
    #[serde(default = "default_success_threshold")]
    pub success_threshold: f64,
}

fn default_success_threshold() -> f64 {
    DEFAULT_SUCCESS_THRESHOLD
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_config_defaults() {
        let config: WorkflowConfig = serde_json::from_value(json!({
            "source": {
                "type": "inline",
                "serviceName": "warehouse",
                "sourceConfig": {"config": {"type": "DatabaseLineage"}}
            },
            "sink": {"type": "console"}
        }))
        .unwrap();

        assert_eq!(config.source.connector, "inline");
        assert_eq!(config.source.source_config.config.pipeline_type, "DatabaseLineage");
        assert!(config.source.service_connection.config.path.is_none());
        assert!(config.sink.config.path.is_none());
        assert_eq!(config.workflow_config.success_threshold, DEFAULT_SUCCESS_THRESHOLD);
    }

    #[test]
    fn test_test_cases_parse() {
        let options: PipelineOptions = serde_json::from_value(json!({
            "type": "TestSuite",
            "testCases": [
                {"name": "age_range", "column": "age", "testType": "columnValuesToBeBetween",
                 "minValue": 0, "maxValue": 130}
            ]
        }))
        .unwrap();
        assert_eq!(options.test_cases.len(), 1);
        assert_eq!(options.test_cases[0].max_value, Some(130.0));
    }
}
