//! Binding a configuration document to a validated pipeline definition.
//!
//! Checks run in this order, stopping at the first problem:
//! 1. required keys exist (reported with their dotted path)
//! 2. the declared pipeline type belongs to the workflow kind
//! 3. each section deserializes into the typed schema
//! 4. connector names, options and thresholds are valid
//! 5. files and directories the pipeline depends on are reachable

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use sluice_config::{ConfigDocument, PipelineOptions, RunSettings, SinkConfig, SourceConfig};
use tracing::debug;

use crate::error::{ConstructionError, InitError, ValidationError};
use crate::kind::WorkflowKind;
use crate::processor::{NameFilter, ProcessorSpec, TestCase};
use crate::sink::{SINK_CONNECTORS, SinkSpec};
use crate::source::{RecordFormat, SOURCE_CONNECTORS, SourceSpec};

/// Keys every workflow document must contain.
const REQUIRED_FIELDS: &[&str] = &[
    "source",
    "source.type",
    "source.serviceName",
    "source.sourceConfig",
    "source.sourceConfig.config",
    "source.sourceConfig.config.type",
    "sink",
    "sink.type",
];

/// Unquoted `type: null` in YAML loads as a null value rather than a name.
const SINK_TYPE: &str = "sink.type";

/// A fully validated pipeline, ready to instantiate.
#[derive(Debug, Clone)]
pub struct PipelineDefinition {
    pub kind: WorkflowKind,
    pub service_name: String,
    pub source: SourceSpec,
    pub processor: ProcessorSpec,
    pub sink: SinkSpec,
    pub success_threshold: f64,
}

impl PipelineDefinition {
    /// Validate `document` as a pipeline of `kind`.
    pub fn from_document(
        document: &ConfigDocument,
        kind: WorkflowKind,
    ) -> Result<Self, InitError> {
        for field in REQUIRED_FIELDS {
            let absent = match document.pointer(field) {
                None => true,
                Some(value) => value.is_null() && *field != SINK_TYPE,
            };
            if absent {
                return Err(ValidationError::MissingField {
                    field: (*field).to_string(),
                }
                .into());
            }
        }

        let requested = document
            .pipeline_type()
            .ok_or_else(|| ValidationError::InvalidField {
                field: "source.sourceConfig.config.type".into(),
                message: "expected a string".into(),
            })?;
        if requested != kind.pipeline_type() {
            return Err(ValidationError::UnsupportedPipelineType {
                requested: requested.to_string(),
                kind,
            }
            .into());
        }

        let source: SourceConfig = section(document, "source")?;
        let sink = sink_section(document)?;
        let settings: RunSettings = match document.pointer("workflowConfig") {
            Some(_) => section(document, "workflowConfig")?,
            None => RunSettings::default(),
        };

        let threshold = settings.success_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(ValidationError::InvalidThreshold(threshold).into());
        }

        let definition = Self {
            kind,
            processor: bind_processor(kind, &source.source_config.config)?,
            source: bind_source(&source)?,
            sink: bind_sink(&sink)?,
            service_name: source.service_name,
            success_threshold: threshold,
        };
        debug!(
            kind = %kind,
            source = definition.source.connector(),
            sink = definition.sink.connector(),
            "Bound pipeline definition"
        );
        Ok(definition)
    }
}

fn section<T: DeserializeOwned>(document: &ConfigDocument, field: &str) -> Result<T, InitError> {
    let value = document.pointer(field).cloned().unwrap_or(Value::Null);
    deserialize(field, value)
}

/// The sink section, with a null connector name read as the `null` sink.
fn sink_section(document: &ConfigDocument) -> Result<SinkConfig, InitError> {
    let mut value = document.pointer("sink").cloned().unwrap_or(Value::Null);
    if let Some(connector) = value.get_mut("type").filter(|v| v.is_null()) {
        debug!("Reading null {SINK_TYPE} as the null sink");
        *connector = Value::from("null");
    }
    deserialize("sink", value)
}

fn deserialize<T: DeserializeOwned>(field: &str, value: Value) -> Result<T, InitError> {
    serde_json::from_value(value).map_err(|e| {
        ValidationError::InvalidField {
            field: field.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

fn bind_source(source: &SourceConfig) -> Result<SourceSpec, InitError> {
    let connection = &source.service_connection.config;
    match source.connector.as_str() {
        "file" => {
            let path = connection
                .path
                .clone()
                .ok_or_else(|| missing("source.serviceConnection.config.path"))?;
            ensure_file(&path)?;
            Ok(SourceSpec::File {
                format: RecordFormat::from_path(&path),
                path,
            })
        }
        "inline" => {
            let records = connection
                .records
                .clone()
                .ok_or_else(|| missing("source.serviceConnection.config.records"))?;
            Ok(SourceSpec::Inline { records })
        }
        other => Err(ValidationError::UnknownConnector {
            role: "source",
            name: other.to_string(),
            supported: SOURCE_CONNECTORS,
        }
        .into()),
    }
}

fn bind_sink(sink: &SinkConfig) -> Result<SinkSpec, InitError> {
    match sink.connector.as_str() {
        "file" => {
            let path = sink
                .config
                .path
                .clone()
                .ok_or_else(|| missing("sink.config.path"))?;
            ensure_parent_dir(&path)?;
            Ok(SinkSpec::File { path })
        }
        "console" => Ok(SinkSpec::Console),
        "null" => Ok(SinkSpec::Null),
        other => Err(ValidationError::UnknownConnector {
            role: "sink",
            name: other.to_string(),
            supported: SINK_CONNECTORS,
        }
        .into()),
    }
}

fn bind_processor(
    kind: WorkflowKind,
    options: &PipelineOptions,
) -> Result<ProcessorSpec, InitError> {
    let spec = match kind {
        WorkflowKind::Metadata => ProcessorSpec::Metadata {
            filter: NameFilter::from_config(options.table_filter_pattern.as_ref())?,
        },
        WorkflowKind::Usage => ProcessorSpec::Usage,
        WorkflowKind::Lineage => ProcessorSpec::Lineage,
        WorkflowKind::Profiler => ProcessorSpec::Profiler,
        WorkflowKind::TestSuite => {
            if options.test_cases.is_empty() {
                return Err(missing("source.sourceConfig.config.testCases"));
            }
            let cases = options
                .test_cases
                .iter()
                .map(TestCase::from_config)
                .collect::<Result<Vec<_>, _>>()?;
            ProcessorSpec::TestSuite { cases }
        }
    };
    Ok(spec)
}

fn missing(field: &str) -> InitError {
    ValidationError::MissingField {
        field: field.to_string(),
    }
    .into()
}

fn ensure_file(path: &Path) -> Result<(), InitError> {
    let metadata = std::fs::metadata(path).map_err(|e| ConstructionError::ResourceUnreachable {
        resource: "source file",
        path: path.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_file() {
        return Err(ConstructionError::ResourceUnreachable {
            resource: "source file",
            path: path.to_path_buf(),
            source: std::io::Error::other("not a regular file"),
        }
        .into());
    }
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<(), InitError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if parent.is_dir() {
        return Ok(());
    }
    Err(ConstructionError::ResourceUnreachable {
        resource: "sink directory",
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "directory does not exist"),
        path: parent,
    }
    .into())
}
