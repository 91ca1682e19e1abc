//! Error types for workflow construction and execution.
//!
//! Construction-time failures ([`ValidationError`], [`ConstructionError`],
//! plus [`ConfigError`] from loading) are gathered in [`InitError`]. Failures
//! after a workflow exists are [`WorkflowFailed`] (status-carrying) and
//! [`UnexpectedError`] (everything the status model does not cover).

use std::backtrace::Backtrace;
use std::path::PathBuf;

use sluice_config::ConfigError;
use thiserror::Error;

use crate::kind::WorkflowKind;
use crate::status::WorkflowStatus;

/// The document parsed but does not describe a valid workflow.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required key is absent.
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    /// A key is present but its value has the wrong shape.
    #[error("invalid value for '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// The declared pipeline type does not belong to the workflow being run.
    #[error(
        "unsupported pipeline type '{requested}' for a {kind} workflow (expected '{}')",
        .kind.pipeline_type()
    )]
    UnsupportedPipelineType {
        requested: String,
        kind: WorkflowKind,
    },

    /// The connector named in `field` is not one we ship.
    #[error("unknown {role} connector '{name}' (supported: {})", .supported.join(", "))]
    UnknownConnector {
        role: &'static str,
        name: String,
        supported: &'static [&'static str],
    },

    /// A filter regex failed to compile.
    #[error("invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// A test case is malformed or uses an unknown test type.
    #[error("invalid test case '{name}': {message}")]
    InvalidTestCase { name: String, message: String },

    /// `workflowConfig.successThreshold` outside 0..=100.
    #[error("successThreshold must be between 0 and 100, got {0}")]
    InvalidThreshold(f64),
}

impl ValidationError {
    /// Suggestions a user can act on, derived from the failure.
    pub fn hints(&self) -> Vec<String> {
        match self {
            ValidationError::MissingField { field } => {
                vec![format!("missing required field `{field}`")]
            }
            ValidationError::InvalidField { field, .. } => {
                vec![format!("check the type of `{field}` against the documented schema")]
            }
            ValidationError::UnsupportedPipelineType { requested, kind } => {
                let mut hints = vec![format!(
                    "{kind} workflows expect `source.sourceConfig.config.type: {}`",
                    kind.pipeline_type()
                )];
                if let Some(other) = WorkflowKind::from_pipeline_type(requested) {
                    hints.push(format!(
                        "'{requested}' is the pipeline type of {other} workflows; \
                         run it with the matching subcommand"
                    ));
                }
                hints
            }
            ValidationError::UnknownConnector {
                role, supported, ..
            } => vec![format!(
                "set `{role}.type` to one of: {}",
                supported.join(", ")
            )],
            ValidationError::InvalidPattern { .. } => vec![
                "filter patterns are regular expressions; escape literal dots as `\\.`".to_string(),
            ],
            ValidationError::InvalidTestCase { .. } => vec![
                "supported test types: columnValuesToBeNotNull, \
                 columnValuesToBeBetween, columnValuesToBeUnique"
                    .to_string(),
            ],
            ValidationError::InvalidThreshold(_) => {
                vec!["`workflowConfig.successThreshold` is a percentage".to_string()]
            }
        }
    }
}

/// The document is valid, but binding it to the resources it names failed.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// A file or directory the workflow depends on cannot be reached.
    #[error("cannot reach {resource} '{}': {source}", .path.display())]
    ResourceUnreachable {
        resource: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    /// No factory is registered for the kind.
    #[error("no workflow factory registered for {0} workflows")]
    NoFactory(WorkflowKind),
}

impl ConstructionError {
    /// Suggestions a user can act on, derived from the failure.
    pub fn hints(&self) -> Vec<String> {
        match self {
            ConstructionError::ResourceUnreachable { resource, path, .. } => vec![format!(
                "make sure the {resource} '{}' exists and is accessible",
                path.display()
            )],
            ConstructionError::NoFactory(kind) => {
                vec![format!("this build does not support {kind} workflows")]
            }
        }
    }
}

/// Any failure before a workflow instance exists.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("construction error: {0}")]
    Construction(#[from] ConstructionError),
}

impl InitError {
    /// Short class name used in reports.
    pub fn class(&self) -> &'static str {
        match self {
            InitError::Config(_) => "ConfigError",
            InitError::Validation(_) => "ValidationError",
            InitError::Construction(_) => "ConstructionError",
        }
    }

    /// Hints from the underlying error.
    pub fn hints(&self) -> Vec<String> {
        match self {
            InitError::Config(e) => e.hints(),
            InitError::Validation(e) => e.hints(),
            InitError::Construction(e) => e.hints(),
        }
    }
}

/// The workflow ran, but its terminal status was not `Success`.
#[derive(Debug, Error)]
#[error("{kind} workflow did not succeed: {reason}")]
pub struct WorkflowFailed {
    pub kind: WorkflowKind,
    /// Settled status, `None` if the workflow never ran.
    pub status: Option<WorkflowStatus>,
    pub reason: String,
    trace: String,
}

impl WorkflowFailed {
    /// Create an error, capturing the current stack.
    pub fn new(
        kind: WorkflowKind,
        status: Option<WorkflowStatus>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            status,
            reason: reason.into(),
            trace: Backtrace::force_capture().to_string(),
        }
    }

    /// Stack captured where the status was raised.
    pub fn trace(&self) -> &str {
        &self.trace
    }
}

/// A failure during execution that the workflow status does not model.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct UnexpectedError {
    message: String,
    trace: String,
}

impl UnexpectedError {
    /// Create an error, capturing the current stack.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: Backtrace::force_capture().to_string(),
        }
    }

    /// Stack captured where the error was created.
    pub fn trace(&self) -> &str {
        &self.trace
    }
}
