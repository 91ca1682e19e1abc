//! Workflows for sluice.
//!
//! Provides:
//! - The [`Workflow`] lifecycle contract (`execute`, `stop`, `print_status`,
//!   `raise_from_status`) and the status model it reports through
//! - [`WorkflowKind`] and the [`WorkflowRegistry`] mapping each kind to a factory
//! - The error taxonomy separating initialization failures ([`InitError`])
//!   from runtime failures ([`WorkflowFailed`], [`UnexpectedError`])
//! - [`PipelineWorkflow`], the built-in source → processor → sink pipeline

pub mod definition;
pub mod error;
pub mod kind;
pub mod pipeline;
pub mod processor;
pub mod registry;
pub mod sink;
pub mod source;
pub mod status;
pub mod summary;
pub mod workflow;

pub use definition::PipelineDefinition;
pub use error::{ConstructionError, InitError, UnexpectedError, ValidationError, WorkflowFailed};
pub use kind::WorkflowKind;
pub use pipeline::PipelineWorkflow;
pub use registry::{WorkflowFactory, WorkflowRegistry};
pub use status::{StepFailure, StepStatus, WorkflowState, WorkflowStatus};
pub use summary::render_summary;
pub use workflow::Workflow;
