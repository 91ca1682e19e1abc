//! Configuration loading for sluice workflows.
//!
//! A workflow is described by a single JSON or YAML document:
//! - `source`: where records come from and which pipeline type they feed
//! - `sink`: where processed records go
//! - `workflowConfig`: run-wide settings such as the success threshold
//!
//! Loading happens in two layers. [`load_config_file`] turns a path into an
//! untyped [`ConfigDocument`] (environment references expanded, root checked
//! to be a mapping). The typed schema in [`types`] is bound later by the
//! workflow factory, which owns semantic validation.

pub mod document;
pub mod error;
pub mod loader;
pub mod types;

pub use document::ConfigDocument;
pub use error::{ConfigError, Result};
pub use loader::{ConfigFormat, expand_vars, expand_vars_with, load_config_file, parse_config};
pub use types::*;
