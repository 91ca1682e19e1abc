//! Phase-classified orchestration errors.

use std::backtrace::Backtrace;
use std::error::Error as _;

use sluice_config::ConfigDocument;
use sluice_pipeline::{InitError, UnexpectedError, WorkflowFailed};
use thiserror::Error;

/// A failure before any workflow instance existed.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct InitFailure {
    pub error: InitError,
    /// The loaded document, when loading itself succeeded.
    pub config: Option<ConfigDocument>,
    /// Stack captured where the failure was classified.
    pub trace: String,
}

impl InitFailure {
    pub fn new(error: InitError, config: Option<ConfigDocument>) -> Self {
        Self {
            error,
            config,
            trace: Backtrace::force_capture().to_string(),
        }
    }

    /// The error followed by each of its sources, joined with `: `.
    pub fn chain(&self) -> String {
        let mut chain = self.error.to_string();
        let mut source = self.error.source();
        while let Some(cause) = source {
            let message = cause.to_string();
            if !chain.ends_with(&message) {
                chain.push_str(": ");
                chain.push_str(&message);
            }
            source = cause.source();
        }
        chain
    }
}

/// A failure after the workflow instance was constructed.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Failed(#[from] WorkflowFailed),

    #[error("workflow execution failed unexpectedly: {0}")]
    Unexpected(#[from] UnexpectedError),
}

/// Which side of construction an orchestration failed on.
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error("initialization failed: {0}")]
    Init(#[from] InitFailure),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl PhaseError {
    pub fn is_init(&self) -> bool {
        matches!(self, PhaseError::Init(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_config::ConfigError;
    use std::path::PathBuf;

    #[test]
    fn test_chain_includes_sources_once() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let failure = InitFailure::new(
            ConfigError::ReadFile {
                path: PathBuf::from("w.yaml"),
                source: io,
            }
            .into(),
            None,
        );
        let chain = failure.chain();
        assert!(chain.starts_with("configuration error:"));
        assert_eq!(chain.matches("denied").count(), 1, "{chain}");
        assert!(!failure.trace.is_empty());
    }

    #[test]
    fn test_phase_classification() {
        let init = PhaseError::from(InitFailure::new(
            ConfigError::NotFound {
                path: PathBuf::from("missing.yaml"),
            }
            .into(),
            None,
        ));
        assert!(init.is_init());

        let runtime = PhaseError::from(RuntimeError::from(UnexpectedError::new("boom")));
        assert!(!runtime.is_init());
    }
}
