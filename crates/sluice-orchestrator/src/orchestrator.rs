//! Drives one workflow from a config path to an exit signal.

use std::path::Path;
use std::sync::Arc;

use sluice_config::load_config_file;
use sluice_pipeline::{WorkflowKind, WorkflowRegistry};
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, debug, error, info};

use crate::error::{InitFailure, PhaseError, RuntimeError};
use crate::exit::ExitSignal;
use crate::report::DiagnosticReporter;

/// Runs a single workflow of a fixed kind.
///
/// Every phase logs through the `Dispatch` given at construction; nothing
/// here touches the global subscriber.
pub struct Orchestrator {
    kind: WorkflowKind,
    registry: Arc<WorkflowRegistry>,
    reporter: Arc<dyn DiagnosticReporter>,
    dispatch: Dispatch,
}

impl Orchestrator {
    pub fn new(
        kind: WorkflowKind,
        registry: Arc<WorkflowRegistry>,
        reporter: Arc<dyn DiagnosticReporter>,
        dispatch: Dispatch,
    ) -> Self {
        Self {
            kind,
            registry,
            reporter,
            dispatch,
        }
    }

    pub fn kind(&self) -> WorkflowKind {
        self.kind
    }

    /// Load, construct, execute and report. Never panics on workflow errors.
    pub async fn run(&self, config_path: &Path) -> ExitSignal {
        let dispatch = self.dispatch.clone();
        async {
            let outcome = self.run_phases(config_path).await;
            self.conclude(outcome)
        }
        .with_subscriber(dispatch)
        .await
    }

    /// The phases, with failures classified by whether a workflow instance
    /// existed when they happened.
    pub async fn run_phases(&self, config_path: &Path) -> Result<(), PhaseError> {
        info!(kind = %self.kind, config = %config_path.display(), "Starting workflow");

        let document = match load_config_file(config_path) {
            Ok(document) => document,
            Err(e) => return Err(InitFailure::new(e.into(), None).into()),
        };

        let mut workflow = match self.registry.create(self.kind, &document) {
            Ok(workflow) => workflow,
            Err(e) => return Err(InitFailure::new(e, Some(document)).into()),
        };
        debug!(kind = %self.kind, "Using config: {document}");

        if let Err(e) = workflow.execute().await {
            workflow.stop().await;
            return Err(RuntimeError::Unexpected(e).into());
        }

        workflow.stop().await;
        workflow.print_status();
        workflow.raise_from_status().map_err(RuntimeError::Failed)?;
        Ok(())
    }

    fn conclude(&self, outcome: Result<(), PhaseError>) -> ExitSignal {
        match outcome {
            Ok(()) => {
                info!(kind = %self.kind, "Workflow succeeded");
                ExitSignal::Success
            }
            Err(PhaseError::Init(failure)) => {
                debug!(
                    kind = %self.kind,
                    class = failure.error.class(),
                    "initialization failed for the {} workflow: {}\nstack trace:\n{}",
                    self.kind,
                    failure.chain(),
                    failure.trace
                );
                self.reporter
                    .report_init_error(&failure.error, failure.config.as_ref(), self.kind);
                ExitSignal::InitFailure
            }
            Err(PhaseError::Runtime(RuntimeError::Failed(e))) => {
                error!(kind = %self.kind, status = ?e.status, "{e}");
                debug!(kind = %self.kind, "stack trace:\n{}", e.trace());
                ExitSignal::WorkflowFailed
            }
            Err(PhaseError::Runtime(RuntimeError::Unexpected(e))) => {
                error!(kind = %self.kind, "workflow execution failed unexpectedly: {e}");
                debug!(kind = %self.kind, "stack trace:\n{}", e.trace());
                ExitSignal::Unexpected
            }
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("kind", &self.kind)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
