//! Orchestration of a single configuration-driven workflow run.
//!
//! [`Orchestrator::run`] takes a config path to an [`ExitSignal`]:
//! load the document, construct the workflow through the registry, execute
//! it, stop it, print its status and raise from it.
//!
//! Failures before a workflow instance exists are initialization failures.
//! They are explained through a [`DiagnosticReporter`] with the partially
//! loaded configuration and exit with [`ExitSignal::InitFailure`]. Failures
//! afterwards belong to the workflow and are never reported as config
//! problems.

pub mod error;
pub mod exit;
pub mod orchestrator;
pub mod report;

pub use error::{InitFailure, PhaseError, RuntimeError};
pub use exit::ExitSignal;
pub use orchestrator::Orchestrator;
pub use report::{ConsoleReporter, DiagnosticReporter, render_init_report};
