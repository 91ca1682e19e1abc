//! The lifecycle contract every runnable workflow implements.

use async_trait::async_trait;

use crate::error::{UnexpectedError, WorkflowFailed};
use crate::kind::WorkflowKind;
use crate::status::{WorkflowState, WorkflowStatus};

/// A constructed, runnable workflow.
///
/// Instances move `Constructed → Running → Stopped` once and are never
/// reused. Per-record and per-step problems are recorded into the status
/// rather than returned from [`Workflow::execute`].
#[async_trait]
pub trait Workflow: Send {
    /// Kind this instance was built for.
    fn kind(&self) -> WorkflowKind;

    /// Current lifecycle state.
    fn state(&self) -> WorkflowState;

    /// Settled status, `None` until `execute` has returned.
    fn status(&self) -> Option<WorkflowStatus>;

    /// Run the workflow to completion and settle its status.
    ///
    /// Returns `Err` only for conditions outside the status model.
    ///
    /// Implementations must not panic. A panic here unwinds past the
    /// caller's `stop()`, so resources opened during the run are not
    /// released; release builds abort the process outright.
    async fn execute(&mut self) -> Result<(), UnexpectedError>;

    /// Release held resources. Idempotent and valid from any state.
    async fn stop(&mut self);

    /// Write a human-readable summary of the status.
    fn print_status(&self);

    /// Fail with [`WorkflowFailed`] iff the settled status is not `Success`.
    fn raise_from_status(&self) -> Result<(), WorkflowFailed>;
}
