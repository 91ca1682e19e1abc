//! Step bookkeeping and the settled workflow status.

use std::fmt;

use serde::Serialize;

/// Lifecycle of a workflow instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowState {
    Constructed,
    Running,
    Stopped,
}

/// Terminal result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowStatus {
    /// Every step met the success threshold.
    Success,
    /// Records flowed, but at least one step fell below the threshold.
    PartialFailure,
    /// Nothing could be read; the source only recorded failures.
    Failure,
}

impl WorkflowStatus {
    pub fn is_success(self) -> bool {
        self == WorkflowStatus::Success
    }

    /// Settle the status from the per-step records.
    ///
    /// `steps[0]` is the source. `threshold` is a percentage.
    pub fn settle(steps: &[StepStatus], threshold: f64) -> Self {
        if let Some(source) = steps.first() {
            if source.processed == 0 && !source.failures.is_empty() {
                return WorkflowStatus::Failure;
            }
        }
        let below = steps
            .iter()
            .any(|step| !step.failures.is_empty() && step.success_rate() < threshold);
        if below {
            WorkflowStatus::PartialFailure
        } else {
            WorkflowStatus::Success
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkflowStatus::Success => "success",
            WorkflowStatus::PartialFailure => "partial failure",
            WorkflowStatus::Failure => "failure",
        })
    }
}

/// A record or operation that a step could not handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepFailure {
    /// What failed (record label, file name, ...).
    pub name: String,
    /// One-line error.
    pub error: String,
    /// Longer diagnostic, logged at debug level only.
    pub detail: Option<String>,
}

/// Counters kept by one pipeline step.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StepStatus {
    pub step: String,
    pub processed: usize,
    pub updated: usize,
    pub warnings: Vec<String>,
    pub filtered: Vec<String>,
    pub failures: Vec<StepFailure>,
}

impl StepStatus {
    pub fn new(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            ..Default::default()
        }
    }

    pub fn record_processed(&mut self) {
        self.processed += 1;
    }

    pub fn record_updated(&mut self) {
        self.updated += 1;
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn filter(&mut self, name: impl Into<String>) {
        self.filtered.push(name.into());
    }

    pub fn fail(&mut self, name: impl Into<String>, error: impl Into<String>) {
        self.failures.push(StepFailure {
            name: name.into(),
            error: error.into(),
            detail: None,
        });
    }

    pub fn fail_with_detail(
        &mut self,
        name: impl Into<String>,
        error: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.failures.push(StepFailure {
            name: name.into(),
            error: error.into(),
            detail: Some(detail.into()),
        });
    }

    /// Percentage of handled records that did not fail. 100 when idle.
    pub fn success_rate(&self) -> f64 {
        let total = self.processed + self.failures.len();
        if total == 0 {
            return 100.0;
        }
        self.processed as f64 * 100.0 / total as f64
    }
}
