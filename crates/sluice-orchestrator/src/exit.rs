//! Process outcome of one orchestration.

use std::process::ExitCode;

/// How the process should exit.
///
/// Codes follow `sysexits.h` where one fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitSignal {
    /// The workflow ran and its status was `Success`.
    Success,
    /// The workflow ran but its status was not `Success`.
    WorkflowFailed,
    /// Execution failed outside the status model (`EX_SOFTWARE`).
    Unexpected,
    /// No workflow could be built from the configuration (`EX_CONFIG`).
    InitFailure,
}

impl ExitSignal {
    pub fn code(self) -> u8 {
        match self {
            ExitSignal::Success => 0,
            ExitSignal::WorkflowFailed => 1,
            ExitSignal::Unexpected => 70,
            ExitSignal::InitFailure => 78,
        }
    }

    pub fn is_success(self) -> bool {
        self == ExitSignal::Success
    }
}

impl From<ExitSignal> for ExitCode {
    fn from(signal: ExitSignal) -> Self {
        ExitCode::from(signal.code())
    }
}
