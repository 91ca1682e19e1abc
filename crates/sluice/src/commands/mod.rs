//! CLI command handlers.

pub mod run;

use tracing::Dispatch;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Verbose output enabled.
    pub verbose: bool,
    /// Where this invocation's events go.
    pub dispatch: Dispatch,
}
