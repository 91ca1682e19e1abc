//! Workflow commands - run one workflow kind from a config file.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use sluice_orchestrator::{ConsoleReporter, ExitSignal, Orchestrator};
use sluice_pipeline::{WorkflowKind, WorkflowRegistry};

use super::Context;

/// Arguments shared by every workflow subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Workflow configuration file (.json, .yaml or .yml)
    #[arg(short, long, value_name = "PATH")]
    pub config: PathBuf,
}

/// Run a workflow of `kind` to completion.
pub async fn run(kind: WorkflowKind, args: RunArgs, ctx: &Context) -> ExitSignal {
    let orchestrator = Orchestrator::new(
        kind,
        Arc::new(WorkflowRegistry::builtin()),
        Arc::new(ConsoleReporter::new(ctx.verbose)),
        ctx.dispatch.clone(),
    );
    orchestrator.run(&args.config).await
}
