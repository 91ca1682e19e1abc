//! Sluice - configuration-driven metadata workflows
//!
//! Main entry point for the sluice CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sluice_pipeline::WorkflowKind;

mod commands;
mod logging;

use commands::run::{self, RunArgs};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Sluice - run configuration-driven metadata workflows
#[derive(Parser)]
#[command(name = "sluice")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logs, error chains and stack traces)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for the rolling JSON log file
    #[arg(long, global = true, env = "SLUICE_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest entity metadata (DatabaseMetadata)
    Ingest(RunArgs),

    /// Aggregate query usage per table (DatabaseUsage)
    Usage(RunArgs),

    /// Extract table lineage edges (DatabaseLineage)
    Lineage(RunArgs),

    /// Profile column statistics (Profiler)
    Profile(RunArgs),

    /// Run data quality test cases (TestSuite)
    Test(RunArgs),
}

impl Commands {
    fn into_parts(self) -> (WorkflowKind, RunArgs) {
        match self {
            Commands::Ingest(args) => (WorkflowKind::Metadata, args),
            Commands::Usage(args) => (WorkflowKind::Usage, args),
            Commands::Lineage(args) => (WorkflowKind::Lineage, args),
            Commands::Profile(args) => (WorkflowKind::Profiler, args),
            Commands::Test(args) => (WorkflowKind::TestSuite, args),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = logging::Logging::init(cli.verbose, cli.log_dir);
    if let Some(dir) = &logging.log_dir {
        tracing::dispatcher::with_default(&logging.dispatch, || {
            tracing::debug!("Writing logs to {}", dir.display());
        });
    }

    let ctx = commands::Context {
        verbose: cli.verbose,
        dispatch: logging.dispatch.clone(),
    };

    let (kind, args) = cli.command.into_parts();
    let signal = run::run(kind, args, &ctx).await;

    drop(logging);
    signal.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_subcommands_map_to_kinds() {
        let cases = [
            ("ingest", WorkflowKind::Metadata),
            ("usage", WorkflowKind::Usage),
            ("lineage", WorkflowKind::Lineage),
            ("profile", WorkflowKind::Profiler),
            ("test", WorkflowKind::TestSuite),
        ];
        for (name, kind) in cases {
            let cli = Cli::try_parse_from(["sluice", name, "--config", "w.yaml"]).unwrap();
            let (parsed, args) = cli.command.into_parts();
            assert_eq!(parsed, kind);
            assert_eq!(args.config, PathBuf::from("w.yaml"));
        }
    }

    #[test]
    fn test_config_is_required() {
        assert!(Cli::try_parse_from(["sluice", "usage"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sluice",
            "lineage",
            "-c",
            "w.yml",
            "--verbose",
            "--log-dir",
            "/tmp/l",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.log_dir, Some(PathBuf::from("/tmp/l")));
    }
}
