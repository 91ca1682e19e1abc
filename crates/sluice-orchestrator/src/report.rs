//! User-facing reporting of initialization failures.

use std::fmt::Write;

use console::{Term, style};
use sluice_config::ConfigDocument;
use sluice_pipeline::{InitError, WorkflowKind};

/// Explains an initialization failure to the person running the workflow.
///
/// Implementations must not panic and have nothing to return: reporting is
/// the last thing that happens before the process exits.
pub trait DiagnosticReporter: Send + Sync {
    /// `config` is `None` when the document could not be loaded at all.
    fn report_init_error(
        &self,
        error: &InitError,
        config: Option<&ConfigDocument>,
        kind: WorkflowKind,
    );
}

/// Writes the report to stderr.
#[derive(Debug, Clone, Default)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    /// `verbose` suppresses the pointer to `--verbose`, since the debug log
    /// is already on the console.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl DiagnosticReporter for ConsoleReporter {
    fn report_init_error(
        &self,
        error: &InitError,
        config: Option<&ConfigDocument>,
        kind: WorkflowKind,
    ) {
        let report = render_init_report(error, config, kind, self.verbose);
        let term = Term::stderr();
        for line in report.lines() {
            let _ = term.write_line(line);
        }
    }
}

/// Render the report text.
pub fn render_init_report(
    error: &InitError,
    config: Option<&ConfigDocument>,
    kind: WorkflowKind,
    verbose: bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} could not start the {} workflow",
        style("Error:").red().bold(),
        kind
    );
    let _ = writeln!(out, "  {}: {error}", style(error.class()).bold());

    match config {
        Some(doc) => {
            let field = |value: Option<&str>| value.unwrap_or("<not set>").to_string();
            let _ = writeln!(out);
            let _ = writeln!(out, "  Source type:    {}", style(field(doc.source_type())).cyan());
            let _ = writeln!(out, "  Service:        {}", style(field(doc.service_name())).cyan());
            let _ = writeln!(out, "  Pipeline type:  {}", style(field(doc.pipeline_type())).cyan());
            let _ = writeln!(out, "  Sink type:      {}", style(field(doc.sink_type())).cyan());
        }
        None => {
            let _ = writeln!(out, "  {}", style("No configuration was loaded.").dim());
        }
    }

    let hints = error.hints();
    if !hints.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {}", style("Hints:").bold());
        for hint in hints {
            let _ = writeln!(out, "    - {hint}");
        }
    }

    if !verbose {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "  Run with {} for the full error chain and stack trace.",
            style("--verbose").yellow()
        );
    }
    out
}
