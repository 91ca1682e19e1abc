//! Human-readable run summary.

use std::fmt::Write;
use std::time::Duration;

use chrono::{DateTime, Utc};
use console::style;
use uuid::Uuid;

use crate::kind::WorkflowKind;
use crate::status::{StepStatus, WorkflowStatus};

/// Failures listed per step before the rest are elided.
const MAX_LISTED_FAILURES: usize = 10;

/// Render the summary printed after a run.
pub fn render_summary(
    kind: WorkflowKind,
    service: &str,
    run_id: Uuid,
    started_at: Option<DateTime<Utc>>,
    steps: &[StepStatus],
    status: Option<WorkflowStatus>,
    elapsed: Option<Duration>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        style(format!("{} Summary", kind.title())).bold(),
        style(format!("({service}) run {run_id}")).dim()
    );
    if let Some(started_at) = started_at {
        let _ = writeln!(
            out,
            "  Started {}",
            started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    for step in steps {
        let _ = writeln!(
            out,
            "  {:<12} processed {}  updated {}  warnings {}  filtered {}  failures {}  ({:.1}%)",
            step.step,
            style(step.processed).cyan(),
            style(step.updated).cyan(),
            style(step.warnings.len()).yellow(),
            style(step.filtered.len()).dim(),
            failures_count(step),
            step.success_rate(),
        );
        for warning in &step.warnings {
            let _ = writeln!(out, "    {} {warning}", style("warning:").yellow());
        }
        for failure in step.failures.iter().take(MAX_LISTED_FAILURES) {
            let _ = writeln!(
                out,
                "    {} {}: {}",
                style("failed:").red(),
                failure.name,
                failure.error
            );
        }
        if step.failures.len() > MAX_LISTED_FAILURES {
            let _ = writeln!(
                out,
                "    ... and {} more",
                step.failures.len() - MAX_LISTED_FAILURES
            );
        }
    }

    let verdict = match status {
        Some(WorkflowStatus::Success) => style("success".to_string()).green().bold(),
        Some(other) => style(other.to_string()).red().bold(),
        None => style("not run".to_string()).yellow(),
    };
    match elapsed {
        Some(elapsed) => {
            let _ = writeln!(
                out,
                "  Workflow {verdict} in {:.2}s",
                elapsed.as_secs_f64()
            );
        }
        None => {
            let _ = writeln!(out, "  Workflow {verdict}");
        }
    }
    out
}

fn failures_count(step: &StepStatus) -> console::StyledObject<usize> {
    let count = step.failures.len();
    if count == 0 {
        style(count).green()
    } else {
        style(count).red()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lists_steps_and_failures() {
        console::set_colors_enabled(false);
        let mut source = StepStatus::new("source");
        source.record_processed();
        source.fail("line 2", "invalid JSON");
        let sink = StepStatus::new("sink");

        let text = render_summary(
            WorkflowKind::Usage,
            "warehouse",
            Uuid::nil(),
            DateTime::from_timestamp(1_700_000_000, 0),
            &[source, sink],
            Some(WorkflowStatus::PartialFailure),
            None,
        );
        assert!(text.starts_with("Usage Summary (warehouse)"));
        assert!(text.contains("failed: line 2: invalid JSON"));
        assert!(text.contains("Started 2023-11-14 22:13:20 UTC"));
        assert!(text.contains("(50.0%)"));
        assert!(text.contains("Workflow partial failure"));
    }

    #[test]
    fn test_summary_elides_long_failure_lists() {
        console::set_colors_enabled(false);
        let mut step = StepStatus::new("processor");
        for i in 0..(MAX_LISTED_FAILURES + 3) {
            step.fail(format!("record {i}"), "missing field");
        }
        let text = render_summary(
            WorkflowKind::Metadata,
            "db",
            Uuid::nil(),
            None,
            &[step],
            None,
            None,
        );
        assert!(text.contains("... and 3 more"));
        assert!(!text.contains("Started"));
        assert!(text.contains("Workflow not run"));
    }
}
