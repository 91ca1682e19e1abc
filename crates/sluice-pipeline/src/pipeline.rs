//! The built-in source → processor → sink workflow.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sluice_config::ConfigDocument;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::definition::PipelineDefinition;
use crate::error::{InitError, UnexpectedError, WorkflowFailed};
use crate::kind::WorkflowKind;
use crate::sink::Sink;
use crate::status::{StepStatus, WorkflowState, WorkflowStatus};
use crate::summary::render_summary;
use crate::workflow::Workflow;

/// A record pipeline built from a validated definition.
pub struct PipelineWorkflow {
    run_id: Uuid,
    definition: PipelineDefinition,
    state: WorkflowState,
    status: Option<WorkflowStatus>,
    steps: [StepStatus; 3],
    sink: Sink,
    started_at: Option<DateTime<Utc>>,
    elapsed: Option<Duration>,
}

impl PipelineWorkflow {
    /// Validate `document` and build a workflow of `kind` from it.
    pub fn create(document: &ConfigDocument, kind: WorkflowKind) -> Result<Self, InitError> {
        let definition = PipelineDefinition::from_document(document, kind)?;
        Ok(Self::from_definition(definition))
    }

    pub fn from_definition(definition: PipelineDefinition) -> Self {
        let run_id = Uuid::new_v4();
        debug!(
            %run_id,
            kind = %definition.kind,
            service = %definition.service_name,
            "Constructed workflow"
        );
        Self {
            run_id,
            sink: Sink::new(definition.sink.clone()),
            steps: [
                StepStatus::new("source"),
                StepStatus::new("processor"),
                StepStatus::new("sink"),
            ],
            definition,
            state: WorkflowState::Constructed,
            status: None,
            started_at: None,
            elapsed: None,
        }
    }

    /// Per-step counters, source first.
    pub fn steps(&self) -> &[StepStatus] {
        &self.steps
    }

    pub fn summary(&self) -> String {
        render_summary(
            self.definition.kind,
            &self.definition.service_name,
            self.run_id,
            self.started_at,
            &self.steps,
            self.status,
            self.elapsed,
        )
    }

    async fn run_steps(&mut self) {
        let [source_status, processor_status, sink_status] = &mut self.steps;

        self.sink.open(sink_status).await;

        let records = self.definition.source.read(source_status).await;
        debug!(run_id = %self.run_id, records = records.len(), "Source exhausted");

        let mut processor = self.definition.processor.build(&self.definition.service_name);
        let mut output = Vec::new();
        for (label, record) in records {
            output.extend(
                processor
                    .process(&label, record, processor_status)
                    .into_iter()
                    .map(|value| (label.clone(), value)),
            );
        }
        output.extend(
            processor
                .finish(processor_status)
                .into_iter()
                .enumerate()
                .map(|(i, value)| (format!("{} output {}", processor.name(), i + 1), value)),
        );

        for (label, value) in &output {
            self.sink.write(label, value, sink_status).await;
        }
        self.sink.flush(sink_status).await;
    }
}

#[async_trait]
impl Workflow for PipelineWorkflow {
    fn kind(&self) -> WorkflowKind {
        self.definition.kind
    }

    fn state(&self) -> WorkflowState {
        self.state
    }

    fn status(&self) -> Option<WorkflowStatus> {
        self.status
    }

    async fn execute(&mut self) -> Result<(), UnexpectedError> {
        if self.state != WorkflowState::Constructed {
            return Err(UnexpectedError::new(format!(
                "cannot execute a {} workflow in state {:?}",
                self.definition.kind, self.state
            )));
        }
        self.state = WorkflowState::Running;
        self.started_at = Some(Utc::now());
        let started = Instant::now();
        info!(run_id = %self.run_id, kind = %self.definition.kind, "Executing workflow");

        self.run_steps().await;

        self.elapsed = Some(started.elapsed());
        let status = WorkflowStatus::settle(&self.steps, self.definition.success_threshold);
        self.status = Some(status);
        info!(run_id = %self.run_id, %status, "Workflow finished");
        Ok(())
    }

    async fn stop(&mut self) {
        self.sink.close();
        if self.state != WorkflowState::Stopped {
            debug!(run_id = %self.run_id, "Stopped workflow");
            self.state = WorkflowState::Stopped;
        }
    }

    fn print_status(&self) {
        print!("{}", self.summary());
        for step in &self.steps {
            for failure in &step.failures {
                if let Some(detail) = &failure.detail {
                    debug!(step = %step.step, name = %failure.name, "Failure detail: {detail}");
                }
            }
        }
    }

    fn raise_from_status(&self) -> Result<(), WorkflowFailed> {
        let kind = self.definition.kind;
        let Some(status) = self.status else {
            return Err(WorkflowFailed::new(kind, None, "workflow has not run"));
        };
        if status.is_success() {
            return Ok(());
        }
        let failing: Vec<String> = self
            .steps
            .iter()
            .filter(|step| !step.failures.is_empty())
            .map(|step| format!("{} ({} failures)", step.step, step.failures.len()))
            .collect();
        let reason = if failing.is_empty() {
            status.to_string()
        } else {
            format!("{status} in {}", failing.join(", "))
        };
        warn!(run_id = %self.run_id, %reason, "Workflow did not succeed");
        Err(WorkflowFailed::new(kind, Some(status), reason))
    }
}

impl std::fmt::Debug for PipelineWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineWorkflow")
            .field("run_id", &self.run_id)
            .field("kind", &self.definition.kind)
            .field("state", &self.state)
            .field("status", &self.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    const SOURCE: usize = 0;
    const PROCESSOR: usize = 1;
    const SINK: usize = 2;

    fn workflow(value: Value, kind: WorkflowKind) -> PipelineWorkflow {
        let doc = ConfigDocument::from_value(value).unwrap();
        PipelineWorkflow::create(&doc, kind).unwrap()
    }

    fn lineage(records: Value) -> PipelineWorkflow {
        workflow(
            json!({
                "source": {
                    "type": "inline",
                    "serviceName": "warehouse",
                    "serviceConnection": {"config": {"records": records}},
                    "sourceConfig": {"config": {"type": "DatabaseLineage"}}
                },
                "sink": {"type": "null"}
            }),
            WorkflowKind::Lineage,
        )
    }

    #[tokio::test]
    async fn test_execute_settles_success() {
        let mut wf = lineage(json!([{"from": "a", "to": "b"}, {"from": "b", "to": "c"}]));
        assert_eq!(wf.state(), WorkflowState::Constructed);
        assert!(wf.status().is_none());

        wf.execute().await.unwrap();
        assert_eq!(wf.state(), WorkflowState::Running);
        assert_eq!(wf.status(), Some(WorkflowStatus::Success));
        assert_eq!(wf.steps()[SOURCE].processed, 2);
        assert_eq!(wf.steps()[SINK].processed, 2);
        assert!(wf.raise_from_status().is_ok());

        wf.stop().await;
        assert_eq!(wf.state(), WorkflowState::Stopped);
    }

    #[tokio::test]
    async fn test_bad_records_fail_the_status() {
        let mut wf = lineage(json!([{"from": "a"}, {"to": "b"}, {"from": "x", "to": "y"}]));
        wf.execute().await.unwrap();
        assert_eq!(wf.status(), Some(WorkflowStatus::PartialFailure));
        assert_eq!(wf.steps()[PROCESSOR].failures.len(), 2);

        let err = wf.raise_from_status().unwrap_err();
        assert_eq!(err.status, Some(WorkflowStatus::PartialFailure));
        assert!(err.reason.contains("processor (2 failures)"));
    }

    #[tokio::test]
    async fn test_execute_twice_is_unexpected() {
        let mut wf = lineage(json!([]));
        wf.execute().await.unwrap();
        assert!(wf.execute().await.is_err());
    }

    #[tokio::test]
    async fn test_raise_before_execute() {
        let wf = lineage(json!([]));
        let err = wf.raise_from_status().unwrap_err();
        assert!(err.status.is_none());
        assert_eq!(err.reason, "workflow has not run");
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mut wf = lineage(json!([]));
        wf.stop().await;
        wf.stop().await;
        assert_eq!(wf.state(), WorkflowState::Stopped);
        assert!(wf.execute().await.is_err());
    }
}
