//! Per-kind record processors.
//!
//! Every workflow kind runs the same source → processor → sink pipeline; the
//! processor is what differs. Processors see each record once through
//! [`Processor::process`] and may emit aggregated output from
//! [`Processor::finish`] after the source is exhausted.

mod lineage;
mod metadata;
mod profiler;
mod test_suite;
mod usage;

use serde_json::Value;

use crate::kind::WorkflowKind;
use crate::status::StepStatus;

pub use lineage::LineageProcessor;
pub use metadata::{MetadataProcessor, NameFilter};
pub use profiler::ProfilerProcessor;
pub use test_suite::{TestCase, TestSuiteProcessor, TestType};
pub use usage::UsageProcessor;

/// Transforms source records into sink records.
pub trait Processor: Send {
    /// Step name used in summaries.
    fn name(&self) -> &'static str;

    /// Handle one record. `label` identifies it in failures and warnings.
    fn process(&mut self, label: &str, record: Value, status: &mut StepStatus) -> Vec<Value>;

    /// Emit anything held back until all records were seen.
    fn finish(&mut self, _status: &mut StepStatus) -> Vec<Value> {
        Vec::new()
    }
}

/// Validated processor settings, bound at construction.
#[derive(Debug, Clone)]
pub enum ProcessorSpec {
    Metadata { filter: NameFilter },
    Usage,
    Lineage,
    Profiler,
    TestSuite { cases: Vec<TestCase> },
}

impl ProcessorSpec {
    /// The kind this processor belongs to.
    pub fn kind(&self) -> WorkflowKind {
        match self {
            ProcessorSpec::Metadata { .. } => WorkflowKind::Metadata,
            ProcessorSpec::Usage => WorkflowKind::Usage,
            ProcessorSpec::Lineage => WorkflowKind::Lineage,
            ProcessorSpec::Profiler => WorkflowKind::Profiler,
            ProcessorSpec::TestSuite { .. } => WorkflowKind::TestSuite,
        }
    }

    /// Instantiate the processor for one run.
    pub fn build(&self, service: &str) -> Box<dyn Processor> {
        match self {
            ProcessorSpec::Metadata { filter } => {
                Box::new(MetadataProcessor::new(service, filter.clone()))
            }
            ProcessorSpec::Usage => Box::new(UsageProcessor::new(service)),
            ProcessorSpec::Lineage => Box::new(LineageProcessor::new(service)),
            ProcessorSpec::Profiler => Box::new(ProfilerProcessor::new(service)),
            ProcessorSpec::TestSuite { cases } => {
                Box::new(TestSuiteProcessor::new(service, cases.clone()))
            }
        }
    }
}

/// Type name of a JSON value, for error messages.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
