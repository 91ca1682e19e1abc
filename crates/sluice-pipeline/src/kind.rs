//! The closed set of workflow kinds.

use std::fmt;

/// Category of pipeline being run.
///
/// The kind decides which pipeline type a configuration must declare in
/// `source.sourceConfig.config.type` and which processor the built-in
/// pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowKind {
    /// Entity metadata extraction.
    Metadata,
    /// Query log usage analysis.
    Usage,
    /// Table-to-table lineage.
    Lineage,
    /// Column profiling.
    Profiler,
    /// Data quality test execution.
    TestSuite,
}

impl WorkflowKind {
    /// Every kind, in display order.
    pub const ALL: [WorkflowKind; 5] = [
        WorkflowKind::Metadata,
        WorkflowKind::Usage,
        WorkflowKind::Lineage,
        WorkflowKind::Profiler,
        WorkflowKind::TestSuite,
    ];

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowKind::Metadata => "metadata",
            WorkflowKind::Usage => "usage",
            WorkflowKind::Lineage => "lineage",
            WorkflowKind::Profiler => "profiler",
            WorkflowKind::TestSuite => "test-suite",
        }
    }

    /// The pipeline type a config for this kind must declare.
    pub fn pipeline_type(self) -> &'static str {
        match self {
            WorkflowKind::Metadata => "DatabaseMetadata",
            WorkflowKind::Usage => "DatabaseUsage",
            WorkflowKind::Lineage => "DatabaseLineage",
            WorkflowKind::Profiler => "Profiler",
            WorkflowKind::TestSuite => "TestSuite",
        }
    }

    /// Reverse lookup from a declared pipeline type.
    pub fn from_pipeline_type(pipeline_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.pipeline_type() == pipeline_type)
    }

    /// Title used in summaries ("Usage", "Test Suite").
    pub fn title(self) -> &'static str {
        match self {
            WorkflowKind::Metadata => "Metadata",
            WorkflowKind::Usage => "Usage",
            WorkflowKind::Lineage => "Lineage",
            WorkflowKind::Profiler => "Profiler",
            WorkflowKind::TestSuite => "Test Suite",
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
