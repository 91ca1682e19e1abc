//! Workflow kind → factory registry.

use std::collections::HashMap;
use std::sync::Arc;

use sluice_config::ConfigDocument;

use crate::error::{ConstructionError, InitError};
use crate::kind::WorkflowKind;
use crate::pipeline::PipelineWorkflow;
use crate::workflow::Workflow;

/// Builds a workflow instance from a loaded document.
pub type WorkflowFactory = Arc<
    dyn Fn(&ConfigDocument, WorkflowKind) -> Result<Box<dyn Workflow>, InitError> + Send + Sync,
>;

/// Maps each workflow kind to the factory that constructs it.
#[derive(Clone, Default)]
pub struct WorkflowRegistry {
    factories: HashMap<WorkflowKind, WorkflowFactory>,
}

impl WorkflowRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in record pipeline bound to every kind.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for kind in WorkflowKind::ALL {
            registry.register(kind, Arc::new(pipeline_factory));
        }
        registry
    }

    /// Register (or replace) the factory for `kind`.
    pub fn register(&mut self, kind: WorkflowKind, factory: WorkflowFactory) -> &mut Self {
        self.factories.insert(kind, factory);
        self
    }

    /// Whether a factory exists for `kind`.
    pub fn supports(&self, kind: WorkflowKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Construct a workflow of `kind` from `document`.
    pub fn create(
        &self,
        kind: WorkflowKind,
        document: &ConfigDocument,
    ) -> Result<Box<dyn Workflow>, InitError> {
        let factory = self
            .factories
            .get(&kind)
            .ok_or(ConstructionError::NoFactory(kind))?;
        factory(document, kind)
    }
}

impl std::fmt::Debug for WorkflowRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.factories.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("WorkflowRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

fn pipeline_factory(
    document: &ConfigDocument,
    kind: WorkflowKind,
) -> Result<Box<dyn Workflow>, InitError> {
    Ok(Box::new(PipelineWorkflow::create(document, kind)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_supports_every_kind() {
        let registry = WorkflowRegistry::builtin();
        for kind in WorkflowKind::ALL {
            assert!(registry.supports(kind), "{kind} missing");
        }
    }

    #[test]
    fn test_create_without_factory() {
        let registry = WorkflowRegistry::new();
        let doc = ConfigDocument::from_value(json!({})).unwrap();
        match registry.create(WorkflowKind::Usage, &doc) {
            Err(InitError::Construction(ConstructionError::NoFactory(kind))) => {
                assert_eq!(kind, WorkflowKind::Usage)
            }
            Err(other) => panic!("expected NoFactory, got {other:?}"),
            Ok(_) => panic!("expected NoFactory"),
        }
    }

    #[test]
    fn test_builtin_create_inline_usage() {
        let registry = WorkflowRegistry::builtin();
        let doc = ConfigDocument::from_value(json!({
            "source": {
                "type": "inline",
                "serviceName": "warehouse",
                "serviceConnection": {"config": {"records": []}},
                "sourceConfig": {"config": {"type": "DatabaseUsage"}}
            },
            "sink": {"type": "null"}
        }))
        .unwrap();

        let workflow = registry.create(WorkflowKind::Usage, &doc).unwrap();
        assert_eq!(workflow.kind(), WorkflowKind::Usage);
        assert!(workflow.status().is_none());
    }
}
