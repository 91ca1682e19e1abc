//! Table-to-table lineage.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::Processor;
use crate::status::StepStatus;

/// Turns `{from, to}` records into lineage edges.
///
/// Self-referencing edges are dropped with a warning; repeated edges are
/// emitted once and counted as updates.
pub struct LineageProcessor {
    service: String,
    seen: HashSet<(String, String)>,
}

impl LineageProcessor {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            seen: HashSet::new(),
        }
    }
}

impl Processor for LineageProcessor {
    fn name(&self) -> &'static str {
        "lineage"
    }

    fn process(&mut self, label: &str, record: Value, status: &mut StepStatus) -> Vec<Value> {
        let from = record.get("from").and_then(Value::as_str);
        let to = record.get("to").and_then(Value::as_str);
        let (Some(from), Some(to)) = (from, to) else {
            status.fail(label, "lineage record needs string fields 'from' and 'to'");
            return Vec::new();
        };

        status.record_processed();
        if from == to {
            status.warn(format!("{label}: self-referencing lineage on '{from}' skipped"));
            return Vec::new();
        }
        if !self.seen.insert((from.to_string(), to.to_string())) {
            status.record_updated();
            return Vec::new();
        }

        let mut edge = Map::new();
        edge.insert("service".into(), Value::String(self.service.clone()));
        edge.insert("fromEntity".into(), Value::String(from.to_string()));
        edge.insert("toEntity".into(), Value::String(to.to_string()));
        if let Some(query) = record.get("query").and_then(Value::as_str) {
            edge.insert("sqlQuery".into(), Value::String(query.to_string()));
        }
        vec![Value::Object(edge)]
    }
}
