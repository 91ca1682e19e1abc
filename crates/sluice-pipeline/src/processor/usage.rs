//! Query log usage analysis.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Value, json};

use super::Processor;
use crate::status::StepStatus;

#[derive(Debug, Default)]
struct TableUsage {
    queries: usize,
    users: BTreeSet<String>,
}

/// Counts queries and distinct users per table.
///
/// Query records carry the referenced tables as `tables` (array) or `table`
/// (string) and optionally the issuing `user`. Nothing is emitted until
/// [`Processor::finish`], which yields one row per table.
pub struct UsageProcessor {
    service: String,
    tables: BTreeMap<String, TableUsage>,
}

impl UsageProcessor {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            tables: BTreeMap::new(),
        }
    }
}

fn referenced_tables(record: &Value) -> Option<Vec<String>> {
    if let Some(table) = record.get("table").and_then(Value::as_str) {
        return Some(vec![table.to_string()]);
    }
    let tables = record.get("tables")?.as_array()?;
    tables
        .iter()
        .map(|t| t.as_str().map(str::to_string))
        .collect()
}

impl Processor for UsageProcessor {
    fn name(&self) -> &'static str {
        "usage"
    }

    fn process(&mut self, label: &str, record: Value, status: &mut StepStatus) -> Vec<Value> {
        let Some(tables) = referenced_tables(&record) else {
            status.fail(
                label,
                "query record needs a 'table' string or a 'tables' array of strings",
            );
            return Vec::new();
        };
        if tables.is_empty() {
            status.warn(format!("{label}: query references no tables"));
        }
        let user = record.get("user").and_then(Value::as_str);
        for table in tables {
            let usage = self.tables.entry(table).or_default();
            usage.queries += 1;
            if let Some(user) = user {
                usage.users.insert(user.to_string());
            }
        }
        status.record_processed();
        Vec::new()
    }

    fn finish(&mut self, _status: &mut StepStatus) -> Vec<Value> {
        std::mem::take(&mut self.tables)
            .into_iter()
            .map(|(table, usage)| {
                json!({
                    "service": self.service,
                    "table": table,
                    "queryCount": usage.queries,
                    "users": usage.users,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregates_per_table() {
        let mut processor = UsageProcessor::new("warehouse");
        let mut status = StepStatus::new("usage");

        let records = [
            json!({"query": "select 1", "tables": ["orders", "customers"], "user": "ana"}),
            json!({"query": "select 2", "table": "orders", "user": "bo"}),
            json!({"query": "select 3", "tables": ["orders"], "user": "ana"}),
            json!({"query": "select 4"}),
            json!({"query": "select 5", "tables": []}),
        ];
        for (i, record) in records.into_iter().enumerate() {
            assert!(processor
                .process(&format!("record {}", i + 1), record, &mut status)
                .is_empty());
        }
        let rows = processor.finish(&mut status);

        assert_eq!(status.processed, 4);
        assert_eq!(status.failures.len(), 1);
        assert_eq!(status.failures[0].name, "record 4");
        assert_eq!(status.warnings.len(), 1);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["table"], "customers");
        assert_eq!(rows[0]["queryCount"], 1);
        assert_eq!(rows[1]["table"], "orders");
        assert_eq!(rows[1]["queryCount"], 3);
        assert_eq!(rows[1]["users"], json!(["ana", "bo"]));
    }

    #[test]
    fn test_non_string_table_is_a_failure() {
        let mut processor = UsageProcessor::new("warehouse");
        let mut status = StepStatus::new("usage");
        processor.process("record 1", json!({"tables": ["a", 3]}), &mut status);
        assert_eq!(status.failures.len(), 1);
        assert!(processor.finish(&mut status).is_empty());
    }
}
