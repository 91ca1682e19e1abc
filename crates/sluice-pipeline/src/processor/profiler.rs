//! Column profiling.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value, json};

use super::{Processor, json_type};
use crate::status::StepStatus;

#[derive(Debug, Default)]
struct ColumnProfile {
    present: usize,
    nulls: usize,
    distinct: HashSet<String>,
    numeric: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl ColumnProfile {
    fn observe(&mut self, value: &Value) {
        self.present += 1;
        if value.is_null() {
            self.nulls += 1;
            return;
        }
        self.distinct.insert(value.to_string());
        if let Some(n) = value.as_f64() {
            self.numeric += 1;
            self.sum += n;
            self.min = Some(self.min.map_or(n, |m| m.min(n)));
            self.max = Some(self.max.map_or(n, |m| m.max(n)));
        }
    }

    fn to_json(&self, row_count: usize) -> Value {
        // Columns absent from a row count as nulls for that row.
        let null_count = self.nulls + row_count.saturating_sub(self.present);
        let mean = (self.numeric > 0).then(|| self.sum / self.numeric as f64);
        json!({
            "valuesCount": self.present - self.nulls,
            "nullCount": null_count,
            "distinctCount": self.distinct.len(),
            "min": self.min,
            "max": self.max,
            "mean": mean,
        })
    }
}

/// Accumulates per-column statistics over every row and emits a single
/// profile once the source is exhausted.
pub struct ProfilerProcessor {
    service: String,
    rows: usize,
    columns: BTreeMap<String, ColumnProfile>,
}

impl ProfilerProcessor {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            rows: 0,
            columns: BTreeMap::new(),
        }
    }
}

impl Processor for ProfilerProcessor {
    fn name(&self) -> &'static str {
        "profiler"
    }

    fn process(&mut self, label: &str, record: Value, status: &mut StepStatus) -> Vec<Value> {
        let Some(row) = record.as_object() else {
            status.fail(label, format!("row must be an object, got {}", json_type(&record)));
            return Vec::new();
        };
        self.rows += 1;
        for (column, value) in row {
            self.columns.entry(column.clone()).or_default().observe(value);
        }
        status.record_processed();
        Vec::new()
    }

    fn finish(&mut self, status: &mut StepStatus) -> Vec<Value> {
        if self.rows == 0 {
            status.warn("no rows to profile");
            return Vec::new();
        }
        let columns: Map<String, Value> = self
            .columns
            .iter()
            .map(|(name, profile)| (name.clone(), profile.to_json(self.rows)))
            .collect();
        vec![json!({
            "service": self.service,
            "rowCount": self.rows,
            "columns": columns,
        })]
    }
}
