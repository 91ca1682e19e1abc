//! Data quality assertions over a set of rows.

use std::collections::HashMap;

use serde_json::{Map, Value, json};
use sluice_config::TestCaseConfig;

use super::{Processor, json_type};
use crate::error::ValidationError;
use crate::status::StepStatus;

/// Supported assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum TestType {
    /// `columnValuesToBeNotNull`: missing or null values fail.
    NotNull,
    /// `columnValuesToBeBetween`: non-numeric or out-of-range values fail;
    /// nulls are skipped.
    Between { min: Option<f64>, max: Option<f64> },
    /// `columnValuesToBeUnique`: every repeated occurrence fails.
    Unique,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::NotNull => "columnValuesToBeNotNull",
            TestType::Between { .. } => "columnValuesToBeBetween",
            TestType::Unique => "columnValuesToBeUnique",
        }
    }
}

/// A validated test case.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub name: String,
    pub column: String,
    pub test_type: TestType,
}

impl TestCase {
    pub fn from_config(config: &TestCaseConfig) -> Result<Self, ValidationError> {
        let invalid = |message: String| ValidationError::InvalidTestCase {
            name: config.name.clone(),
            message,
        };
        if config.name.trim().is_empty() {
            return Err(invalid("name cannot be empty".into()));
        }
        if config.column.trim().is_empty() {
            return Err(invalid("column cannot be empty".into()));
        }
        let test_type = match config.test_type.as_str() {
            "columnValuesToBeNotNull" => TestType::NotNull,
            "columnValuesToBeUnique" => TestType::Unique,
            "columnValuesToBeBetween" => {
                let (min, max) = (config.min_value, config.max_value);
                if min.is_none() && max.is_none() {
                    return Err(invalid("needs minValue, maxValue or both".into()));
                }
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(invalid(format!("minValue {lo} is greater than maxValue {hi}")));
                    }
                }
                TestType::Between { min, max }
            }
            other => return Err(invalid(format!("unknown test type '{other}'"))),
        };
        Ok(Self {
            name: config.name.clone(),
            column: config.column.clone(),
            test_type,
        })
    }

    /// Number of rows that violate this case.
    fn failed_rows(&self, rows: &[Map<String, Value>]) -> usize {
        let values = rows.iter().map(|row| row.get(&self.column));
        match &self.test_type {
            TestType::NotNull => values.filter(|v| v.is_none_or(Value::is_null)).count(),
            TestType::Between { min, max } => values
                .flatten()
                .filter(|v| !v.is_null())
                .filter(|v| match v.as_f64() {
                    Some(n) => min.is_some_and(|lo| n < lo) || max.is_some_and(|hi| n > hi),
                    None => true,
                })
                .count(),
            TestType::Unique => {
                let mut counts: HashMap<String, usize> = HashMap::new();
                for value in values.flatten().filter(|v| !v.is_null()) {
                    *counts.entry(value.to_string()).or_default() += 1;
                }
                counts.values().map(|n| n - 1).sum()
            }
        }
    }
}

/// Collects rows, then evaluates every test case against them.
pub struct TestSuiteProcessor {
    service: String,
    cases: Vec<TestCase>,
    rows: Vec<Map<String, Value>>,
}

impl TestSuiteProcessor {
    pub fn new(service: &str, cases: Vec<TestCase>) -> Self {
        Self {
            service: service.to_string(),
            cases,
            rows: Vec::new(),
        }
    }
}

impl Processor for TestSuiteProcessor {
    fn name(&self) -> &'static str {
        "test-suite"
    }

    fn process(&mut self, label: &str, record: Value, status: &mut StepStatus) -> Vec<Value> {
        match record {
            Value::Object(row) => {
                self.rows.push(row);
                status.record_processed();
            }
            other => {
                let message = format!("row must be an object, got {}", json_type(&other));
                status.fail(label, message);
            }
        }
        Vec::new()
    }

    fn finish(&mut self, status: &mut StepStatus) -> Vec<Value> {
        let rows = std::mem::take(&mut self.rows);
        self.cases
            .iter()
            .map(|case| {
                if !rows.iter().any(|row| row.contains_key(&case.column)) {
                    status.warn(format!(
                        "test case '{}': column '{}' not found in any row",
                        case.name, case.column
                    ));
                }
                let failed = case.failed_rows(&rows);
                let result = if failed == 0 { "Success" } else { "Failed" };
                json!({
                    "service": self.service,
                    "testCase": case.name,
                    "column": case.column,
                    "testType": case.test_type.as_str(),
                    "result": result,
                    "failedRows": failed,
                    "rowCount": rows.len(),
                })
            })
            .collect()
    }
}
