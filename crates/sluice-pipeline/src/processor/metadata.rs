//! Entity metadata extraction.

use regex::Regex;
use serde_json::Value;
use sluice_config::FilterPattern;

use super::{Processor, json_type};
use crate::error::ValidationError;
use crate::status::StepStatus;

/// Include/exclude name filter.
///
/// A name passes if it matches any include (or there are none) and matches
/// no exclude.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl NameFilter {
    /// Compile the configured patterns.
    pub fn from_config(pattern: Option<&FilterPattern>) -> Result<Self, ValidationError> {
        let Some(pattern) = pattern else {
            return Ok(Self::default());
        };
        Ok(Self {
            includes: compile(&pattern.includes)?,
            excludes: compile(&pattern.excludes)?,
        })
    }

    pub fn allows(&self, name: &str) -> bool {
        let included = self.includes.is_empty() || self.includes.iter().any(|r| r.is_match(name));
        included && !self.excludes.iter().any(|r| r.is_match(name))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, ValidationError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| ValidationError::InvalidPattern {
                pattern: p.clone(),
                source: e,
            })
        })
        .collect()
}

/// Checks entities, applies the name filter and qualifies names with the
/// service.
pub struct MetadataProcessor {
    service: String,
    filter: NameFilter,
}

impl MetadataProcessor {
    pub fn new(service: &str, filter: NameFilter) -> Self {
        Self {
            service: service.to_string(),
            filter,
        }
    }
}

impl Processor for MetadataProcessor {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn process(&mut self, label: &str, record: Value, status: &mut StepStatus) -> Vec<Value> {
        let mut entity = match record {
            Value::Object(entity) => entity,
            other => {
                status.fail(label, format!("entity must be an object, got {}", json_type(&other)));
                return Vec::new();
            }
        };
        let Some(name) = entity.get("name").and_then(Value::as_str).map(str::to_string) else {
            status.fail(label, "entity has no string field 'name'");
            return Vec::new();
        };
        if !entity.get("entityType").is_some_and(Value::is_string) {
            status.fail(&name, "entity has no string field 'entityType'");
            return Vec::new();
        }
        if !self.filter.allows(&name) {
            status.filter(name);
            return Vec::new();
        }

        entity.insert("service".into(), Value::String(self.service.clone()));
        entity.insert(
            "fullyQualifiedName".into(),
            Value::String(format!("{}.{}", self.service, name)),
        );
        status.record_processed();
        vec![Value::Object(entity)]
    }
}
