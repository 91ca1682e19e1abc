//! Record sources.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::status::StepStatus;

/// Source connector names accepted in `source.type`.
pub const SOURCE_CONNECTORS: &[&str] = &["file", "inline"];

/// Layout of a file source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// One JSON array holding every record (`.json`).
    JsonArray,
    /// One JSON value per line (`.jsonl`, `.ndjson`, anything else).
    JsonLines,
}

impl RecordFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => RecordFormat::JsonArray,
            _ => RecordFormat::JsonLines,
        }
    }
}

/// Validated source settings.
#[derive(Debug, Clone)]
pub enum SourceSpec {
    File { path: PathBuf, format: RecordFormat },
    Inline { records: Vec<Value> },
}

/// A record read from a source, with the label used in diagnostics.
pub type LabeledRecord = (String, Value);

impl SourceSpec {
    /// Connector name.
    pub fn connector(&self) -> &'static str {
        match self {
            SourceSpec::File { .. } => "file",
            SourceSpec::Inline { .. } => "inline",
        }
    }

    /// Read every record. Unreadable input is recorded into `status`.
    pub async fn read(&self, status: &mut StepStatus) -> Vec<LabeledRecord> {
        match self {
            SourceSpec::Inline { records } => records
                .iter()
                .enumerate()
                .map(|(i, record)| {
                    status.record_processed();
                    (format!("record {}", i + 1), record.clone())
                })
                .collect(),
            SourceSpec::File { path, format } => {
                let content = match tokio::fs::read_to_string(path).await {
                    Ok(content) => content,
                    Err(e) => {
                        status.fail(
                            path.display().to_string(),
                            format!("cannot read source file: {e}"),
                        );
                        return Vec::new();
                    }
                };
                debug!(path = %path.display(), bytes = content.len(), "Read source file");
                match format {
                    RecordFormat::JsonArray => parse_array(path, &content, status),
                    RecordFormat::JsonLines => parse_lines(&content, status),
                }
            }
        }
    }
}

fn parse_array(path: &Path, content: &str, status: &mut StepStatus) -> Vec<LabeledRecord> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(records)) => records
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                status.record_processed();
                (format!("record {}", i + 1), record)
            })
            .collect(),
        Ok(_) => {
            status.fail(
                path.display().to_string(),
                "a .json source must contain an array of records",
            );
            Vec::new()
        }
        Err(e) => {
            status.fail(path.display().to_string(), format!("invalid JSON: {e}"));
            Vec::new()
        }
    }
}

fn parse_lines(content: &str, status: &mut StepStatus) -> Vec<LabeledRecord> {
    let mut records = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let label = format!("line {}", i + 1);
        match serde_json::from_str::<Value>(line) {
            Ok(record) => {
                status.record_processed();
                records.push((label, record));
            }
            Err(e) => status.fail_with_detail(label, format!("invalid JSON: {e}"), line),
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_record_format_from_extension() {
        assert_eq!(RecordFormat::from_path(Path::new("a.json")), RecordFormat::JsonArray);
        assert_eq!(RecordFormat::from_path(Path::new("a.jsonl")), RecordFormat::JsonLines);
        assert_eq!(RecordFormat::from_path(Path::new("a.log")), RecordFormat::JsonLines);
    }

    #[tokio::test]
    async fn test_inline_labels_records() {
        let spec = SourceSpec::Inline {
            records: vec![json!({"a": 1}), json!({"a": 2})],
        };
        let mut status = StepStatus::new("source");
        let records = spec.read(&mut status).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].0, "record 2");
        assert_eq!(status.processed, 2);
    }

    #[tokio::test]
    async fn test_json_lines_records_bad_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("queries.jsonl");
        std::fs::write(&path, "{\"table\": \"a\"}\n\nnot json\n{\"table\": \"b\"}\n").unwrap();

        let spec = SourceSpec::File {
            format: RecordFormat::from_path(&path),
            path,
        };
        let mut status = StepStatus::new("source");
        let records = spec.read(&mut status).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].0, "line 4");
        assert_eq!(status.processed, 2);
        assert_eq!(status.failures.len(), 1);
        assert_eq!(status.failures[0].name, "line 3");
        assert_eq!(status.failures[0].detail.as_deref(), Some("not json"));
    }

    #[tokio::test]
    async fn test_json_file_must_be_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entities.json");
        std::fs::write(&path, "{\"name\": \"orders\"}").unwrap();

        let spec = SourceSpec::File {
            format: RecordFormat::JsonArray,
            path,
        };
        let mut status = StepStatus::new("source");
        assert!(spec.read(&mut status).await.is_empty());
        assert_eq!(status.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_recorded_not_raised() {
        let spec = SourceSpec::File {
            path: PathBuf::from("/definitely/not/here.jsonl"),
            format: RecordFormat::JsonLines,
        };
        let mut status = StepStatus::new("source");
        assert!(spec.read(&mut status).await.is_empty());
        assert!(status.failures[0].error.contains("cannot read"));
    }
}
