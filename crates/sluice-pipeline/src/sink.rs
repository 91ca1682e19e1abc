//! Record sinks.

use std::path::PathBuf;

use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::status::StepStatus;

/// Sink connector names accepted in `sink.type`.
pub const SINK_CONNECTORS: &[&str] = &["file", "console", "null"];

/// Validated sink settings.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkSpec {
    /// JSON lines written to a file.
    File { path: PathBuf },
    /// JSON lines written to stdout.
    Console,
    /// Records are counted and dropped.
    Null,
}

impl SinkSpec {
    pub fn connector(&self) -> &'static str {
        match self {
            SinkSpec::File { .. } => "file",
            SinkSpec::Console => "console",
            SinkSpec::Null => "null",
        }
    }
}

/// An open sink for one run.
pub struct Sink {
    spec: SinkSpec,
    writer: Option<BufWriter<File>>,
    failed_open: bool,
}

impl Sink {
    pub fn new(spec: SinkSpec) -> Self {
        Self {
            spec,
            writer: None,
            failed_open: false,
        }
    }

    /// Acquire output resources. A failure is recorded and later writes are
    /// skipped.
    pub async fn open(&mut self, status: &mut StepStatus) {
        let SinkSpec::File { path } = &self.spec else {
            return;
        };
        match File::create(path).await {
            Ok(file) => {
                debug!(path = %path.display(), "Opened sink file");
                self.writer = Some(BufWriter::new(file));
            }
            Err(e) => {
                self.failed_open = true;
                status.fail(path.display().to_string(), format!("cannot create sink file: {e}"));
            }
        }
    }

    pub async fn write(&mut self, label: &str, record: &Value, status: &mut StepStatus) {
        if self.failed_open {
            return;
        }
        match &self.spec {
            SinkSpec::Null => status.record_processed(),
            SinkSpec::Console => {
                println!("{record}");
                status.record_processed();
            }
            SinkSpec::File { .. } => {
                let Some(writer) = self.writer.as_mut() else {
                    status.fail(label, "sink is not open");
                    return;
                };
                let mut line = record.to_string();
                line.push('\n');
                match writer.write_all(line.as_bytes()).await {
                    Ok(()) => status.record_processed(),
                    Err(e) => status.fail(label, format!("write failed: {e}")),
                }
            }
        }
    }

    /// Flush buffered output.
    pub async fn flush(&mut self, status: &mut StepStatus) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.flush().await {
                status.fail(self.spec.connector(), format!("flush failed: {e}"));
            }
        }
    }

    /// Release the output handle. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.writer.take().is_some() {
            debug!(sink = self.spec.connector(), "Closed sink");
        }
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }
}
