//! Log sinks for one CLI invocation.
//!
//! Two layers: human-readable events on stderr, and a daily-rolling JSON file
//! that always records debug detail (stack traces included) for later
//! inspection. The resulting `Dispatch` is handed to the orchestrator rather
//! than installed globally.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const CONSOLE_FILTER: &str =
    "sluice=info,sluice_orchestrator=info,sluice_pipeline=info,sluice_config=info,warn";
const VERBOSE_FILTER: &str =
    "sluice=debug,sluice_orchestrator=debug,sluice_pipeline=debug,sluice_config=debug,info";
const FILE_FILTER: &str =
    "sluice=trace,sluice_orchestrator=trace,sluice_pipeline=trace,sluice_config=trace,info";

/// Keeps the file writer alive; dropping it flushes pending lines.
pub struct Logging {
    pub dispatch: Dispatch,
    pub log_dir: Option<PathBuf>,
    _guard: Option<WorkerGuard>,
}

/// `<config dir>/sluice/logs`, or `./logs` when there is no config dir.
pub fn default_log_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("sluice").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn file_appender(dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory '{}'", dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("sluice")
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("failed to open log file in '{}'", dir.display()))
}

impl Logging {
    /// Build the dispatch. A log directory that cannot be used costs the file
    /// layer only; console logging always works.
    pub fn init(verbose: bool, log_dir: Option<PathBuf>) -> Self {
        let dir = log_dir.unwrap_or_else(default_log_dir);
        let (file_writer, guard, warning) = match file_appender(&dir) {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                (Some(writer), Some(guard), None)
            }
            Err(e) => (None, None, Some(format!("{e:#}"))),
        };

        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(console::colors_enabled_stderr())
            .with_target(verbose)
            .with_filter(EnvFilter::new(if verbose {
                VERBOSE_FILTER
            } else {
                CONSOLE_FILTER
            }));
        let file_layer = file_writer.map(|writer| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::new(FILE_FILTER))
        });

        let dispatch = Dispatch::new(
            tracing_subscriber::registry()
                .with(console_layer)
                .with(file_layer),
        );
        if let Some(warning) = warning {
            tracing::dispatcher::with_default(&dispatch, || {
                tracing::warn!("file logging disabled: {warning}");
            });
        }

        Self {
            dispatch,
            log_dir: guard.is_some().then_some(dir),
            _guard: guard,
        }
    }
}
