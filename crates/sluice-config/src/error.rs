//! Configuration error types.

use std::path::PathBuf;

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading a workflow configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config path does not point at a file.
    #[error("config file '{}' does not exist", .path.display())]
    NotFound { path: PathBuf },

    /// Failed to read a config file.
    #[error("failed to read config file '{}': {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file extension is not one we know how to parse.
    #[error(
        "unsupported config format '{extension}' for '{}': \
         only .json, .yaml and .yml are supported",
        .path.display()
    )]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Failed to parse JSON.
    #[error("failed to parse JSON config '{}': {source}", .path.display())]
    ParseJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to parse YAML.
    #[error("failed to parse YAML config '{}': {message}", .path.display())]
    ParseYaml { path: PathBuf, message: String },

    /// The document parsed, but its root is not a key/value mapping.
    #[error("config '{}' must contain a mapping at the top level, found {found}", .path.display())]
    NotAMapping { path: PathBuf, found: &'static str },
}

impl ConfigError {
    /// Suggestions a user can act on, derived from the failure.
    pub fn hints(&self) -> Vec<String> {
        match self {
            ConfigError::NotFound { path } => vec![format!(
                "check the path passed with --config; it was resolved to '{}'",
                path.display()
            )],
            ConfigError::ReadFile { .. } => {
                vec!["make sure the file is readable by the current user".to_string()]
            }
            ConfigError::UnsupportedFormat { .. } => {
                vec!["rename the file with a .json, .yaml or .yml extension".to_string()]
            }
            ConfigError::ParseJson { source, .. } => vec![format!(
                "JSON syntax error near line {}, column {}",
                source.line(),
                source.column()
            )],
            ConfigError::ParseYaml { .. } => vec![
                "check indentation and quoting; YAML is whitespace sensitive".to_string(),
                "unquoted values starting with '$' or '{' often need quotes".to_string(),
            ],
            ConfigError::NotAMapping { .. } => vec![
                "the document must start with top-level keys such as `source` and `sink`"
                    .to_string(),
            ],
        }
    }
}
