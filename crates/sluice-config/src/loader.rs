//! Reading workflow configuration files from disk.
//!
//! The format is chosen from the file extension. Environment references
//! (`$NAME` and `${NAME}`) are expanded in the raw text before parsing so that
//! secrets can stay out of the file; references to unset variables are kept
//! verbatim.

use std::path::Path;

use serde_json::Value;

use crate::{ConfigDocument, ConfigError, Result};

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format for a path from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: if extension.is_empty() {
                    "<none>".to_string()
                } else {
                    format!(".{extension}")
                },
            }),
        }
    }
}

/// Load a workflow configuration document from a JSON or YAML file.
pub fn load_config_file(path: &Path) -> Result<ConfigDocument> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let format = ConfigFormat::from_path(path)?;
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config(&expand_vars(&raw), format, path)
}

/// Parse already-expanded config text. `path` is only used in error messages.
pub fn parse_config(text: &str, format: ConfigFormat, path: &Path) -> Result<ConfigDocument> {
    let value: Value = match format {
        ConfigFormat::Json => serde_json::from_str(text).map_err(|e| ConfigError::ParseJson {
            path: path.to_path_buf(),
            source: e,
        })?,
        ConfigFormat::Yaml => serde_yaml::from_str(text).map_err(|e| ConfigError::ParseYaml {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
    };
    ConfigDocument::from_value(value).map_err(|other| ConfigError::NotAMapping {
        path: path.to_path_buf(),
        found: value_kind(&other),
    })
}

/// Expand `$NAME` / `${NAME}` from the process environment.
pub fn expand_vars(text: &str) -> String {
    expand_vars_with(text, |name| std::env::var(name).ok())
}

/// Expand `$NAME` / `${NAME}` using `lookup`. Unknown names are left as written.
pub fn expand_vars_with<F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                let name = &braced[..end];
                let consumed = 2 + end + 1;
                let value = if is_var_name(name) { lookup(name) } else { None };
                match value {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&rest[pos..pos + consumed]),
                }
                rest = &rest[pos + consumed..];
                continue;
            }
        } else {
            let len = after
                .char_indices()
                .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
                .map(|(i, _)| i)
                .unwrap_or(after.len());
            if len > 0 {
                let name = &after[..len];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('$');
                        out.push_str(name);
                    }
                }
                rest = &after[len..];
                continue;
            }
        }

        out.push('$');
        rest = after;
    }

    out.push_str(rest);
    out
}

fn is_var_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
