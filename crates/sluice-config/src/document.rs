//! Untyped configuration document.

use std::fmt;

use serde_json::{Map, Value};

/// Key fragments whose values are masked by [`ConfigDocument::redacted`].
const SECRET_KEY_MARKERS: &[&str] = &[
    "password",
    "secret",
    "token",
    "apikey",
    "privatekey",
    "credentials",
];

/// Replacement text for masked values.
const REDACTED: &str = "**********";

/// A parsed configuration file: an arbitrarily nested mapping of string keys
/// to JSON-compatible values.
///
/// The root is always an object; [`crate::load_config_file`] refuses anything
/// else. Once loaded the document is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: Map<String, Value>,
}

impl ConfigDocument {
    /// Wrap a value, returning it back if the root is not an object.
    pub fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(other),
        }
    }

    /// The whole document as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Look up a value by dotted path, e.g. `source.sourceConfig.config.type`.
    ///
    /// Numeric segments index into sequences.
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// String value at a dotted path, if present and a string.
    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.pointer(path).and_then(Value::as_str)
    }

    /// Declared source connector (`source.type`).
    pub fn source_type(&self) -> Option<&str> {
        self.str_at("source.type")
    }

    /// Declared service name (`source.serviceName`).
    pub fn service_name(&self) -> Option<&str> {
        self.str_at("source.serviceName")
    }

    /// Declared pipeline type (`source.sourceConfig.config.type`).
    pub fn pipeline_type(&self) -> Option<&str> {
        self.str_at("source.sourceConfig.config.type")
    }

    /// Declared sink connector (`sink.type`).
    pub fn sink_type(&self) -> Option<&str> {
        self.str_at("sink.type")
    }

    /// A copy of the document with secret-looking values masked, for logging.
    pub fn redacted(&self) -> Value {
        let mut value = self.to_value();
        redact(&mut value);
        value
    }
}

impl fmt::Display for ConfigDocument {
    /// Compact JSON with secrets masked.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

fn is_secret_key(key: &str) -> bool {
    let normalized: String = key
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    SECRET_KEY_MARKERS
        .iter()
        .any(|marker| normalized.contains(marker))
}

fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if is_secret_key(key) && !child.is_object() && !child.is_array() {
                    *child = Value::String(REDACTED.to_string());
                } else {
                    redact(child);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> ConfigDocument {
        ConfigDocument::from_value(value).unwrap()
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        assert!(ConfigDocument::from_value(json!([1, 2])).is_err());
        assert!(ConfigDocument::from_value(json!("text")).is_err());
    }

    #[test]
    fn test_pointer_walks_objects_and_arrays() {
        let d = doc(json!({
            "source": {
                "type": "file",
                "sourceConfig": {"config": {"type": "DatabaseUsage"}},
                "items": [{"name": "a"}, {"name": "b"}]
            }
        }));
        assert_eq!(d.source_type(), Some("file"));
        assert_eq!(d.pipeline_type(), Some("DatabaseUsage"));
        assert_eq!(d.str_at("source.items.1.name"), Some("b"));
        assert!(d.pointer("source.items.7").is_none());
        assert!(d.pointer("source.type.deeper").is_none());
        assert!(d.service_name().is_none());
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let d = doc(json!({
            "source": {
                "serviceConnection": {
                    "config": {
                        "username": "admin",
                        "password": "hunter2",
                        "authToken": "abc",
                        "api_key": "xyz"
                    }
                }
            }
        }));
        let redacted = d.redacted();
        let config = &redacted["source"]["serviceConnection"]["config"];
        assert_eq!(config["username"], "admin");
        assert_eq!(config["password"], REDACTED);
        assert_eq!(config["authToken"], REDACTED);
        assert_eq!(config["api_key"], REDACTED);
        assert!(!d.to_string().contains("hunter2"));
    }
}
