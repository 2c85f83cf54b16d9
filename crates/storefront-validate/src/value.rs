//! Field values as seen by validation rules.
//!
//! Form inputs and request payloads arrive loosely typed: a text box, a
//! number spinner, a file picker, or nothing at all. [`Value`] captures those
//! shapes so rules can coerce them the same way regardless of origin.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata for an uploaded file.
///
/// Clients report `size` and/or `type`; either may be missing. Only those two
/// take part in validation. `name` is carried for display and string
/// coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// File name as reported by the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// MIME type, e.g. `image/png`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FileInfo {
    /// Create file metadata from a byte size and MIME type.
    pub fn new(size: u64, content_type: impl Into<String>) -> Self {
        Self {
            name: None,
            size: Some(size),
            content_type: Some(content_type.into()),
        }
    }

    /// Attach a file name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Read file metadata from a JSON object.
    ///
    /// The object is a file if it has a non-negative numeric `size` or a
    /// string `type`. Fractional sizes round up to whole bytes.
    pub fn from_json(object: &serde_json::Map<String, serde_json::Value>) -> Option<Self> {
        let size = object
            .get("size")
            .and_then(serde_json::Value::as_f64)
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n.ceil() as u64);
        let content_type = object
            .get("type")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        if size.is_none() && content_type.is_none() {
            return None;
        }

        Some(Self {
            name: object
                .get("name")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
            size,
            content_type,
        })
    }
}

/// A dynamically typed field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value (absent field, cleared input, JSON `null`)
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    File(FileInfo),
}

impl Value {
    /// Whether the value counts as "not provided".
    ///
    /// Null and blank text are empty. Numbers, booleans and files never are.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Coerce to a number.
    ///
    /// Text is trimmed and parsed as `f64`; non-finite results are rejected.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Borrow the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the file metadata, if this is a file value.
    pub fn as_file(&self) -> Option<&FileInfo> {
        match self {
            Value::File(f) => Some(f),
            _ => None,
        }
    }

    /// Build a value from a JSON payload field.
    ///
    /// Objects carrying a numeric `size` or a string `type` are files (see
    /// [`FileInfo::from_json`]).
    /// Other arrays and objects fall back to their JSON text.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Object(object) => FileInfo::from_json(object)
                .map(Value::File)
                .unwrap_or_else(|| Value::Text(json.to_string())),
            serde_json::Value::Array(_) => Value::Text(json.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::File(file) => f.write_str(file.name.as_deref().unwrap_or_default()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<FileInfo> for Value {
    fn from(file: FileInfo) -> Self {
        Value::File(file)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from_json(json)
    }
}
