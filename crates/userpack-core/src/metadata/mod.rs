//! Userscript metadata block codec
//!
//! A metadata block is the comment header a userscript host reads before
//! running the script:
//!
//! ```text
//! // ==UserScript==
//! // @name      Example
//! // @match     https://example.com/*
//! // @match     https://example.org/*
//! // @noframes
//! // ==/UserScript==
//! ```
//!
//! [`parse`] turns such a block into a [`MetadataRecord`] and [`serialize`]
//! turns a record back into text. Repeated keys become
//! [`MetadataValue::Array`], keys without a value become
//! [`MetadataValue::Flag`].

mod error;
mod parser;
mod writer;

pub use error::MetadataError;
pub use parser::parse;
pub use writer::serialize;

use indexmap::map::{IntoIter, Iter};
use indexmap::IndexMap;

/// Opening marker line of a metadata block
pub const OPEN_MARKER: &str = "// ==UserScript==";

/// Closing marker line of a metadata block
pub const CLOSE_MARKER: &str = "// ==/UserScript==";

/// Prefix every metadata line starts with
pub const LINE_PREFIX: &str = "// ";

/// Value held by a single metadata key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    /// `// @key value`
    String(String),
    /// The same key repeated, in declaration order
    Array(Vec<String>),
    /// `// @key` with no value. `Flag(false)` is dropped on serialization.
    Flag(bool),
}

impl MetadataValue {
    /// Convert a loosely typed configuration value into a metadata value.
    ///
    /// Accepted shapes are strings, numbers, booleans and arrays of strings
    /// or numbers. Anything else is reported as
    /// [`MetadataError::UnsupportedValue`] naming `key`.
    pub fn from_json(key: &str, value: &serde_json::Value) -> Result<Self, MetadataError> {
        use serde_json::Value;

        match value {
            Value::String(s) => Ok(MetadataValue::String(s.clone())),
            Value::Number(n) => Ok(MetadataValue::String(n.to_string())),
            Value::Bool(b) => Ok(MetadataValue::Flag(*b)),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => Ok(n.to_string()),
                    other => Err(MetadataError::unsupported(
                        key,
                        format!("array of {}", json_kind(other)),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(MetadataValue::Array),
            other => Err(MetadataError::unsupported(key, json_kind(other))),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(values: Vec<String>) -> Self {
        MetadataValue::Array(values)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Flag(value)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Ordered key → value mapping for one metadata block.
///
/// Keys keep the position of their first insertion. Replacing the value of
/// an existing key does not move it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    entries: IndexMap<String, MetadataValue>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    /// Value of `key` if it holds a single string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(MetadataValue::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Set `key` to `value`, keeping its position if already present
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Option<MetadataValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove `key`, shifting later keys up so order is preserved
    pub fn remove(&mut self, key: &str) -> Option<MetadataValue> {
        self.entries.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_, String, MetadataValue> {
        self.entries.iter()
    }

    /// Record one `// @key value` declaration.
    ///
    /// The first value is stored as a string, a second one promotes the key
    /// to an array, later ones append. A key already declared as a flag is
    /// a conflict.
    pub fn push_value(
        &mut self,
        key: &str,
        value: impl Into<String>,
    ) -> Result<(), MetadataError> {
        let value = value.into();
        let Some(entry) = self.entries.get_mut(key) else {
            self.entries
                .insert(key.to_string(), MetadataValue::String(value));
            return Ok(());
        };

        match entry {
            MetadataValue::String(previous) => {
                let previous = std::mem::take(previous);
                *entry = MetadataValue::Array(vec![previous, value]);
            }
            MetadataValue::Array(values) => values.push(value),
            MetadataValue::Flag(_) => {
                return Err(MetadataError::ConflictingDeclaration {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Record one `// @key` declaration. A key that already holds a value
    /// is a conflict; repeating a flag is not.
    pub fn push_flag(&mut self, key: &str) -> Result<(), MetadataError> {
        match self.entries.get(key) {
            Some(MetadataValue::String(_) | MetadataValue::Array(_)) => {
                Err(MetadataError::ConflictingDeclaration {
                    key: key.to_string(),
                })
            }
            _ => {
                self.entries.insert(key.to_string(), MetadataValue::Flag(true));
                Ok(())
            }
        }
    }
}

impl<'a> IntoIterator for &'a MetadataRecord {
    type Item = (&'a String, &'a MetadataValue);
    type IntoIter = Iter<'a, String, MetadataValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for MetadataRecord {
    type Item = (String, MetadataValue);
    type IntoIter = IntoIter<String, MetadataValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<MetadataValue>> FromIterator<(K, V)> for MetadataRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
