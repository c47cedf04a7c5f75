//! Submitted entries and the forms they belong to
//!
//! An [`Entry`] is a flat map from field id (or entry metadata key) to the
//! submitted value, exactly as the host stores it. Multi-input fields keep
//! one key per input (`"1.3"`, `"1.6"`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single form submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry {
    values: BTreeMap<String, serde_json::Value>,
}

impl Entry {
    /// Create an empty entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value (builder style)
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Raw value stored under `key`
    pub fn raw(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Value stored under `key`, rendered as text
    ///
    /// Strings are returned as-is, numbers and booleans are formatted, lists
    /// are joined with `", "`, and null becomes the empty string.
    pub fn text(&self, key: &str) -> Option<String> {
        self.values.get(key).map(render_value)
    }

    /// True when the entry holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> FromIterator<(K, V)> for Entry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(render_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Form definition, used to resolve field references
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Form {
    /// Form identifier
    #[serde(default)]
    pub id: u64,

    /// Form title
    #[serde(default)]
    pub title: String,

    /// Field definitions
    #[serde(default)]
    pub fields: Vec<FormField>,
}

impl Form {
    /// Look up a field by id
    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// A single form field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    /// Field id (`"3"`)
    pub id: String,

    /// Field type (`"email"`, `"name"`, `"checkbox"`, ...)
    #[serde(rename = "type", default)]
    pub field_type: String,

    /// Admin-facing label
    #[serde(default)]
    pub label: String,

    /// Sub-inputs of a multi-input field
    #[serde(default)]
    pub inputs: Vec<FieldInput>,
}

/// One input of a multi-input field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldInput {
    /// Input id (`"1.3"`)
    pub id: String,

    /// Input label
    #[serde(default)]
    pub label: String,
}
