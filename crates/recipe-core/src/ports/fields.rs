//! Field writes, including the backend-side transforms the client relies on.

use serde_json::Value;

use super::DocumentData;

/// The value written to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Plain value, replaces whatever was there.
    Value(Value),
    /// Timestamp assigned by the backend when the write is applied.
    ServerTimestamp,
    /// Add each element not already present. Applied atomically by the backend.
    ArrayUnion(Vec<Value>),
    /// Remove every occurrence of each element. Applied atomically by the backend.
    ArrayRemove(Vec<Value>),
}

/// Ordered list of field writes for one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FieldValue::Value(value.into()))
    }

    pub fn server_timestamp(self, field: impl Into<String>) -> Self {
        self.with(field, FieldValue::ServerTimestamp)
    }

    pub fn array_union(self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.with(field, FieldValue::ArrayUnion(values))
    }

    pub fn array_remove(self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.with(field, FieldValue::ArrayRemove(values))
    }

    /// Append a write. A later write to the same field wins.
    pub fn with(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        let field = field.into();
        self.entries.retain(|(name, _)| *name != field);
        self.entries.push((field, value));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<DocumentData> for Fields {
    fn from(data: DocumentData) -> Self {
        Self {
            entries: data
                .into_iter()
                .map(|(name, value)| (name, FieldValue::Value(value)))
                .collect(),
        }
    }
}

impl IntoIterator for Fields {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
