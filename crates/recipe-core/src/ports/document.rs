//! Raw documents as they come back from the store.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Field map of a single document.
pub type DocumentData = Map<String, Value>;

/// A document read from a collection, with its id attached.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub id: String,
    pub data: DocumentData,
}

impl DocumentSnapshot {
    pub fn new(id: impl Into<String>, data: DocumentData) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Look up a top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Deserialize the field map into a typed value.
    ///
    /// The document id is not part of the field map; callers attach it.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.data.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Named {
        name: String,
    }

    #[test]
    fn test_decode_reads_fields() {
        let data = json!({ "name": "Desserts" }).as_object().cloned().unwrap();
        let doc = DocumentSnapshot::new("c1", data);

        let named: Named = doc.decode().unwrap();
        assert_eq!(named.name, "Desserts");
        assert_eq!(doc.get("name"), Some(&json!("Desserts")));
    }
}
