use serde::Deserialize;

use super::collections;
use crate::error::DomainError;
use crate::ports::DocumentSnapshot;

/// Category entity - populates the filter chips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Older category documents carry `title` instead of `name`.
#[derive(Deserialize)]
struct CategoryDocument {
    name: Option<String>,
    title: Option<String>,
}

impl Category {
    pub fn from_document(doc: &DocumentSnapshot) -> Result<Self, DomainError> {
        let malformed = |reason: String| DomainError::Malformed {
            collection: collections::CATEGORIES,
            id: doc.id.clone(),
            reason,
        };

        let raw: CategoryDocument = doc.decode().map_err(|e| malformed(e.to_string()))?;
        let name = raw
            .name
            .or(raw.title)
            .ok_or_else(|| malformed("missing name".to_string()))?;

        Ok(Self {
            id: doc.id.clone(),
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_falls_back_to_title() {
        let data = json!({ "title": "Mains" }).as_object().cloned().unwrap();
        let category = Category::from_document(&DocumentSnapshot::new("c1", data)).unwrap();
        assert_eq!(category.name, "Mains");
    }

    #[test]
    fn test_missing_name_is_malformed() {
        let data = json!({ "order": 1 }).as_object().cloned().unwrap();
        let result = Category::from_document(&DocumentSnapshot::new("c2", data));
        assert!(matches!(result, Err(DomainError::Malformed { .. })));
    }
}
