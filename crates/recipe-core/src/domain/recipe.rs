use serde::Deserialize;
use serde_json::Value;

use super::loose;
use crate::error::DomainError;
use crate::ports::{DocumentSnapshot, Fields};

use super::collections;

/// Separator between ingredients when they are edited or stored as one string.
pub const INGREDIENT_DELIMITER: char = ',';
/// Separator between instruction steps when edited or stored as one string.
pub const INSTRUCTION_DELIMITER: char = '\n';

/// Recipe entity - one entry of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub title: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub category: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub description: String,
    /// Image reference (URL).
    #[serde(default, deserialize_with = "loose::text")]
    pub img: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub prep_time: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub cook_time: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub servings: String,
    #[serde(default, deserialize_with = "loose::comma_list")]
    pub ingredients: Vec<String>,
    #[serde(default, deserialize_with = "loose::line_list")]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Recipe {
    /// Map a `mealsList` document, attaching its id.
    pub fn from_document(doc: &DocumentSnapshot) -> Result<Self, DomainError> {
        let mut recipe: Recipe = doc.decode().map_err(|e| DomainError::Malformed {
            collection: collections::RECIPES,
            id: doc.id.clone(),
            reason: e.to_string(),
        })?;
        recipe.id = doc.id.clone();
        Ok(recipe)
    }

    /// Case-insensitive substring match over title and category.
    pub fn matches_text(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.category.to_lowercase().contains(&needle)
    }

    /// Field writes for this recipe. The id is the document key, not a field.
    ///
    /// `notes` is always written, as null when absent, so a merge update
    /// clears notes that were removed.
    pub fn to_fields(&self) -> Fields {
        let notes = self.notes.as_deref().map_or(Value::Null, Value::from);
        Fields::new()
            .set("title", self.title.as_str())
            .set("category", self.category.as_str())
            .set("description", self.description.as_str())
            .set("img", self.img.as_str())
            .set("prepTime", self.prep_time.as_str())
            .set("cookTime", self.cook_time.as_str())
            .set("servings", self.servings.as_str())
            .set("ingredients", Value::from(self.ingredients.clone()))
            .set("instructions", Value::from(self.instructions.clone()))
            .set("notes", notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FieldValue;
    use serde_json::json;

    fn doc(id: &str, value: Value) -> DocumentSnapshot {
        DocumentSnapshot::new(id, value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_from_document_normalizes_delimited_strings() {
        let recipe = Recipe::from_document(&doc(
            "r1",
            json!({
                "title": "Pancakes",
                "category": "Breakfast",
                "prepTime": 10,
                "servings": "4",
                "ingredients": "flour, milk , eggs",
                "instructions": "Mix\n\nFry\n",
            }),
        ))
        .unwrap();

        assert_eq!(recipe.id, "r1");
        assert_eq!(recipe.prep_time, "10");
        assert_eq!(recipe.cook_time, "");
        assert_eq!(recipe.ingredients, vec!["flour", "milk", "eggs"]);
        assert_eq!(recipe.instructions, vec!["Mix", "Fry"]);
    }

    #[test]
    fn test_from_document_accepts_sequences_and_nulls() {
        let recipe = Recipe::from_document(&doc(
            "r2",
            json!({
                "title": "Soup",
                "category": null,
                "ingredients": ["water", " salt "],
                "instructions": ["Boil", "Serve"],
            }),
        ))
        .unwrap();

        assert_eq!(recipe.category, "");
        assert_eq!(recipe.ingredients, vec!["water", "salt"]);
        assert_eq!(recipe.instructions, vec!["Boil", "Serve"]);
    }

    #[test]
    fn test_matches_text_is_case_insensitive() {
        let recipe = Recipe {
            title: "Chocolate Cake".to_string(),
            category: "Desserts".to_string(),
            ..Recipe::default()
        };

        assert!(recipe.matches_text("CHOC"));
        assert!(recipe.matches_text("sert"));
        assert!(!recipe.matches_text("soup"));
    }

    #[test]
    fn test_to_fields_writes_sequences() {
        let recipe = Recipe {
            id: "ignored".to_string(),
            title: "Tea".to_string(),
            ingredients: vec!["water".to_string(), "leaves".to_string()],
            ..Recipe::default()
        };

        let fields = recipe.to_fields();
        let ingredients = fields
            .iter()
            .find(|(name, _)| *name == "ingredients")
            .map(|(_, value)| value.clone());

        assert_eq!(
            ingredients,
            Some(FieldValue::Value(json!(["water", "leaves"])))
        );
        assert!(fields.iter().all(|(name, _)| name != "id"));
        assert!(
            fields
                .iter()
                .any(|(name, value)| name == "notes" && *value == FieldValue::Value(Value::Null))
        );
    }

    #[test]
    fn test_null_notes_read_as_none() {
        let recipe =
            Recipe::from_document(&doc("r1", json!({ "title": "Tea", "notes": null }))).unwrap();

        assert_eq!(recipe.notes, None);
    }
}
