use serde::Deserialize;

use super::{Recipe, collections, loose};
use crate::error::DomainError;
use crate::ports::{DocumentSnapshot, Fields};

/// A recipe saved to a user's collection.
///
/// The recipe fields are copied at save time and do not follow later edits
/// of the recipe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    #[serde(skip)]
    pub id: String,
    pub user_id: String,
    pub recipe_id: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub recipe_title: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub recipe_img: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub recipe_category: String,
}

impl SaveRecord {
    /// Document id for a (user, recipe) pair. Saving twice hits the same key.
    pub fn key(user_id: &str, recipe_id: &str) -> String {
        format!("{user_id}_{recipe_id}")
    }

    pub fn snapshot(user_id: &str, recipe: &Recipe) -> Self {
        Self {
            id: Self::key(user_id, &recipe.id),
            user_id: user_id.to_string(),
            recipe_id: recipe.id.clone(),
            recipe_title: recipe.title.clone(),
            recipe_img: recipe.img.clone(),
            recipe_category: recipe.category.clone(),
        }
    }

    pub fn from_document(doc: &DocumentSnapshot) -> Result<Self, DomainError> {
        let mut record: SaveRecord = doc.decode().map_err(|e| DomainError::Malformed {
            collection: collections::SAVES,
            id: doc.id.clone(),
            reason: e.to_string(),
        })?;
        record.id = doc.id.clone();
        Ok(record)
    }

    pub fn to_fields(&self) -> Fields {
        Fields::new()
            .set("userId", self.user_id.as_str())
            .set("recipeId", self.recipe_id.as_str())
            .set("recipeTitle", self.recipe_title.as_str())
            .set("recipeImg", self.recipe_img.as_str())
            .set("recipeCategory", self.recipe_category.as_str())
            .server_timestamp("savedAt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_keyed_by_user_and_recipe() {
        let recipe = Recipe {
            id: "r9".to_string(),
            title: "Tiramisu".to_string(),
            category: "Desserts".to_string(),
            ..Recipe::default()
        };

        let record = SaveRecord::snapshot("u1", &recipe);
        assert_eq!(record.id, "u1_r9");
        assert_eq!(record.id, SaveRecord::key("u1", "r9"));
        assert_eq!(record.recipe_title, "Tiramisu");
    }
}
