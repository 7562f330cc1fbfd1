//! Remote data gateway - typed reads over the recipe and category collections.
//!
//! Backend failures never reach the caller: they are logged and reads come
//! back empty.

use std::sync::Arc;

use recipe_core::DomainError;
use recipe_core::domain::{Category, Recipe, collections};
use recipe_core::ports::{Direction, DocumentSnapshot, DocumentStore, Query};

#[derive(Clone)]
pub struct RecipeGateway {
    store: Arc<dyn DocumentStore>,
}

impl RecipeGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Recipes, optionally bounded and optionally restricted to one category,
    /// in backend order.
    pub async fn list_recipes(&self, limit: Option<usize>, category: Option<&str>) -> Vec<Recipe> {
        let mut query = Query::collection(collections::RECIPES);
        if let Some(category) = category {
            query = query.where_eq("category", category);
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        self.fetch_recipes(&query).await
    }

    pub async fn list_recipes_in_category(&self, name: &str) -> Vec<Recipe> {
        self.list_recipes(None, Some(name)).await
    }

    /// Every recipe ordered by title, as the admin list shows them.
    pub async fn list_recipes_by_title(&self) -> Vec<Recipe> {
        let query = Query::collection(collections::RECIPES).order_by("title", Direction::Ascending);
        self.fetch_recipes(&query).await
    }

    pub async fn get_recipe(&self, id: &str) -> Option<Recipe> {
        match self.store.get(collections::RECIPES, id).await {
            Ok(Some(doc)) => decode_or_skip(&doc, Recipe::from_document),
            Ok(None) => None,
            Err(e) => {
                tracing::error!(error = %e, recipe_id = %id, "Error fetching recipe");
                None
            }
        }
    }

    pub async fn list_categories(&self) -> Vec<Category> {
        match self.store.query(&Query::collection(collections::CATEGORIES)).await {
            Ok(docs) => docs
                .iter()
                .filter_map(|doc| decode_or_skip(doc, Category::from_document))
                .collect(),
            Err(e) => {
                tracing::error!(error = %e, "Error fetching categories");
                Vec::new()
            }
        }
    }

    /// Fetch the whole catalog and keep recipes whose title or category
    /// contains `text`, ignoring case.
    ///
    /// Filtering happens here because the backend has no text search. That is
    /// fine while the catalog stays small.
    pub async fn search_recipes_by_text(&self, text: &str) -> Vec<Recipe> {
        let all = self.list_recipes(None, None).await;
        let matched: Vec<Recipe> = all.into_iter().filter(|r| r.matches_text(text)).collect();
        tracing::debug!(query = %text, matches = matched.len(), "Recipe search");
        matched
    }

    async fn fetch_recipes(&self, query: &Query) -> Vec<Recipe> {
        match self.store.query(query).await {
            Ok(docs) => docs
                .iter()
                .filter_map(|doc| decode_or_skip(doc, Recipe::from_document))
                .collect(),
            Err(e) => {
                tracing::error!(error = %e, "Error fetching recipes");
                Vec::new()
            }
        }
    }
}

pub(crate) fn decode_or_skip<T>(
    doc: &DocumentSnapshot,
    decode: impl Fn(&DocumentSnapshot) -> Result<T, DomainError>,
) -> Option<T> {
    match decode(doc) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed document");
            None
        }
    }
}
