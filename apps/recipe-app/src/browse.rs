//! Recipe browsing state behind the explore screen.
//!
//! Fetches are neither sequenced nor cancelled. When two overlap, whichever
//! response lands last overwrites the recipe list.

use tokio::sync::watch;

use recipe_core::domain::Recipe;

use crate::config::BrowseLimits;
use crate::gateway::RecipeGateway;

/// Chip that stands for "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Searches start once the text is longer than this many characters.
const SEARCH_MIN_EXCLUSIVE: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct BrowseState {
    pub recipes: Vec<Recipe>,
    /// Category chips, [`ALL_CATEGORIES`] first.
    pub categories: Vec<String>,
    pub selected_category: String,
    pub search_text: String,
    pub loading: bool,
    pub searching: bool,
}

impl Default for BrowseState {
    fn default() -> Self {
        Self {
            recipes: Vec::new(),
            categories: vec![ALL_CATEGORIES.to_string()],
            selected_category: ALL_CATEGORIES.to_string(),
            search_text: String::new(),
            loading: true,
            searching: false,
        }
    }
}

pub struct RecipeBrowser {
    gateway: RecipeGateway,
    limits: BrowseLimits,
    state: watch::Sender<BrowseState>,
}

impl RecipeBrowser {
    pub fn new(gateway: RecipeGateway, limits: BrowseLimits) -> Self {
        Self {
            gateway,
            limits,
            state: watch::channel(BrowseState::default()).0,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<BrowseState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> BrowseState {
        self.state.borrow().clone()
    }

    /// Load the category chips and the first page of recipes.
    pub async fn mount(&self) {
        self.state.send_modify(|s| s.loading = true);

        let categories = self.gateway.list_categories().await;
        let recipes = self
            .gateway
            .list_recipes(Some(self.limits.initial), None)
            .await;

        self.state.send_modify(|s| {
            s.categories = std::iter::once(ALL_CATEGORIES.to_string())
                .chain(categories.into_iter().map(|c| c.name))
                .collect();
            s.recipes = recipes;
            s.loading = false;
        });
    }

    pub async fn select_category(&self, name: &str) {
        self.state.send_modify(|s| {
            s.selected_category = name.to_string();
            s.loading = true;
        });

        let recipes = if name == ALL_CATEGORIES {
            self.gateway.list_recipes(Some(self.limits.all), None).await
        } else {
            self.gateway.list_recipes(None, Some(name)).await
        };

        self.state.send_modify(|s| {
            s.recipes = recipes;
            s.loading = false;
        });
    }

    /// Record the search text and act on its length: more than two
    /// characters searches, empty text reloads the first page, anything in
    /// between leaves the results alone.
    pub async fn search(&self, text: &str) {
        self.state.send_modify(|s| s.search_text = text.to_string());

        match text.chars().count() {
            0 => self.mount().await,
            n if n > SEARCH_MIN_EXCLUSIVE => {
                self.state.send_modify(|s| s.searching = true);
                let recipes = self.gateway.search_recipes_by_text(text).await;
                self.state.send_modify(|s| {
                    s.recipes = recipes;
                    s.searching = false;
                });
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use recipe_core::domain::collections;
    use recipe_core::ports::{DocumentStore, Fields};
    use recipe_infra::InMemoryDocumentStore;

    async fn browser_with(recipes: usize) -> (InMemoryDocumentStore, RecipeBrowser) {
        let store = InMemoryDocumentStore::new();
        store
            .set(collections::CATEGORIES, "c1", Fields::new().set("name", "Breakfast"))
            .await
            .unwrap();
        for i in 0..recipes {
            let category = if i % 2 == 0 { "Breakfast" } else { "Mains" };
            store
                .set(
                    collections::RECIPES,
                    &format!("r{i:02}"),
                    Fields::new()
                        .set("title", format!("Recipe {i}"))
                        .set("category", category),
                )
                .await
                .unwrap();
        }
        let browser = RecipeBrowser::new(
            RecipeGateway::new(Arc::new(store.clone())),
            BrowseLimits::default(),
        );
        (store, browser)
    }

    #[tokio::test]
    async fn test_mount_loads_first_page_and_chips() {
        let (_store, browser) = browser_with(25).await;

        browser.mount().await;
        let state = browser.state();

        assert_eq!(state.categories, vec!["All", "Breakfast"]);
        assert_eq!(state.recipes.len(), 10);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_all_category_is_bounded() {
        let (_store, browser) = browser_with(25).await;

        browser.select_category(ALL_CATEGORIES).await;
        assert_eq!(browser.state().recipes.len(), 20);

        browser.select_category("Mains").await;
        let state = browser.state();
        assert_eq!(state.selected_category, "Mains");
        assert_eq!(state.recipes.len(), 12);
        assert!(state.recipes.iter().all(|r| r.category == "Mains"));
    }

    #[tokio::test]
    async fn test_short_search_is_a_no_op() {
        let (store, browser) = browser_with(5).await;
        browser.mount().await;
        let before = browser.state().recipes;
        let calls = store.operation_count();

        browser.search("Re").await;

        assert_eq!(store.operation_count(), calls);
        let state = browser.state();
        assert_eq!(state.search_text, "Re");
        assert_eq!(state.recipes, before);
    }

    #[tokio::test]
    async fn test_search_then_clear() {
        let (_store, browser) = browser_with(25).await;
        browser.mount().await;

        browser.search("recipe 2").await;
        let titles: Vec<String> = browser.state().recipes.into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["Recipe 2", "Recipe 20", "Recipe 21", "Recipe 22", "Recipe 23", "Recipe 24"]);

        browser.search("").await;
        assert_eq!(browser.state().recipes.len(), 10);
    }

    #[tokio::test]
    async fn test_search_counts_characters_not_bytes() {
        let (store, browser) = browser_with(3).await;
        browser.mount().await;
        let calls = store.operation_count();

        // Two characters, four bytes.
        browser.search("éé").await;

        assert_eq!(store.operation_count(), calls);
    }
}
