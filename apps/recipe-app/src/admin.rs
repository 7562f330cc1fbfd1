//! Admin catalog editor: list, create, edit and delete recipes.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use recipe_core::DomainError;
use recipe_core::domain::{
    INGREDIENT_DELIMITER, INSTRUCTION_DELIMITER, Recipe, collections, split_delimited,
};
use recipe_core::ports::DocumentStore;
use recipe_shared::{Alert, RecipeForm, Route};

use crate::error::AppResult;
use crate::gateway::RecipeGateway;
use crate::session::SessionManager;

/// Asks the user to confirm a destructive action.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &Alert) -> bool;
}

/// Result of checking whether the current user may use the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Granted,
    Redirect { to: Route, alert: Alert },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    pub recipes: Vec<Recipe>,
    pub form: RecipeForm,
    /// Id of the recipe being edited; `None` while composing a new one.
    pub editing: Option<String>,
    pub loading: bool,
}

pub struct CatalogEditor {
    gateway: RecipeGateway,
    store: Arc<dyn DocumentStore>,
    session: SessionManager,
    state: watch::Sender<EditorState>,
}

impl CatalogEditor {
    pub fn new(
        gateway: RecipeGateway,
        store: Arc<dyn DocumentStore>,
        session: SessionManager,
    ) -> Self {
        Self {
            gateway,
            store,
            session,
            state: watch::channel(EditorState::default()).0,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<EditorState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> EditorState {
        self.state.borrow().clone()
    }

    /// Wait for the session to settle, then let admins in and send everyone
    /// else home. Admins also get the recipe list loaded.
    pub async fn gate(&self) -> Gate {
        let session = self.session.wait_until_settled().await;
        if !session.is_admin() {
            tracing::warn!(
                uid = session.user().map(|u| u.uid.as_str()).unwrap_or("-"),
                "Non-admin turned away from catalog editor"
            );
            return Gate::Redirect {
                to: Route::Home,
                alert: Alert::access_denied(),
            };
        }

        self.refresh().await;
        Gate::Granted
    }

    pub async fn refresh(&self) {
        self.state.send_modify(|s| s.loading = true);
        let recipes = self.gateway.list_recipes_by_title().await;
        self.state.send_modify(|s| {
            s.recipes = recipes;
            s.loading = false;
        });
    }

    pub fn new_recipe(&self) {
        self.state.send_modify(|s| {
            s.form = RecipeForm::default();
            s.editing = None;
        });
    }

    pub fn edit(&self, recipe: &Recipe) {
        let form = RecipeForm {
            title: recipe.title.clone(),
            category: recipe.category.clone(),
            description: recipe.description.clone(),
            img: recipe.img.clone(),
            prep_time: recipe.prep_time.clone(),
            cook_time: recipe.cook_time.clone(),
            servings: recipe.servings.clone(),
            ingredients: recipe.ingredients.join(", "),
            instructions: recipe.instructions.join("\n"),
            notes: recipe.notes.clone().unwrap_or_default(),
        };
        self.state.send_modify(|s| {
            s.form = form;
            s.editing = Some(recipe.id.clone());
        });
    }

    /// Replace the form contents, as typed by the user.
    pub fn update_form(&self, form: RecipeForm) {
        self.state.send_modify(|s| s.form = form);
    }

    /// Validate the form, then update the recipe being edited or insert a
    /// new one. The list is reloaded and the form cleared afterwards.
    pub async fn save(&self) -> AppResult<Alert> {
        let (form, editing) = {
            let state = self.state.borrow();
            (state.form.clone(), state.editing.clone())
        };
        form.validate()?;
        if !self.session.is_admin() {
            return Err(DomainError::AccessDenied.into());
        }

        let fields = recipe_from_form(&form).to_fields();
        self.state.send_modify(|s| s.loading = true);

        let written = match &editing {
            Some(id) => self.store.update(collections::RECIPES, id, fields).await,
            None => self.store.add(collections::RECIPES, fields).await.map(|_| ()),
        };
        if let Err(e) = written {
            self.state.send_modify(|s| s.loading = false);
            return Err(e.into());
        }

        tracing::info!(recipe_id = editing.as_deref().unwrap_or("new"), title = %form.title, "Recipe saved");
        self.refresh().await;
        self.new_recipe();

        Ok(match editing {
            Some(_) => Alert::success("Recipe updated successfully!"),
            None => Alert::success("Recipe added successfully!"),
        })
    }

    /// Delete a recipe once the user confirms. Returns whether it was deleted.
    pub async fn delete(&self, id: &str, confirm: &dyn Confirm) -> AppResult<bool> {
        if !self.session.is_admin() {
            return Err(DomainError::AccessDenied.into());
        }
        if !confirm.confirm(&Alert::confirm_delete_recipe()).await {
            return Ok(false);
        }

        self.store.delete(collections::RECIPES, id).await?;
        tracing::info!(recipe_id = %id, "Recipe deleted");
        self.refresh().await;
        Ok(true)
    }
}

fn recipe_from_form(form: &RecipeForm) -> Recipe {
    let notes = form.notes.trim();
    Recipe {
        id: String::new(),
        title: form.title.trim().to_string(),
        category: form.category.trim().to_string(),
        description: form.description.clone(),
        img: form.img.trim().to_string(),
        prep_time: form.prep_time.trim().to_string(),
        cook_time: form.cook_time.trim().to_string(),
        servings: form.servings.trim().to_string(),
        ingredients: split_delimited(&form.ingredients, INGREDIENT_DELIMITER),
        instructions: split_delimited(&form.instructions, INSTRUCTION_DELIMITER),
        notes: (!notes.is_empty()).then(|| notes.to_string()),
    }
}
