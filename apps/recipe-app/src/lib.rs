//! # Recipe App
//!
//! Client core of the recipe-discovery app: session and profile state, the
//! browse screen's state machine, live saved-recipe and community feeds, and
//! the admin catalog editor. Views consume it through `watch` receivers,
//! `AppResult`s and [`recipe_shared::Alert`]s.

pub mod admin;
pub mod browse;
pub mod collection;
pub mod config;
pub mod error;
pub mod feed;
pub mod gateway;
pub mod session;
pub mod state;
pub mod subscription;
pub mod telemetry;

pub use admin::{CatalogEditor, Confirm, EditorState, Gate};
pub use browse::{BrowseState, RecipeBrowser};
pub use collection::SavedRecipes;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use feed::CommunityFeed;
pub use gateway::RecipeGateway;
pub use session::SessionManager;
pub use state::AppState;
pub use subscription::Subscription;
