//! # Recipe Shared
//!
//! Types shared between the client core and whatever renders it: form
//! DTOs with client-side validation, user-facing alerts, and navigation
//! routes.

pub mod alert;
pub mod dto;
pub mod route;

pub use alert::Alert;
pub use dto::{FormError, LoginForm, RecipeForm, RegisterForm};
pub use route::Route;
