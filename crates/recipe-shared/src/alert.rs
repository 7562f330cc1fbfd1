//! User-facing alert shape: a title and a message, shown as a blocking dialog.

use serde::{Deserialize, Serialize};

/// A blocking notice for the user.
///
/// This is the client's counterpart of a problem-details document: every
/// error that reaches the user is turned into one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    // Common alert constructors
    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new("Success", message)
    }

    pub fn login_failed(message: impl Into<String>) -> Self {
        Self::new("Login Failed", message)
    }

    pub fn registration_failed(message: impl Into<String>) -> Self {
        Self::new("Registration Failed", message)
    }

    pub fn login_required(message: impl Into<String>) -> Self {
        Self::new("Login Required", message)
    }

    pub fn access_denied() -> Self {
        Self::new("Access Denied", "Only super users can access this area.")
    }

    /// Prompt shown before a recipe is deleted.
    pub fn confirm_delete_recipe() -> Self {
        Self::new("Delete Recipe", "Are you sure you want to delete this recipe?")
    }
}
