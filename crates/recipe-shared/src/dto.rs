//! Form data transfer objects with the checks made before any backend call.

use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Client-side form validation failures. The display text is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password should be at least 6 characters")]
    PasswordTooShort,

    #[error("Title and Category are required.")]
    MissingTitleOrCategory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(FormError::MissingFields);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), FormError> {
        if self.email.trim().is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(FormError::MissingFields);
        }
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(FormError::PasswordTooShort);
        }
        Ok(())
    }
}

/// The admin editor's form. Ingredients are comma separated and
/// instructions one per line, as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeForm {
    pub title: String,
    pub category: String,
    pub description: String,
    pub img: String,
    pub prep_time: String,
    pub cook_time: String,
    pub servings: String,
    pub ingredients: String,
    pub instructions: String,
    pub notes: String,
}

impl RecipeForm {
    pub fn validate(&self) -> Result<(), FormError> {
        if self.title.trim().is_empty() || self.category.trim().is_empty() {
            return Err(FormError::MissingTitleOrCategory);
        }
        Ok(())
    }
}
