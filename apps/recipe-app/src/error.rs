//! Application error type and its mapping to user-facing alerts.

use recipe_core::DomainError;
use recipe_core::ports::{AuthError, StoreError};
use recipe_shared::{Alert, FormError};

/// Every failure an operation of the client core can report.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// The alert to show for this error.
    pub fn to_alert(&self) -> Alert {
        match self {
            AppError::Form(e) => Alert::error(e.to_string()),
            AppError::Domain(DomainError::LoginRequired(_)) => Alert::login_required(self.to_string()),
            AppError::Domain(DomainError::AccessDenied) => Alert::access_denied(),
            AppError::Domain(DomainError::Validation(message)) => Alert::error(message.clone()),
            AppError::Domain(e) => {
                tracing::error!(error = %e, "Domain error");
                Alert::error("Something went wrong. Please try again.")
            }
            // Auth provider messages are shown as they are.
            AppError::Auth(e) => Alert::error(e.to_string()),
            AppError::Store(e) => {
                tracing::error!(error = %e, "Backend error");
                Alert::error(e.to_string())
            }
        }
    }

    pub fn is_login_required(&self) -> bool {
        matches!(self, AppError::Domain(DomainError::LoginRequired(_)))
    }
}

/// Result type alias for client operations.
pub type AppResult<T> = Result<T, AppError>;
