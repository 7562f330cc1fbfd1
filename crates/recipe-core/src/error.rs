//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business rule failures detected before or after a backend call.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    /// A guest tried something that needs a signed-in identity.
    /// The payload completes the sentence "Please sign in to ...".
    #[error("Please sign in to {0}.")]
    LoginRequired(&'static str),

    #[error("Only super users can access this area.")]
    AccessDenied,

    #[error("Malformed document {collection}/{id}: {reason}")]
    Malformed {
        collection: &'static str,
        id: String,
        reason: String,
    },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
