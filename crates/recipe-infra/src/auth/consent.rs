//! Development stand-in for a federated provider's consent screen.

use std::sync::Arc;

use async_trait::async_trait;

use recipe_core::ports::{AuthError, FederatedConsent, FederatedProvider};

use super::JwtIdTokenService;

/// Consent flow that answers for a preset account, or cancels when none is set.
pub struct DevConsent {
    tokens: Arc<JwtIdTokenService>,
    account: Option<(String, Option<String>)>,
}

impl DevConsent {
    pub fn new(tokens: Arc<JwtIdTokenService>) -> Self {
        Self {
            tokens,
            account: None,
        }
    }

    /// Approve consent as `subject`.
    pub fn approving(mut self, subject: impl Into<String>, email: Option<String>) -> Self {
        self.account = Some((subject.into(), email));
        self
    }
}

#[async_trait]
impl FederatedConsent for DevConsent {
    fn provider(&self) -> FederatedProvider {
        FederatedProvider::Google
    }

    async fn request_id_token(&self) -> Result<Option<String>, AuthError> {
        match &self.account {
            Some((subject, email)) => self.tokens.issue(subject, email.as_deref()).map(Some),
            None => {
                tracing::debug!("Consent dismissed");
                Ok(None)
            }
        }
    }
}
