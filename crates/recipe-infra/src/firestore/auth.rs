//! Firebase Authentication over the Identity Toolkit REST API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::watch;

use recipe_core::ports::{AuthError, AuthProvider, AuthUser, FederatedProvider};

use super::{FirebaseConfig, IdTokenSlot};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
}

/// Identity Toolkit client. Signed-in ID tokens are written to the shared
/// slot so the Firestore adapter can authenticate as the same user.
pub struct IdentityToolkitAuth {
    client: Client,
    config: Arc<FirebaseConfig>,
    id_token: IdTokenSlot,
    current: watch::Sender<Option<AuthUser>>,
}

impl IdentityToolkitAuth {
    pub fn new(config: FirebaseConfig, id_token: IdTokenSlot) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
            id_token,
            current: watch::channel(None).0,
        }
    }

    async fn call(&self, method: &str, body: Value) -> Result<SignInResponse, AuthError> {
        let response = self
            .client
            .post(self.config.identity_url(method))
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !status.is_success() {
            let parsed: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            let message = parsed["error"]["message"].as_str().unwrap_or_default();
            tracing::debug!(method, status = status.as_u16(), message, "Identity Toolkit call failed");
            return Err(map_error_message(message));
        }

        serde_json::from_str(&body).map_err(|e| AuthError::Backend(e.to_string()))
    }

    // TODO: exchange the refresh token at securetoken.googleapis.com before the
    // one hour ID token lifetime runs out; today store calls start failing with
    // PermissionDenied once it expires.
    async fn establish(&self, response: SignInResponse, is_anonymous: bool) -> AuthUser {
        *self.id_token.write().await = Some(response.id_token);

        let user = AuthUser {
            uid: response.local_id,
            email: response.email.filter(|email| !email.is_empty()),
            is_anonymous,
        };
        self.current.send_replace(Some(user.clone()));
        user
    }
}

/// Map an Identity Toolkit error message such as `WEAK_PASSWORD : Password
/// should be at least 6 characters` onto an auth error.
fn map_error_message(message: &str) -> AuthError {
    let (code, detail) = match message.split_once(':') {
        Some((code, detail)) => (code.trim(), detail.trim()),
        None => (message.trim(), ""),
    };

    match code {
        "EMAIL_EXISTS" => AuthError::EmailAlreadyInUse,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            AuthError::InvalidCredentials
        }
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
        "WEAK_PASSWORD" => AuthError::WeakPassword(detail.to_string()),
        "OPERATION_NOT_ALLOWED" | "ADMIN_ONLY_OPERATION" => {
            AuthError::OperationNotAllowed(code.to_string())
        }
        "INVALID_IDP_RESPONSE" | "INVALID_ID_TOKEN" => AuthError::InvalidToken(code.to_string()),
        "TOKEN_EXPIRED" => AuthError::TokenExpired,
        "" => AuthError::Backend("empty error response".to_string()),
        _ => AuthError::Backend(message.to_string()),
    }
}

#[async_trait]
impl AuthProvider for IdentityToolkitAuth {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        let response = self.call("signInWithPassword", body).await?;
        Ok(self.establish(response, false).await)
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        let response = self.call("signUp", body).await?;
        Ok(self.establish(response, false).await)
    }

    async fn sign_in_anonymously(&self) -> Result<AuthUser, AuthError> {
        let response = self
            .call("signUp", json!({ "returnSecureToken": true }))
            .await?;
        Ok(self.establish(response, true).await)
    }

    async fn sign_in_with_id_token(
        &self,
        provider: FederatedProvider,
        id_token: &str,
    ) -> Result<AuthUser, AuthError> {
        let body = json!({
            "postBody": format!("id_token={id_token}&providerId={}", provider.provider_id()),
            "requestUri": "http://localhost",
            "returnIdpCredential": true,
            "returnSecureToken": true,
        });
        let response = self.call("signInWithIdp", body).await?;
        Ok(self.establish(response, false).await)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.id_token.write().await = None;
        self.current.send_replace(None);
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.current.borrow().clone()
    }

    fn watch_auth_state(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }
}
