//! In-memory identity provider - used when no hosted auth backend is configured.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use recipe_core::ports::{
    AuthError, AuthProvider, AuthUser, FederatedProvider, IdTokenVerifier, PasswordService,
};

const MIN_PASSWORD_LENGTH: usize = 6;

struct Account {
    uid: String,
    email: String,
    password_hash: String,
}

/// Identity provider that keeps accounts in process memory.
///
/// The current identity is published through a `watch` channel. Listeners
/// observe the latest identity; changes in quick succession may be merged.
pub struct InMemoryAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
    federated: RwLock<HashMap<String, String>>,
    passwords: Arc<dyn PasswordService>,
    verifier: Option<Arc<dyn IdTokenVerifier>>,
    current: watch::Sender<Option<AuthUser>>,
}

impl InMemoryAuthProvider {
    pub fn new(passwords: Arc<dyn PasswordService>) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            federated: RwLock::new(HashMap::new()),
            passwords,
            verifier: None,
            current: watch::channel(None).0,
        }
    }

    /// Accept federated ID tokens checked by `verifier`. Without one, federated
    /// sign-in is reported as not enabled.
    pub fn with_id_token_verifier(mut self, verifier: Arc<dyn IdTokenVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Create an email/password account without signing in as it.
    pub async fn add_account(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let key = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(format!(
                "Password should be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let account = Account {
            uid: new_uid(),
            email: email.trim().to_string(),
            password_hash: self.passwords.hash(password)?,
        };
        let user = AuthUser {
            uid: account.uid.clone(),
            email: Some(account.email.clone()),
            is_anonymous: false,
        };
        accounts.insert(key, account);

        tracing::info!(uid = %user.uid, "Account created");
        Ok(user)
    }

    fn publish(&self, user: Option<AuthUser>) {
        self.current.send_replace(user);
    }
}

fn new_uid() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Lowercased lookup key for an email, or `InvalidEmail` when it cannot be one.
fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace) =>
        {
            Ok(email.to_lowercase())
        }
        _ => Err(AuthError::InvalidEmail),
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        let key = normalize_email(email)?;
        let user = {
            let accounts = self.accounts.read().await;
            let account = accounts.get(&key).ok_or(AuthError::InvalidCredentials)?;
            if !self.passwords.verify(password, &account.password_hash)? {
                return Err(AuthError::InvalidCredentials);
            }
            AuthUser {
                uid: account.uid.clone(),
                email: Some(account.email.clone()),
                is_anonymous: false,
            }
        };

        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let user = self.add_account(email, password).await?;
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_anonymously(&self) -> Result<AuthUser, AuthError> {
        let user = AuthUser {
            uid: new_uid(),
            email: None,
            is_anonymous: true,
        };
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in_with_id_token(
        &self,
        provider: FederatedProvider,
        id_token: &str,
    ) -> Result<AuthUser, AuthError> {
        let verifier = self.verifier.as_ref().ok_or_else(|| {
            AuthError::OperationNotAllowed(provider.provider_id().to_string())
        })?;
        let claims = verifier.verify(id_token)?;

        let link = format!("{}:{}", provider.provider_id(), claims.subject);
        let uid = {
            let mut federated = self.federated.write().await;
            federated.entry(link).or_insert_with(new_uid).clone()
        };

        let user = AuthUser {
            uid,
            email: claims.email,
            is_anonymous: false,
        };
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.publish(None);
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.current.borrow().clone()
    }

    fn watch_auth_state(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }
}
