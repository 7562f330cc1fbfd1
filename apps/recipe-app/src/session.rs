//! Auth session manager.
//!
//! Mirrors the auth provider's current identity and that identity's profile
//! document into an observable [`SessionState`]. Profiles are created on
//! first sign-in with a create-if-absent write, so a profile is written
//! exactly once per identity and an existing role is never replaced.

use std::sync::Arc;

use tokio::sync::watch;

use recipe_core::domain::{SessionState, UserProfile, collections};
use recipe_core::ports::{
    AuthError, AuthProvider, AuthUser, DocumentStore, FederatedConsent, StoreError,
};
use recipe_shared::{LoginForm, RegisterForm};

use crate::error::AppResult;
use crate::subscription::Subscription;
use crate::telemetry::mask_email;

struct SessionInner {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DocumentStore>,
    consent: Option<Arc<dyn FederatedConsent>>,
    state: watch::Sender<SessionState>,
}

#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

impl SessionManager {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
        consent: Option<Arc<dyn FederatedConsent>>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                auth,
                store,
                consent,
                state: watch::channel(SessionState::Unknown).0,
            }),
        }
    }

    /// Start following the auth provider. Auth changes are handled one at a
    /// time in the order they are observed.
    pub fn start(&self) -> Subscription {
        let inner = self.inner.clone();
        let mut changes = inner.auth.watch_auth_state();

        Subscription::spawn("session", async move {
            loop {
                let user = changes.borrow_and_update().clone();
                inner.apply(user).await;
                if changes.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.inner.state.borrow().user().cloned()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.inner.state.borrow().profile().cloned()
    }

    pub fn is_admin(&self) -> bool {
        self.inner.state.borrow().is_admin()
    }

    /// Resolves once the first auth event has been handled and no profile
    /// load is in flight.
    pub async fn wait_until_settled(&self) -> SessionState {
        let mut receiver = self.subscribe();
        match receiver.wait_for(SessionState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Resolves once the session has settled on the identity `uid`, or on
    /// no identity when `uid` is `None`.
    pub async fn settled_for(&self, uid: Option<&str>) -> SessionState {
        let mut receiver = self.subscribe();
        let reached =
            |state: &SessionState| state.is_settled() && state.user().map(|u| u.uid.as_str()) == uid;
        match receiver.wait_for(reached).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthUser> {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
        .validate()?;

        let user = self
            .inner
            .auth
            .sign_in_with_password(email.trim(), password)
            .await?;
        tracing::info!(uid = %user.uid, email = %mask_email(email), "Signed in");
        Ok(user)
    }

    /// Create an account and its profile.
    ///
    /// If the profile write fails the account still exists; the auth listener
    /// retries the profile on the next sign-in of that identity.
    pub async fn register(&self, email: &str, password: &str, confirm: &str) -> AppResult<AuthUser> {
        RegisterForm {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
        .validate()?;

        let user = self.inner.auth.create_user(email.trim(), password).await?;
        tracing::info!(uid = %user.uid, email = %mask_email(email), "Account registered");

        self.inner.ensure_profile(&user).await?;
        Ok(user)
    }

    pub async fn login_anonymously(&self) -> AppResult<AuthUser> {
        let user = self.inner.auth.sign_in_anonymously().await?;
        tracing::info!(uid = %user.uid, "Signed in anonymously");
        Ok(user)
    }

    /// Run the external consent flow and exchange its ID token for a session.
    pub async fn login_with_federated_provider(&self) -> AppResult<AuthUser> {
        let consent = self
            .inner
            .consent
            .as_ref()
            .ok_or_else(|| AuthError::OperationNotAllowed("federated sign-in".to_string()))?;

        let token = consent
            .request_id_token()
            .await?
            .ok_or(AuthError::Cancelled)?;

        let provider = consent.provider();
        let user = self
            .inner
            .auth
            .sign_in_with_id_token(provider, &token)
            .await?;
        tracing::info!(uid = %user.uid, provider = provider.provider_id(), "Signed in with federated provider");
        Ok(user)
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.inner.auth.sign_out().await?;
        tracing::info!("Signed out");
        Ok(())
    }
}

impl SessionInner {
    async fn apply(&self, user: Option<AuthUser>) {
        let Some(user) = user else {
            self.state.send_replace(SessionState::Unauthenticated);
            return;
        };

        self.state.send_replace(SessionState::Authenticating { user: user.clone() });

        let next = match self.ensure_profile(&user).await {
            Ok(profile) => SessionState::Authenticated { user, profile },
            Err(e) => {
                tracing::error!(uid = %user.uid, error = %e, "Error loading user profile");
                SessionState::ProfileUnavailable { user }
            }
        };
        self.state.send_replace(next);
    }

    /// Load the profile for `user`, creating the default one if none exists.
    async fn ensure_profile(&self, user: &AuthUser) -> Result<UserProfile, StoreError> {
        if let Some(profile) = self.load_profile(&user.uid).await? {
            return Ok(profile);
        }

        let profile = UserProfile::default_for(user);
        match self
            .store
            .create(collections::USERS, &user.uid, profile.to_fields())
            .await
        {
            Ok(()) => {
                tracing::info!(uid = %user.uid, "Default profile created");
                Ok(profile)
            }
            // Someone else created it between our read and write.
            Err(StoreError::AlreadyExists { .. }) => {
                self.load_profile(&user.uid)
                    .await?
                    .ok_or_else(|| StoreError::NotFound {
                        collection: collections::USERS.to_string(),
                        id: user.uid.clone(),
                    })
            }
            Err(e) => Err(e),
        }
    }

    async fn load_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        let Some(doc) = self.store.get(collections::USERS, uid).await? else {
            return Ok(None);
        };
        UserProfile::from_document(&doc)
            .map(Some)
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}
