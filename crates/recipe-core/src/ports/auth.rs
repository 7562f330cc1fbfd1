//! Authentication ports.

use async_trait::async_trait;
use tokio::sync::watch;

/// Identity of the signed-in user as reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub is_anonymous: bool,
}

/// Federated identity providers the app can sign in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FederatedProvider {
    Google,
}

impl FederatedProvider {
    /// Provider id as understood by the identity backend.
    pub fn provider_id(&self) -> &'static str {
        match self {
            FederatedProvider::Google => "google.com",
        }
    }
}

/// Auth backend trait - sign-in methods plus an observable auth state.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError>;

    /// Create an email/password identity and sign it in.
    async fn create_user(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    async fn sign_in_anonymously(&self) -> Result<AuthUser, AuthError>;

    /// Exchange an ID token from a federated consent flow for a backend session.
    async fn sign_in_with_id_token(
        &self,
        provider: FederatedProvider,
        id_token: &str,
    ) -> Result<AuthUser, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    fn current_user(&self) -> Option<AuthUser>;

    /// Auth state changes. The receiver starts out holding the current state.
    fn watch_auth_state(&self) -> watch::Receiver<Option<AuthUser>>;
}

/// External consent flow (browser based) that yields a federated ID token.
#[async_trait]
pub trait FederatedConsent: Send + Sync {
    fn provider(&self) -> FederatedProvider;

    /// Run the consent flow. `Ok(None)` means the user backed out.
    async fn request_id_token(&self) -> Result<Option<String>, AuthError>;
}

/// Claims carried by a verified federated ID token.
#[derive(Debug, Clone)]
pub struct IdTokenClaims {
    pub subject: String,
    pub email: Option<String>,
    pub exp: i64,
}

/// Verifies federated ID tokens.
pub trait IdTokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<IdTokenClaims, AuthError>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors. The `Display` text is shown to the user as is.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("The email address is already in use by another account")]
    EmailAlreadyInUse,

    #[error("The email address is badly formatted")]
    InvalidEmail,

    #[error("Weak password: {0}")]
    WeakPassword(String),

    #[error("This sign-in method is not enabled: {0}")]
    OperationNotAllowed(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Sign-in was cancelled")]
    Cancelled,

    #[error("A network error occurred: {0}")]
    Network(String),

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Auth backend error: {0}")]
    Backend(String),
}
