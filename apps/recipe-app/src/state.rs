//! Application state - backend handles built once and shared by every component.

use std::sync::Arc;

use recipe_core::ports::{AuthProvider, DocumentStore, FederatedConsent};
use recipe_infra::{
    Argon2PasswordService, DevConsent, InMemoryAuthProvider, InMemoryDocumentStore,
    JwtIdTokenService,
};

#[cfg(feature = "firestore")]
use recipe_infra::{FirebaseConfig, FirestoreStore, IdTokenSlot, IdentityToolkitAuth};

use crate::admin::CatalogEditor;
use crate::browse::RecipeBrowser;
use crate::collection::SavedRecipes;
use crate::config::{AppConfig, BackendKind};
use crate::feed::CommunityFeed;
use crate::gateway::RecipeGateway;
use crate::session::SessionManager;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub session: SessionManager,
    pub config: AppConfig,
}

impl AppState {
    /// Build the application state with the backend the configuration asks for.
    pub fn new(config: AppConfig) -> Self {
        match config.backend {
            BackendKind::Firestore => Self::hosted(config),
            BackendKind::Memory => Self::in_memory(config),
        }
    }

    #[cfg(feature = "firestore")]
    fn hosted(config: AppConfig) -> Self {
        let Some(settings) = config.firebase.clone() else {
            tracing::warn!(
                "FIREBASE_API_KEY or FIREBASE_PROJECT_ID not set. Using in-memory backend."
            );
            return Self::in_memory(config);
        };

        let mut firebase =
            FirebaseConfig::new(settings.api_key.clone(), settings.project_id.clone())
                .with_poll_interval(config.poll_interval);
        if let Some((firestore_url, identity_url)) = settings.emulator_endpoints() {
            tracing::info!(firestore_url = %firestore_url, "Using Firebase emulator suite");
            firebase = firebase.with_endpoints(firestore_url, identity_url);
        }
        let id_token = IdTokenSlot::default();
        let store: Arc<dyn DocumentStore> =
            Arc::new(FirestoreStore::new(firebase.clone(), id_token.clone()));
        let auth: Arc<dyn AuthProvider> = Arc::new(IdentityToolkitAuth::new(firebase, id_token));

        tracing::info!(project_id = %settings.project_id, "Using Firestore backend");
        // The browser-based consent flow lives outside this process.
        Self::from_parts(store, auth, None, config)
    }

    #[cfg(not(feature = "firestore"))]
    fn hosted(config: AppConfig) -> Self {
        tracing::warn!("Built without the firestore feature. Using in-memory backend.");
        Self::in_memory(config)
    }

    fn in_memory(config: AppConfig) -> Self {
        let passwords = match Argon2PasswordService::lightweight() {
            Ok(service) => service,
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to default Argon2 parameters");
                Argon2PasswordService::new()
            }
        };
        let tokens = Arc::new(JwtIdTokenService::from_env());
        let auth = InMemoryAuthProvider::new(Arc::new(passwords))
            .with_id_token_verifier(tokens.clone());

        let consent: Option<Arc<dyn FederatedConsent>> =
            config.dev_federated_email.clone().map(|email| {
                let subject = format!("dev-{}", email.to_lowercase());
                Arc::new(DevConsent::new(tokens.clone()).approving(subject, Some(email)))
                    as Arc<dyn FederatedConsent>
            });

        tracing::info!("Using in-memory backend");
        Self::from_parts(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(auth),
            consent,
            config,
        )
    }

    /// Assemble state from ready-made backend handles.
    pub fn from_parts(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
        consent: Option<Arc<dyn FederatedConsent>>,
        config: AppConfig,
    ) -> Self {
        let session = SessionManager::new(auth.clone(), store.clone(), consent);
        tracing::info!("Application state initialized");
        Self {
            store,
            auth,
            session,
            config,
        }
    }

    pub fn gateway(&self) -> RecipeGateway {
        RecipeGateway::new(self.store.clone())
    }

    pub fn browser(&self) -> RecipeBrowser {
        RecipeBrowser::new(self.gateway(), self.config.browse)
    }

    pub fn saved_recipes(&self) -> SavedRecipes {
        SavedRecipes::new(self.store.clone(), self.session.clone())
    }

    pub fn community_feed(&self) -> CommunityFeed {
        CommunityFeed::new(self.store.clone(), self.session.clone())
    }

    pub fn catalog_editor(&self) -> CatalogEditor {
        CatalogEditor::new(self.gateway(), self.store.clone(), self.session.clone())
    }
}
