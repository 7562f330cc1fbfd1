//! # Recipe Infrastructure
//!
//! Concrete implementations of the ports defined in `recipe-core`: document
//! stores and identity providers.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory store only
//! - `auth` - In-memory identity provider with Argon2 passwords and JWT ID tokens
//! - `firestore` - Firestore and Identity Toolkit REST adapters via reqwest

pub mod store;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "firestore")]
pub mod firestore;

// Re-exports - In-Memory
pub use store::InMemoryDocumentStore;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, DevConsent, InMemoryAuthProvider, JwtIdTokenService};

// Re-exports - Hosted
#[cfg(feature = "firestore")]
pub use firestore::{FirebaseConfig, FirestoreStore, IdTokenSlot, IdentityToolkitAuth};
