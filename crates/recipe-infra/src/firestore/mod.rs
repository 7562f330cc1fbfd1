//! Hosted backend adapters speaking the Firebase REST APIs.
//!
//! `FirestoreStore` and `IdentityToolkitAuth` share one ID token slot: a
//! successful sign-in stores the token and every Firestore request carries it
//! as a bearer credential, so security rules see the signed-in user.

mod auth;
mod codec;
mod config;
mod store;

use std::sync::Arc;

use tokio::sync::RwLock;

pub use auth::IdentityToolkitAuth;
pub use config::FirebaseConfig;
pub use store::FirestoreStore;

/// ID token of the signed-in user, shared between the auth and store adapters.
pub type IdTokenSlot = Arc<RwLock<Option<String>>>;
