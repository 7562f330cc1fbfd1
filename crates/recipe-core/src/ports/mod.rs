//! Ports - trait definitions for the hosted backend.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod document;
mod fields;
mod query;
mod store;

pub use auth::{
    AuthError, AuthProvider, AuthUser, FederatedConsent, FederatedProvider, IdTokenClaims,
    IdTokenVerifier, PasswordService,
};
pub use document::{DocumentData, DocumentSnapshot};
pub use fields::{FieldValue, Fields};
pub use query::{Direction, Filter, OrderBy, Query};
pub use store::{DocumentStore, Snapshots, StoreError};
