use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use super::{DocumentSnapshot, Fields, Query};

/// Live query results. Each item is the complete result set at that point
/// in time, never a delta. Dropping the stream ends the subscription.
pub type Snapshots =
    Pin<Box<dyn Stream<Item = Result<Vec<DocumentSnapshot>, StoreError>> + Send>>;

/// Document store trait - abstraction over the hosted document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document.
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<DocumentSnapshot>, StoreError>;

    /// Run a query once.
    async fn query(&self, query: &Query) -> Result<Vec<DocumentSnapshot>, StoreError>;

    /// Write a document, replacing any existing one with the same id.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Write a document only if no document with that id exists yet.
    async fn create(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Write a new document under a backend-generated id and return the id.
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Merge fields into an existing document.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Subscribe to a query. The first item is the current result set.
    async fn watch(&self, query: Query) -> Result<Snapshots, StoreError>;
}

/// Document store errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Document already exists: {collection}/{id}")]
    AlreadyExists { collection: String, id: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed backend response: {0}")]
    Decode(String),
}
