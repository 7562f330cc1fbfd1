//! In-memory document store - used when no hosted backend is configured.
//!
//! Collections live in process memory and are lost on restart. Live queries
//! are driven by a per-collection revision counter: every write bumps the
//! counter and each open watch re-runs its query.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use futures::stream;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use recipe_core::ports::{
    DocumentData, DocumentSnapshot, DocumentStore, Fields, Query, Snapshots, StoreError,
};

use super::eval::{apply_fields, evaluate};

#[derive(Default)]
struct StoreState {
    collections: HashMap<String, BTreeMap<String, DocumentData>>,
    revisions: HashMap<String, watch::Sender<u64>>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl StoreState {
    /// Server timestamps never repeat and never go backwards.
    fn next_timestamp(&mut self) -> String {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + TimeDelta::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn notify(&mut self, collection: &str) {
        if let Some(sender) = self.revisions.get(collection) {
            sender.send_modify(|revision| *revision += 1);
        }
    }

    fn collection_mut(&mut self, collection: &str) -> &mut BTreeMap<String, DocumentData> {
        self.collections.entry(collection.to_string()).or_default()
    }
}

struct StoreInner {
    state: RwLock<StoreState>,
    offline: AtomicBool,
    operations: AtomicUsize,
}

/// Document store backed by process memory.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    inner: Arc<StoreInner>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(StoreState::default()),
                offline: AtomicBool::new(false),
                operations: AtomicUsize::new(0),
            }),
        }
    }

    /// Simulate losing the backend. Every call fails with `Unavailable` until restored.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
        tracing::info!(offline, "In-memory store availability changed");
    }

    /// Number of store calls made so far, successful or not.
    pub fn operation_count(&self) -> usize {
        self.inner.operations.load(Ordering::SeqCst)
    }

    pub async fn document_count(&self, collection: &str) -> usize {
        let state = self.inner.state.read().await;
        state.collections.get(collection).map_or(0, BTreeMap::len)
    }

    fn begin(&self) -> Result<(), StoreError> {
        self.inner.operations.fetch_add(1, Ordering::SeqCst);
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store is offline".to_string(),
            ));
        }
        Ok(())
    }

    async fn run_query(&self, query: &Query) -> Result<Vec<DocumentSnapshot>, StoreError> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store is offline".to_string(),
            ));
        }
        let state = self.inner.state.read().await;
        Ok(state
            .collections
            .get(&query.collection)
            .map(|docs| evaluate(query, docs.iter()))
            .unwrap_or_default())
    }

    async fn write_document(&self, collection: &str, id: &str, fields: Fields) {
        let mut state = self.inner.state.write().await;
        let now = state.next_timestamp();
        let mut document = DocumentData::new();
        apply_fields(&mut document, fields, &now);
        state.collection_mut(collection).insert(id.to_string(), document);
        state.notify(collection);
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<DocumentSnapshot>, StoreError> {
        self.begin()?;
        let state = self.inner.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| DocumentSnapshot::new(id, data.clone())))
    }

    async fn query(&self, query: &Query) -> Result<Vec<DocumentSnapshot>, StoreError> {
        self.begin()?;
        self.run_query(query).await
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.begin()?;
        self.write_document(collection, id, fields).await;
        tracing::debug!(collection, id, "Document set");
        Ok(())
    }

    async fn create(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.begin()?;
        let mut state = self.inner.state.write().await;
        if state
            .collections
            .get(collection)
            .is_some_and(|docs| docs.contains_key(id))
        {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        let now = state.next_timestamp();
        let mut document = DocumentData::new();
        apply_fields(&mut document, fields, &now);
        state.collection_mut(collection).insert(id.to_string(), document);
        state.notify(collection);
        tracing::debug!(collection, id, "Document created");
        Ok(())
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.begin()?;
        let id = Uuid::new_v4().simple().to_string();
        self.write_document(collection, &id, fields).await;
        tracing::debug!(collection, id = %id, "Document added");
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.begin()?;
        let mut state = self.inner.state.write().await;
        let now = state.next_timestamp();
        let document = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        apply_fields(document, fields, &now);
        state.notify(collection);
        tracing::debug!(collection, id, "Document updated");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.begin()?;
        let mut state = self.inner.state.write().await;
        let removed = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();

        if removed {
            state.notify(collection);
            tracing::debug!(collection, id, "Document deleted");
        }
        Ok(())
    }

    async fn watch(&self, query: Query) -> Result<Snapshots, StoreError> {
        self.begin()?;
        let receiver = {
            let mut state = self.inner.state.write().await;
            state
                .revisions
                .entry(query.collection.clone())
                .or_insert_with(|| watch::channel(0).0)
                .subscribe()
        };

        tracing::debug!(collection = %query.collection, "Live query opened");

        let store = self.clone();
        let snapshots = stream::unfold(
            (store, query, receiver, true),
            |(store, query, mut receiver, first)| async move {
                if !first && receiver.changed().await.is_err() {
                    return None;
                }
                // Writes that land while the query runs are folded into the next emission.
                drop(receiver.borrow_and_update());
                let result = store.run_query(&query).await;
                Some((result, (store, query, receiver, false)))
            },
        );

        Ok(Box::pin(snapshots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use recipe_core::ports::Direction;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryDocumentStore::new();
        store
            .set("mealsList", "r1", Fields::new().set("title", "Soup"))
            .await
            .unwrap();

        let doc = store.get("mealsList", "r1").await.unwrap().unwrap();
        assert_eq!(doc.get("title"), Some(&json!("Soup")));
        assert!(store.get("mealsList", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_refuses_existing_document() {
        let store = InMemoryDocumentStore::new();
        store
            .create("users", "u1", Fields::new().set("role", "admin"))
            .await
            .unwrap();

        let result = store
            .create("users", "u1", Fields::new().set("role", "user"))
            .await;

        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
        let doc = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc.get("role"), Some(&json!("admin")));
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = InMemoryDocumentStore::new();
        let result = store
            .update("mealsList", "nope", Fields::new().set("title", "x"))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = InMemoryDocumentStore::new();
        store
            .set(
                "mealsList",
                "r1",
                Fields::new().set("title", "Soup").set("category", "Starters"),
            )
            .await
            .unwrap();
        store
            .update("mealsList", "r1", Fields::new().set("title", "Stew"))
            .await
            .unwrap();

        let doc = store.get("mealsList", "r1").await.unwrap().unwrap();
        assert_eq!(doc.get("title"), Some(&json!("Stew")));
        assert_eq!(doc.get("category"), Some(&json!("Starters")));
    }

    #[tokio::test]
    async fn test_delete_missing_document_is_ok() {
        let store = InMemoryDocumentStore::new();
        assert!(store.delete("save", "u1_r1").await.is_ok());
    }

    #[tokio::test]
    async fn test_server_timestamps_increase() {
        let store = InMemoryDocumentStore::new();
        let first = store
            .add("communityPosts", Fields::new().server_timestamp("createdAt"))
            .await
            .unwrap();
        let second = store
            .add("communityPosts", Fields::new().server_timestamp("createdAt"))
            .await
            .unwrap();

        let query = Query::collection("communityPosts").order_by("createdAt", Direction::Descending);
        let ids: Vec<String> = store
            .query(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc.id)
            .collect();

        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn test_offline_store_fails_and_counts_calls() {
        let store = InMemoryDocumentStore::new();
        store.set_offline(true);

        let result = store.query(&Query::collection("category")).await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.operation_count(), 1);
    }

    #[tokio::test]
    async fn test_watch_emits_current_then_changes() {
        let store = InMemoryDocumentStore::new();
        store
            .set("save", "u1_r1", Fields::new().set("userId", "u1"))
            .await
            .unwrap();

        let mut snapshots = store
            .watch(Query::collection("save").where_eq("userId", "u1"))
            .await
            .unwrap();

        let initial = snapshots.next().await.unwrap().unwrap();
        assert_eq!(initial.len(), 1);

        store
            .set("save", "u1_r2", Fields::new().set("userId", "u1"))
            .await
            .unwrap();
        let updated = snapshots.next().await.unwrap().unwrap();
        assert_eq!(updated.len(), 2);

        store.delete("save", "u1_r1").await.unwrap();
        let after_delete = snapshots.next().await.unwrap().unwrap();
        assert_eq!(after_delete.len(), 1);
        assert_eq!(after_delete[0].id, "u1_r2");
    }
}
