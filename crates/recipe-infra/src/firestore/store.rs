//! Firestore document store over the REST API.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use uuid::Uuid;

use recipe_core::ports::{
    DocumentSnapshot, DocumentStore, Fields, Query, Snapshots, StoreError,
};

use super::codec::{decode_document, encode_query, encode_write};
use super::{FirebaseConfig, IdTokenSlot};

/// Precondition attached to a write.
#[derive(Debug, Clone, Copy)]
enum Precondition {
    None,
    MustExist,
    MustNotExist,
}

/// Firestore-backed document store.
///
/// Live queries poll `runQuery` at the configured interval and only emit
/// when the result set changed.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Client,
    config: Arc<FirebaseConfig>,
    id_token: IdTokenSlot,
}

impl FirestoreStore {
    pub fn new(config: FirebaseConfig, id_token: IdTokenSlot) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
            id_token,
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        collection: &str,
        id: &str,
    ) -> Result<Value, StoreError> {
        let mut request = request.query(&[("key", self.config.api_key.as_str())]);
        let token = self.id_token.read().await.clone();
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(map_error(status.as_u16(), &body, collection, id));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn commit(&self, write: Value, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = format!("{}:commit", self.config.documents_url());
        let request = self.client.post(url).json(&json!({ "writes": [write] }));
        self.send(request, collection, id).await?;
        Ok(())
    }

    fn update_write(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        precondition: Precondition,
        masked: bool,
    ) -> Value {
        let encoded = encode_write(fields);
        let mut write = json!({
            "update": {
                "name": self.config.document_name(collection, id),
                "fields": encoded.fields,
            }
        });

        if masked {
            write["updateMask"] = json!({ "fieldPaths": encoded.mask });
        }
        if !encoded.transforms.is_empty() {
            write["updateTransforms"] = Value::Array(encoded.transforms);
        }
        match precondition {
            Precondition::None => {}
            Precondition::MustExist => write["currentDocument"] = json!({ "exists": true }),
            Precondition::MustNotExist => write["currentDocument"] = json!({ "exists": false }),
        }
        write
    }

    async fn run_query(&self, query: &Query) -> Result<Vec<DocumentSnapshot>, StoreError> {
        let url = format!("{}:runQuery", self.config.documents_url());
        let request = self.client.post(url).json(&encode_query(query));
        let body = self.send(request, &query.collection, "").await?;

        let rows = body
            .as_array()
            .ok_or_else(|| StoreError::Decode("runQuery did not return a list".to_string()))?;

        // Rows without a document only carry a read time.
        rows.iter()
            .filter_map(|row| row.get("document"))
            .map(decode_document)
            .collect()
    }
}

/// Map an error response onto a store error using its canonical status string.
fn map_error(status: u16, body: &str, collection: &str, id: &str) -> StoreError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let error = &parsed["error"];
    let code = error["status"].as_str().unwrap_or_default();
    let message = error["message"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"));

    match code {
        "ALREADY_EXISTS" => StoreError::AlreadyExists {
            collection: collection.to_string(),
            id: id.to_string(),
        },
        "NOT_FOUND" => StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        },
        "PERMISSION_DENIED" | "UNAUTHENTICATED" => StoreError::PermissionDenied(message),
        _ if status >= 500 || code == "UNAVAILABLE" => StoreError::Unavailable(message),
        _ => StoreError::Query(message),
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<DocumentSnapshot>, StoreError> {
        let url = format!("{}/{collection}/{id}", self.config.documents_url());
        match self.send(self.client.get(url), collection, id).await {
            Ok(document) => decode_document(&document).map(Some),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn query(&self, query: &Query) -> Result<Vec<DocumentSnapshot>, StoreError> {
        self.run_query(query).await
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let write = self.update_write(collection, id, fields, Precondition::None, false);
        self.commit(write, collection, id).await
    }

    async fn create(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let write = self.update_write(collection, id, fields, Precondition::MustNotExist, false);
        self.commit(write, collection, id).await
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let write = self.update_write(collection, &id, fields, Precondition::MustNotExist, false);
        self.commit(write, collection, &id).await?;
        tracing::debug!(collection, id = %id, "Document added");
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let write = self.update_write(collection, id, fields, Precondition::MustExist, true);
        self.commit(write, collection, id).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let write = json!({ "delete": self.config.document_name(collection, id) });
        self.commit(write, collection, id).await
    }

    async fn watch(&self, query: Query) -> Result<Snapshots, StoreError> {
        let interval = self.config.poll_interval;
        tracing::debug!(
            collection = %query.collection,
            interval_ms = interval.as_millis() as u64,
            "Polling live query opened"
        );

        let store = self.clone();
        let snapshots = stream::unfold(
            (store, query, None::<Vec<DocumentSnapshot>>, true),
            move |(store, query, mut last, first)| async move {
                if !first {
                    tokio::time::sleep(interval).await;
                }
                loop {
                    match store.run_query(&query).await {
                        Ok(docs) if last.as_ref() == Some(&docs) => {
                            tokio::time::sleep(interval).await;
                        }
                        Ok(docs) => {
                            last = Some(docs.clone());
                            return Some((Ok(docs), (store, query, last, false)));
                        }
                        Err(e) => return Some((Err(e), (store, query, last, false))),
                    }
                }
            },
        );

        Ok(Box::pin(snapshots))
    }
}
