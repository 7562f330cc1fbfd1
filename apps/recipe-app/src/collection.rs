//! Saved-recipe collection synchronizer.
//!
//! While someone is signed in, one live query mirrors that user's save
//! records. Every emission replaces the local list; writes show up only once
//! the live query reports them.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;

use recipe_core::DomainError;
use recipe_core::domain::{Recipe, SaveRecord, SessionState, collections};
use recipe_core::ports::{DocumentSnapshot, DocumentStore, Query};

use crate::error::AppResult;
use crate::gateway::decode_or_skip;
use crate::session::SessionManager;
use crate::subscription::Subscription;

struct CollectionInner {
    store: Arc<dyn DocumentStore>,
    records: watch::Sender<Vec<SaveRecord>>,
}

#[derive(Clone)]
pub struct SavedRecipes {
    inner: Arc<CollectionInner>,
    session: SessionManager,
}

impl SavedRecipes {
    pub fn new(store: Arc<dyn DocumentStore>, session: SessionManager) -> Self {
        Self {
            inner: Arc::new(CollectionInner {
                store,
                records: watch::channel(Vec::new()).0,
            }),
            session,
        }
    }

    /// Follow the session, keeping one live query open for the signed-in user.
    pub fn start(&self) -> Subscription {
        let inner = self.inner.clone();
        let session = self.session.subscribe();
        Subscription::spawn("saved-recipes", inner.follow(session))
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<SaveRecord>> {
        self.inner.records.subscribe()
    }

    pub fn records(&self) -> Vec<SaveRecord> {
        self.inner.records.borrow().clone()
    }

    pub fn is_saved(&self, recipe_id: &str) -> bool {
        self.inner
            .records
            .borrow()
            .iter()
            .any(|record| record.recipe_id == recipe_id)
    }

    /// Save a snapshot of `recipe` for the signed-in user. Saving twice
    /// overwrites the same record.
    pub async fn save(&self, recipe: &Recipe) -> AppResult<()> {
        let user = self
            .session
            .current_user()
            .ok_or(DomainError::LoginRequired("save recipes"))?;

        let record = SaveRecord::snapshot(&user.uid, recipe);
        let key = SaveRecord::key(&user.uid, &recipe.id);
        self.inner
            .store
            .set(collections::SAVES, &key, record.to_fields())
            .await?;

        tracing::debug!(uid = %user.uid, recipe_id = %recipe.id, "Recipe saved");
        Ok(())
    }

    pub async fn unsave(&self, save_record_id: &str) -> AppResult<()> {
        self.inner
            .store
            .delete(collections::SAVES, save_record_id)
            .await?;
        tracing::debug!(save_id = %save_record_id, "Recipe removed from collection");
        Ok(())
    }
}

fn uid_of(state: &SessionState) -> Option<String> {
    state.user().map(|user| user.uid.clone())
}

/// Wait until the signed-in identity differs from `current`. `None` when the
/// session is gone.
async fn next_user(
    session: &mut watch::Receiver<SessionState>,
    current: &Option<String>,
) -> Option<Option<String>> {
    loop {
        session.changed().await.ok()?;
        let next = uid_of(&session.borrow_and_update());
        if next != *current {
            return Some(next);
        }
    }
}

impl CollectionInner {
    async fn follow(self: Arc<Self>, mut session: watch::Receiver<SessionState>) {
        let mut current = uid_of(&session.borrow_and_update());

        loop {
            // Never show one user's records to another.
            self.records.send_replace(Vec::new());

            let next = match &current {
                None => next_user(&mut session, &current).await,
                Some(uid) => self.mirror(uid, &mut session, &current).await,
            };

            match next {
                Some(next) => current = next,
                None => break,
            }
        }
    }

    /// Mirror `uid`'s save records until the identity changes.
    async fn mirror(
        &self,
        uid: &str,
        session: &mut watch::Receiver<SessionState>,
        current: &Option<String>,
    ) -> Option<Option<String>> {
        let query = Query::collection(collections::SAVES).where_eq("userId", uid);
        let mut snapshots = match self.store.watch(query).await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                tracing::error!(uid = %uid, error = %e, "Error fetching saved recipes");
                return next_user(session, current).await;
            }
        };
        tracing::debug!(uid = %uid, "Saved recipes live query opened");

        loop {
            tokio::select! {
                emission = snapshots.next() => match emission {
                    Some(Ok(docs)) => self.replace(&docs),
                    Some(Err(e)) => {
                        tracing::error!(uid = %uid, error = %e, "Error fetching saved recipes");
                    }
                    None => return next_user(session, current).await,
                },
                next = next_user(session, current) => return next,
            }
        }
    }

    fn replace(&self, docs: &[DocumentSnapshot]) {
        let records: Vec<SaveRecord> = docs
            .iter()
            .filter_map(|doc| decode_or_skip(doc, SaveRecord::from_document))
            .collect();
        self.records.send_replace(records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_core::ports::AuthProvider;
    use recipe_infra::{Argon2PasswordService, InMemoryAuthProvider, InMemoryDocumentStore};

    struct Harness {
        store: InMemoryDocumentStore,
        auth: Arc<InMemoryAuthProvider>,
        session: SessionManager,
        saved: SavedRecipes,
    }

    fn harness() -> Harness {
        let store = InMemoryDocumentStore::new();
        let auth = Arc::new(InMemoryAuthProvider::new(Arc::new(
            Argon2PasswordService::lightweight().unwrap(),
        )));
        let session = SessionManager::new(auth.clone(), Arc::new(store.clone()), None);
        let saved = SavedRecipes::new(Arc::new(store.clone()), session.clone());
        Harness {
            store,
            auth,
            session,
            saved,
        }
    }

    fn recipe(id: &str, title: &str) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: title.to_string(),
            category: "Desserts".to_string(),
            img: format!("https://img.example/{id}.jpg"),
            ..Recipe::default()
        }
    }

    async fn wait_for_len(saved: &SavedRecipes, len: usize) -> Vec<SaveRecord> {
        saved
            .subscribe()
            .wait_for(|records| records.len() == len)
            .await
            .unwrap()
            .clone()
    }

    #[tokio::test]
    async fn test_guest_save_is_rejected() {
        let h = harness();

        let err = h.saved.save(&recipe("r1", "Cake")).await.unwrap_err();

        assert!(err.is_login_required());
        assert_eq!(h.store.document_count(collections::SAVES).await, 0);
    }

    #[tokio::test]
    async fn test_save_shows_up_through_live_query() {
        let h = harness();
        let _session = h.session.start();
        let _saved = h.saved.start();

        let user = h.auth.sign_in_anonymously().await.unwrap();
        h.session.settled_for(Some(user.uid.as_str())).await;

        h.saved.save(&recipe("r1", "Cake")).await.unwrap();
        let records = wait_for_len(&h.saved, 1).await;

        assert_eq!(records[0].id, format!("{}_r1", user.uid));
        assert_eq!(records[0].recipe_title, "Cake");
        assert!(h.saved.is_saved("r1"));
    }

    #[tokio::test]
    async fn test_switching_users_replaces_records() {
        let h = harness();
        let _session = h.session.start();
        let _saved = h.saved.start();

        let first = h.auth.sign_in_anonymously().await.unwrap();
        h.session.settled_for(Some(first.uid.as_str())).await;
        h.saved.save(&recipe("r1", "Cake")).await.unwrap();
        wait_for_len(&h.saved, 1).await;

        let second = h.auth.sign_in_anonymously().await.unwrap();
        h.session.settled_for(Some(second.uid.as_str())).await;
        let records = wait_for_len(&h.saved, 0).await;
        assert!(records.is_empty());

        h.auth.sign_out().await.unwrap();
        h.session.settled_for(None).await;
        assert!(h.saved.records().is_empty());
    }
}
